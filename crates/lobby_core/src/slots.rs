//! Engine slot numbering.
//!
//! The engine assigns humans to its `Multi{n}` houses by in-game color
//! index, not by roster order. [`SlotOrder`] is computed once per launch and
//! every table writer reads slot numbers from it.

use crate::randomizer::HouseInfo;

/// Engine slot of every participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOrder {
    /// Roster index occupying each slot.
    slots: Vec<usize>,
    human_count: usize,
}

impl SlotOrder {
    /// Humans sorted by resolved engine color index (stable), then AI in
    /// roster order.
    #[must_use]
    pub fn new(houses: &[HouseInfo], human_count: usize) -> Self {
        let human_count = human_count.min(houses.len());
        let mut slots: Vec<usize> = (0..human_count).collect();
        slots.sort_by_key(|&i| houses[i].color_index);
        slots.extend(human_count..houses.len());
        Self { slots, human_count }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of human slots; AI slots follow.
    #[must_use]
    pub const fn human_count(&self) -> usize {
        self.human_count
    }

    /// Roster index in a zero-based slot.
    #[must_use]
    pub fn participant_at(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied()
    }

    /// Zero-based slot of a roster index.
    #[must_use]
    pub fn slot_of(&self, participant: usize) -> Option<usize> {
        self.slots.iter().position(|&p| p == participant)
    }

    /// `(slot, roster index)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots.iter().copied().enumerate()
    }

    /// Spawn file key for a zero-based slot.
    #[must_use]
    pub fn key(slot: usize) -> String {
        format!("Multi{}", slot + 1)
    }
}
