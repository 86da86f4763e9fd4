//! The participant roster.
//!
//! Humans come first, then AI, capped at [`MAX_PLAYERS`]. Each participant's
//! `index` is its position in that combined order and is re-derived after
//! every change to the roster.

use serde::{Deserialize, Serialize};

use crate::error::{LobbyError, Result};
use crate::factions::SideChoice;

/// Maximum number of participants in a session.
pub const MAX_PLAYERS: usize = 8;

/// Highest team number. Teams are `1..=MAX_TEAMS`.
pub const MAX_TEAMS: u8 = 4;

/// AI strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AiLevel {
    /// Weakest AI.
    Easy,
    /// Medium AI.
    Medium,
    /// Strongest AI.
    Hard,
}

impl AiLevel {
    /// Strength from 0 (easy) to 2 (hard).
    #[must_use]
    pub const fn strength(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    /// Level from a strength value.
    #[must_use]
    pub const fn from_strength(strength: u8) -> Option<Self> {
        match strength {
            0 => Some(Self::Easy),
            1 => Some(Self::Medium),
            2 => Some(Self::Hard),
            _ => None,
        }
    }

    /// Handicap value understood by the engine (0 is the strongest AI).
    #[must_use]
    pub const fn handicap(self) -> u8 {
        2 - self.strength()
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Easy => "Easy AI",
            Self::Medium => "Medium AI",
            Self::Hard => "Hard AI",
        }
    }
}

/// A human or AI participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Player name. AI participants use their level's display name.
    pub name: String,
    /// Whether this is an AI.
    #[serde(default)]
    pub is_ai: bool,
    /// AI strength; `None` for humans.
    pub ai_level: Option<AiLevel>,
    /// Side selection.
    #[serde(default)]
    pub side: SideChoice,
    /// Palette color; `None` is random.
    pub color: Option<usize>,
    /// Zero-based starting location; `None` is random/unassigned.
    pub start: Option<usize>,
    /// Team `1..=4`; `None` is no team.
    pub team: Option<u8>,
    /// Ready to launch.
    #[serde(default)]
    pub ready: bool,
    /// Automatically ready after option changes.
    #[serde(default)]
    pub auto_ready: bool,
    /// Still running the previous match.
    #[serde(default)]
    pub is_in_game: bool,
    /// Network address, passed through to the spawn file.
    #[serde(default = "default_address")]
    pub address: String,
    /// Network port, passed through to the spawn file.
    #[serde(default)]
    pub port: u16,
    /// Position in the combined roster. Derived, never set directly.
    #[serde(skip)]
    index: usize,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

impl Participant {
    /// A human with everything random.
    #[must_use]
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_ai: false,
            ai_level: None,
            side: SideChoice::Random,
            color: None,
            start: None,
            team: None,
            ready: false,
            auto_ready: false,
            is_in_game: false,
            address: default_address(),
            port: 0,
            index: 0,
        }
    }

    /// An AI with everything random.
    #[must_use]
    pub fn ai(level: AiLevel) -> Self {
        Self {
            is_ai: true,
            ai_level: Some(level),
            ..Self::human(level.display_name())
        }
    }

    /// Set the side.
    #[must_use]
    pub fn with_side(mut self, side: SideChoice) -> Self {
        self.side = side;
        self
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: usize) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the starting location.
    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the team.
    #[must_use]
    pub fn with_team(mut self, team: u8) -> Self {
        self.team = Some(team);
        self
    }

    /// Position in the combined roster.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether the participant chose to spectate.
    #[must_use]
    pub fn is_spectator(&self) -> bool {
        self.side == SideChoice::Spectator
    }

    /// AI strength, 0 for humans.
    #[must_use]
    pub fn strength(&self) -> u8 {
        self.ai_level.map_or(0, AiLevel::strength)
    }
}

/// Ordered collection of human and AI participants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    humans: Vec<Participant>,
    ai: Vec<Participant>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total participant count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.humans.len() + self.ai.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of humans.
    #[must_use]
    pub fn human_count(&self) -> usize {
        self.humans.len()
    }

    /// Number of AI participants.
    #[must_use]
    pub fn ai_count(&self) -> usize {
        self.ai.len()
    }

    /// Human participants in join order.
    #[must_use]
    pub fn humans(&self) -> &[Participant] {
        &self.humans
    }

    /// AI participants in slot order.
    #[must_use]
    pub fn ai(&self) -> &[Participant] {
        &self.ai
    }

    /// Add a human after the existing humans.
    pub fn add_human(&mut self, mut participant: Participant) -> Result<usize> {
        if self.len() >= MAX_PLAYERS {
            return Err(LobbyError::RosterFull(MAX_PLAYERS));
        }
        participant.is_ai = false;
        participant.ai_level = None;
        self.humans.push(participant);
        self.reindex();
        Ok(self.humans.len() - 1)
    }

    /// Add an AI after the existing AI.
    pub fn add_ai(&mut self, mut participant: Participant) -> Result<usize> {
        if self.len() >= MAX_PLAYERS {
            return Err(LobbyError::RosterFull(MAX_PLAYERS));
        }
        participant.is_ai = true;
        if participant.ai_level.is_none() {
            participant.ai_level = Some(AiLevel::Easy);
        }
        if participant.side == SideChoice::Spectator {
            participant.side = SideChoice::Random;
        }
        self.ai.push(participant);
        self.reindex();
        Ok(self.len() - 1)
    }

    /// Remove the participant at a combined index.
    pub fn remove(&mut self, index: usize) -> Result<Participant> {
        let removed = if index < self.humans.len() {
            self.humans.remove(index)
        } else if index < self.len() {
            self.ai.remove(index - self.humans.len())
        } else {
            return Err(LobbyError::InvalidParticipant(index));
        };
        self.reindex();
        Ok(removed)
    }

    /// Drop every AI participant.
    pub fn clear_ai(&mut self) {
        self.ai.clear();
        self.reindex();
    }

    /// Re-derive every participant's combined index.
    pub fn reindex(&mut self) {
        for (i, p) in self.humans.iter_mut().chain(self.ai.iter_mut()).enumerate() {
            p.index = i;
        }
    }

    /// Participant at a combined index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Participant> {
        if index < self.humans.len() {
            self.humans.get(index)
        } else {
            self.ai.get(index - self.humans.len())
        }
    }

    /// Participant at a combined index, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Participant> {
        if index < self.humans.len() {
            self.humans.get_mut(index)
        } else {
            let ai_index = index - self.humans.len();
            self.ai.get_mut(ai_index)
        }
    }

    /// Iterate humans then AI.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.humans.iter().chain(self.ai.iter())
    }

    /// Iterate humans then AI, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.humans.iter_mut().chain(self.ai.iter_mut())
    }

    /// Find a human by name.
    #[must_use]
    pub fn find_human(&self, name: &str) -> Option<&Participant> {
        self.humans.iter().find(|p| p.name == name)
    }

    /// Index of a human by name.
    #[must_use]
    pub fn human_index(&self, name: &str) -> Option<usize> {
        self.humans.iter().position(|p| p.name == name)
    }

    /// Reset the ready flag of every non-host human.
    ///
    /// Auto-ready participants keep their flag unless `reset_auto_ready` is
    /// set or they are still in the previous game.
    pub fn clear_ready_statuses(&mut self, reset_auto_ready: bool) {
        for p in self.humans.iter_mut().skip(1) {
            if reset_auto_ready || !p.auto_ready || p.is_in_game {
                p.ready = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_humans_then_ai() {
        let mut roster = Roster::new();
        roster.add_ai(Participant::ai(AiLevel::Hard)).unwrap();
        roster.add_human(Participant::human("Alice")).unwrap();
        roster.add_human(Participant::human("Bob")).unwrap();

        let names: Vec<_> = roster.iter().map(|p| (p.name.as_str(), p.index())).collect();
        assert_eq!(names, vec![("Alice", 0), ("Bob", 1), ("Hard AI", 2)]);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut roster = Roster::new();
        roster.add_human(Participant::human("Alice")).unwrap();
        roster.add_human(Participant::human("Bob")).unwrap();
        roster.add_ai(Participant::ai(AiLevel::Easy)).unwrap();

        let removed = roster.remove(0).unwrap();
        assert_eq!(removed.name, "Alice");
        assert_eq!(roster.get(0).unwrap().name, "Bob");
        assert_eq!(roster.get(1).unwrap().index(), 1);
        assert!(roster.remove(5).is_err());
    }

    #[test]
    fn test_capacity() {
        let mut roster = Roster::new();
        roster.add_human(Participant::human("Alice")).unwrap();
        for _ in 1..MAX_PLAYERS {
            roster.add_ai(Participant::ai(AiLevel::Easy)).unwrap();
        }
        assert!(matches!(
            roster.add_ai(Participant::ai(AiLevel::Easy)),
            Err(LobbyError::RosterFull(MAX_PLAYERS))
        ));
    }

    #[test]
    fn test_ai_cannot_spectate() {
        let mut roster = Roster::new();
        roster
            .add_ai(Participant::ai(AiLevel::Medium).with_side(SideChoice::Spectator))
            .unwrap();
        assert_eq!(roster.get(0).unwrap().side, SideChoice::Random);
    }

    #[test]
    fn test_clear_ready_statuses_keeps_host_and_auto_ready() {
        let mut roster = Roster::new();
        for name in ["Host", "Auto", "Manual", "Busy"] {
            let mut p = Participant::human(name);
            p.ready = true;
            roster.add_human(p).unwrap();
        }
        roster.get_mut(1).unwrap().auto_ready = true;
        roster.get_mut(3).unwrap().auto_ready = true;
        roster.get_mut(3).unwrap().is_in_game = true;

        roster.clear_ready_statuses(false);
        let ready: Vec<_> = roster.iter().map(|p| p.ready).collect();
        assert_eq!(ready, vec![true, true, false, false]);

        roster.clear_ready_statuses(true);
        assert!(!roster.get(1).unwrap().ready);
    }

    #[test]
    fn test_ai_handicap_is_reversed_strength() {
        assert_eq!(AiLevel::Hard.handicap(), 0);
        assert_eq!(AiLevel::Easy.handicap(), 2);
        assert_eq!(AiLevel::from_strength(1), Some(AiLevel::Medium));
    }
}
