//! Side, color and starting-location constraints.
//!
//! Constraints are derived, never stored: they are recomputed from the
//! options, map and game mode whenever any of them changes, and every
//! participant whose selection became invalid is moved to a fallback.

use tracing::debug;

use crate::factions::{ColorPalette, SideChoice, SideLayout};
use crate::map::{GameMode, Map};
use crate::options::OptionSet;
use crate::roster::Roster;

/// The allowed/disallowed state derived from the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSnapshot {
    /// Per side: vetoed.
    pub disallowed_sides: Vec<bool>,
    /// Per random selector: disabled.
    pub disabled_selectors: Vec<bool>,
    /// Whether plain Random may be picked.
    pub random_allowed: bool,
    /// Whether Spectator may be picked.
    pub spectator_allowed: bool,
    /// Where participants on vetoed sides are moved to.
    pub default_side: SideChoice,
    /// Per palette color: vetoed.
    pub disallowed_colors: Vec<bool>,
    /// Per zero-based starting location: vetoed.
    pub disallowed_starts: Vec<bool>,
}

impl ConstraintSnapshot {
    /// Snapshot with nothing vetoed.
    #[must_use]
    pub fn unconstrained(layout: &SideLayout, palette: &ColorPalette, max_players: usize) -> Self {
        Self {
            disallowed_sides: vec![false; layout.side_count()],
            disabled_selectors: vec![false; layout.selectors.len()],
            random_allowed: true,
            spectator_allowed: true,
            default_side: SideChoice::Random,
            disallowed_colors: vec![false; palette.len()],
            disallowed_starts: vec![false; max_players],
        }
    }

    /// Whether a side choice is currently selectable.
    #[must_use]
    pub fn allows_side(&self, choice: SideChoice) -> bool {
        match choice {
            SideChoice::Random => self.random_allowed,
            SideChoice::Spectator => self.spectator_allowed,
            SideChoice::Selector(k) => !self.disabled_selectors.get(k).copied().unwrap_or(true),
            SideChoice::Side(i) => !self.disallowed_sides.get(i).copied().unwrap_or(true),
        }
    }

    /// Whether a palette color is currently selectable.
    #[must_use]
    pub fn allows_color(&self, color: usize) -> bool {
        !self.disallowed_colors.get(color).copied().unwrap_or(true)
    }

    /// Whether a starting location is currently selectable.
    #[must_use]
    pub fn allows_start(&self, start: usize) -> bool {
        !self.disallowed_starts.get(start).copied().unwrap_or(true)
    }

    /// Side indices that are not vetoed.
    #[must_use]
    pub fn allowed_sides(&self) -> Vec<usize> {
        self.disallowed_sides
            .iter()
            .enumerate()
            .filter(|(_, &vetoed)| !vetoed)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Union of the side vetoes of options, coop map data and the game mode.
#[must_use]
pub fn compute_disallowed_sides(
    layout: &SideLayout,
    options: &OptionSet,
    map: Option<&Map>,
    game_mode: Option<&GameMode>,
) -> Vec<bool> {
    let mut disallowed = vec![false; layout.side_count()];

    options.apply_side_vetoes(&mut disallowed);

    let map_vetoes = map.map_or(&[][..], Map::disallowed_sides);
    let mode_vetoes = game_mode.map_or(&[][..], |m| m.disallowed_sides.as_slice());
    for &side in map_vetoes.iter().chain(mode_vetoes) {
        if let Some(slot) = disallowed.get_mut(side) {
            *slot = true;
        }
    }

    disallowed
}

/// Recompute constraints and move participants off anything vetoed.
///
/// After this returns, no participant references a vetoed side, a disabled
/// random selector, a vetoed color or a vetoed starting location.
pub fn resolve_constraints(
    layout: &SideLayout,
    palette: &ColorPalette,
    options: &OptionSet,
    map: Option<&Map>,
    game_mode: Option<&GameMode>,
    roster: &mut Roster,
) -> ConstraintSnapshot {
    let disallowed_sides = compute_disallowed_sides(layout, options, map, game_mode);
    let allowed: Vec<usize> = disallowed_sides
        .iter()
        .enumerate()
        .filter(|(_, &v)| !v)
        .map(|(i, _)| i)
        .collect();

    // With a single allowed side there is nothing to randomize.
    let (random_allowed, default_side) = match allowed.as_slice() {
        [only] => (false, SideChoice::Side(*only)),
        _ => (true, SideChoice::Random),
    };

    let disabled_selectors: Vec<bool> = layout
        .selectors
        .iter()
        .map(|selector| {
            let vetoed = selector
                .sides
                .iter()
                .filter(|&&s| disallowed_sides.get(s).copied().unwrap_or(true))
                .count();
            vetoed + 1 >= selector.sides.len()
        })
        .collect();

    let is_coop = map.is_some_and(Map::is_coop);

    let mut disallowed_colors = vec![false; palette.len()];
    let mut disallowed_starts = vec![false; map.map_or(0, |m| m.max_players)];
    if let Some(map) = map {
        for &c in map.disallowed_colors() {
            if let Some(slot) = disallowed_colors.get_mut(c) {
                *slot = true;
            }
        }
        for &s in map.disallowed_starts() {
            if let Some(slot) = disallowed_starts.get_mut(s) {
                *slot = true;
            }
        }
    }

    let snapshot = ConstraintSnapshot {
        disallowed_sides,
        disabled_selectors,
        random_allowed,
        spectator_allowed: !is_coop,
        default_side,
        disallowed_colors,
        disallowed_starts,
    };

    for p in roster.iter_mut() {
        if !snapshot.allows_side(p.side) {
            debug!(
                "{}: side '{}' no longer allowed, moving to '{}'",
                p.name,
                layout.name_of(p.side),
                layout.name_of(default_side)
            );
            p.side = default_side;
        }
        if let Some(color) = p.color {
            if !snapshot.allows_color(color) {
                debug!("{}: color {color} vetoed, using random", p.name);
                p.color = None;
            }
        }
        if let Some(start) = p.start {
            if start < snapshot.disallowed_starts.len() && !snapshot.allows_start(start) {
                debug!("{}: start {start} vetoed, unassigning", p.name);
                p.start = None;
            }
        }
    }

    snapshot
}
