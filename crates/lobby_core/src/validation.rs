//! Launch gate.
//!
//! A configuration that fails validation must not produce any files.

use thiserror::Error;

use crate::constraints::ConstraintSnapshot;
use crate::factions::{ColorPalette, SideChoice, SideLayout};
use crate::map::{team_mappings_error, GameMode, Map, TeamStartMapping, MAX_START_WAYPOINTS};
use crate::roster::Roster;

/// Why a launch was rejected. Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing selected.
    #[error("Please select a map.")]
    NoMapSelected,

    /// Map declares more starting locations than the engine spawns on.
    #[error("The selected map has more than {0} starting locations.")]
    TooManyStartingLocations(usize),

    /// Game mode needs an online lobby.
    #[error("{0} can only be played online or on LAN.")]
    GameModeMultiplayerOnly(String),

    /// Too few players for the game mode.
    #[error("{mode} cannot be played with less than {min} players.")]
    BelowGameModeMinimum {
        /// Game mode display name.
        mode: String,
        /// Minimum player count.
        min: usize,
    },

    /// Map needs an online lobby.
    #[error("The selected map can only be played online or on LAN.")]
    MapMultiplayerOnly,

    /// Too few players for the map.
    #[error("The selected map cannot be played with less than {0} players.")]
    BelowMapMinimum(usize),

    /// Too many players for a map that enforces its maximum.
    #[error("The selected map cannot be played with more than {0} players.")]
    AboveMapMaximum(usize),

    /// Two players picked the same start on a map that forbids it.
    #[error("Multiple players cannot share the same starting location on the selected map.")]
    SharedStartingLocation,

    /// Spectating a coop mission.
    #[error("Co-op missions cannot be spectated. You'll have to show a bit more effort to cheer your allies to victory.")]
    CoopSpectator,

    /// A team-start mapping is unusable.
    #[error("{0}")]
    TeamStartMapping(String),

    /// More random colors are needed than the palette has left.
    #[error("There are not enough colors for all players.")]
    NotEnoughColors,

    /// A participant's side choice has no allowed side to resolve to.
    #[error("No side is available for {0} with the current game options.")]
    NoAllowedSide(String),
}

/// State the launch gate reads.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInputs<'a> {
    /// Participants.
    pub roster: &'a Roster,
    /// Name of the local human.
    pub local_name: &'a str,
    /// Selected map.
    pub map: Option<&'a Map>,
    /// Selected game mode.
    pub game_mode: Option<&'a GameMode>,
    /// Team-start mappings.
    pub team_start_mappings: &'a [TeamStartMapping],
    /// Sides and random selectors.
    pub layout: &'a SideLayout,
    /// Color palette.
    pub palette: &'a ColorPalette,
    /// Current vetoes.
    pub constraints: &'a ConstraintSnapshot,
    /// Online/LAN session rather than skirmish.
    pub is_multiplayer: bool,
}

/// Players that take part in the match: non-spectating humans plus AI.
#[must_use]
pub fn playing_count(roster: &Roster) -> usize {
    roster.humans().iter().filter(|p| !p.is_spectator()).count() + roster.ai_count()
}

/// Return the first reason the configuration cannot be launched.
pub fn validate_launch(inputs: &ValidationInputs<'_>) -> Result<(), ValidationError> {
    let (Some(map), Some(mode)) = (inputs.map, inputs.game_mode) else {
        return Err(ValidationError::NoMapSelected);
    };
    let players = playing_count(inputs.roster);

    if map.max_players > MAX_START_WAYPOINTS {
        return Err(ValidationError::TooManyStartingLocations(MAX_START_WAYPOINTS));
    }

    if !inputs.is_multiplayer && mode.multiplayer_only {
        return Err(ValidationError::GameModeMultiplayerOnly(mode.ui_name.clone()));
    }

    if let Some(min) = mode.min_players_override {
        if players < min {
            return Err(ValidationError::BelowGameModeMinimum {
                mode: mode.ui_name.clone(),
                min,
            });
        }
    }

    if !inputs.is_multiplayer && map.multiplayer_only {
        return Err(ValidationError::MapMultiplayerOnly);
    }

    if players < map.min_players {
        return Err(ValidationError::BelowMapMinimum(map.min_players));
    }

    if map.enforce_max_players {
        if players > map.max_players {
            return Err(ValidationError::AboveMapMaximum(map.max_players));
        }

        let mut seen = Vec::new();
        for start in inputs
            .roster
            .iter()
            .filter(|p| !p.is_spectator())
            .filter_map(|p| p.start)
        {
            if seen.contains(&start) {
                return Err(ValidationError::SharedStartingLocation);
            }
            seen.push(start);
        }
    }

    if map.is_coop()
        && inputs
            .roster
            .find_human(inputs.local_name)
            .is_some_and(|p| p.is_spectator())
    {
        return Err(ValidationError::CoopSpectator);
    }

    if let Some(error) = team_mappings_error(inputs.team_start_mappings, map) {
        return Err(ValidationError::TeamStartMapping(error));
    }

    check_sides(inputs)?;
    check_colors(inputs, map)
}

fn check_sides(inputs: &ValidationInputs<'_>) -> Result<(), ValidationError> {
    let allowed = inputs.constraints.allowed_sides();
    for p in inputs.roster.iter() {
        let resolvable = match p.side {
            SideChoice::Side(i) => inputs.constraints.allows_side(SideChoice::Side(i)),
            // Spectators still draw a side.
            SideChoice::Random | SideChoice::Spectator => !allowed.is_empty(),
            SideChoice::Selector(k) => inputs
                .layout
                .selectors
                .get(k)
                .is_some_and(|selector| selector.sides.iter().any(|s| allowed.contains(s))),
        };
        if !resolvable {
            return Err(ValidationError::NoAllowedSide(p.name.clone()));
        }
    }
    Ok(())
}

/// Every participant without a color draws one from what the map and the
/// explicit picks leave over.
fn check_colors(inputs: &ValidationInputs<'_>, map: &Map) -> Result<(), ValidationError> {
    let mut picked: Vec<usize> = inputs.roster.iter().filter_map(|p| p.color).collect();
    picked.sort_unstable();
    picked.dedup();

    let free = (0..inputs.palette.len())
        .filter(|c| !map.disallowed_colors().contains(c) && picked.binary_search(c).is_err())
        .count();
    let random = inputs.roster.iter().filter(|p| p.color.is_none()).count();

    if random > free {
        return Err(ValidationError::NotEnoughColors);
    }
    Ok(())
}
