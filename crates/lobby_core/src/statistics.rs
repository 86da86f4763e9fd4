//! Match records handed to the external statistics store.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::factions::ColorPalette;
use crate::map::{GameMode, Map};
use crate::options::OptionSet;
use crate::randomizer::HouseInfo;
use crate::roster::Roster;

/// Name recorded for every AI participant.
pub const AI_PLAYER_NAME: &str = "Computer";

/// One participant's entry in a match record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    /// Player name, or [`AI_PLAYER_NAME`].
    pub name: String,
    /// The local human.
    pub is_local: bool,
    /// An AI participant.
    pub is_ai: bool,
    /// Spectating.
    pub is_spectator: bool,
    /// Resolved side index plus one.
    pub side: usize,
    /// Team, if any.
    pub team: Option<u8>,
    /// Palette position of the resolved color.
    pub color: Option<usize>,
    /// AI strength; `None` for humans.
    pub ai_strength: Option<u8>,
}

/// Record of one launched match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatistics {
    /// Session-unique game identifier.
    pub game_id: u64,
    /// Map display name.
    pub map_name: String,
    /// Game mode display name.
    pub game_mode: String,
    /// Number of humans, spectators included.
    pub human_count: usize,
    /// Cooperative mission.
    pub is_coop: bool,
    /// No scoring-denying option was active.
    pub valid_for_star: bool,
    /// Humans first, then AI, in roster order.
    pub players: Vec<PlayerStatistics>,
}

/// Receives one record per launch once the game process has exited.
pub trait StatisticsRecorder {
    /// Store a finished match.
    fn record(&mut self, statistics: MatchStatistics) -> Result<()>;
}

/// Build the record for a launch.
#[must_use]
pub fn build_match_statistics(
    game_id: u64,
    local_name: &str,
    roster: &Roster,
    houses: &[HouseInfo],
    palette: &ColorPalette,
    options: &OptionSet,
    map: &Map,
    game_mode: &GameMode,
) -> MatchStatistics {
    let players = roster
        .iter()
        .zip(houses)
        .map(|(p, house)| PlayerStatistics {
            name: if p.is_ai {
                AI_PLAYER_NAME.to_string()
            } else {
                p.name.clone()
            },
            is_local: !p.is_ai && p.name == local_name,
            is_ai: p.is_ai,
            is_spectator: !p.is_ai && p.is_spectator(),
            side: house.side_index + 1,
            team: p.team,
            color: palette.palette_index(house.color_index),
            ai_strength: p.ai_level.map(|level| level.strength()),
        })
        .collect();

    MatchStatistics {
        game_id,
        map_name: map.name.clone(),
        game_mode: game_mode.ui_name.clone(),
        human_count: roster.human_count(),
        is_coop: map.is_coop(),
        valid_for_star: !options.denies_scoring(),
        players,
    }
}
