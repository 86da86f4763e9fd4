//! # Lobby Core
//!
//! Session negotiation for the skirmish and multiplayer lobby.
//!
//! This crate turns a lobby (options, participants, map and game mode) into
//! the two files the game engine reads at startup:
//! - `spawn.ini` - settings, houses, alliances and starting locations
//! - `spawnmap.ini` - the map with game mode and option code applied
//!
//! All launch-time randomness comes from a caller-supplied seed, so a lobby
//! and a seed always produce the same files.
//!
//! ## Crate Structure
//!
//! - [`ini`] - INI document codec
//! - [`options`] / [`forced`] - Game options and map/mode forcing
//! - [`roster`] - Humans and AI
//! - [`constraints`] - Side, color and start vetoes
//! - [`randomizer`] - Launch-time resolution of random picks
//! - [`rank`] - Skirmish/coop difficulty rank
//! - [`spawn`] - Spawn file writer
//! - [`session`] - The lobby controller
//! - [`launch`] - Launch files and the game process boundary

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod alliances;
pub mod constraints;
pub mod error;
pub mod factions;
pub mod forced;
pub mod ini;
pub mod launch;
pub mod lobby_file;
pub mod map;
pub mod options;
pub mod randomizer;
pub mod rank;
pub mod remap;
pub mod roster;
pub mod session;
pub mod settings;
pub mod slots;
pub mod spawn;
pub mod statistics;
pub mod validation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::constraints::ConstraintSnapshot;
    pub use crate::error::{LobbyError, Result};
    pub use crate::factions::{ColorPalette, MultiplayerColor, RandomSelector, SideChoice, SideLayout};
    pub use crate::ini::IniDocument;
    pub use crate::launch::{write_launch_files, GameProcess, LaunchPaths, MatchLauncher};
    pub use crate::lobby_file::{LobbyFile, OptionDef};
    pub use crate::map::{CoopInfo, ForcedValues, GameMode, Map, TeamStartMapping};
    pub use crate::options::{
        CheckboxSpec, ChoiceItem, ChoiceSpec, OptionControl, OptionKind, OptionSet, OptionValue,
        ScoringEffect,
    };
    pub use crate::randomizer::HouseInfo;
    pub use crate::rank::{GameType, Rank};
    pub use crate::roster::{AiLevel, Participant, Roster};
    pub use crate::session::{LaunchPlan, LobbyConfig, LobbySession, ParticipantUpdate};
    pub use crate::settings::SavedSettings;
    pub use crate::statistics::{MatchStatistics, PlayerStatistics, StatisticsRecorder};
    pub use crate::validation::ValidationError;
}
