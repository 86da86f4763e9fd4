//! Lobby descriptions.
//!
//! A lobby file is a RON document holding everything needed to rebuild a
//! session outside the client: static config, option definitions, the map
//! and game mode catalogue, participants and the current selection.
//!
//! ```ron
//! (
//!     config: (
//!         layout: (sides: ["Allies", "Soviet"], selectors: []),
//!         palette: (colors: [(name: "Red", game_color_index: 0)]),
//!     ),
//!     local: (name: "Host"),
//!     maps: [(name: "Arena", id: "arena", max_players: 2)],
//!     game_modes: [(name: "Standard", ui_name: "Standard")],
//!     selected_map: Some("arena"),
//!     selected_game_mode: Some("Standard"),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LobbyError, Result};
use crate::map::{GameMode, Map, TeamStartMapping};
use crate::options::{OptionControl, OptionKind, OptionSet, OptionValue};
use crate::roster::Participant;
use crate::session::{LobbyConfig, LobbySession};

/// Definition of one game option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    /// Unique option name.
    pub name: String,
    /// Option shape.
    pub kind: OptionKind,
    /// Initial value.
    pub default: OptionValue,
}

/// A serialized lobby.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyFile {
    /// Static lobby configuration.
    pub config: LobbyConfig,
    /// The local human.
    pub local: Participant,
    /// Other humans.
    #[serde(default)]
    pub humans: Vec<Participant>,
    /// AI participants.
    #[serde(default)]
    pub ai: Vec<Participant>,
    /// Option definitions.
    #[serde(default)]
    pub options: Vec<OptionDef>,
    /// Option values the host changed from their defaults.
    #[serde(default)]
    pub option_values: Vec<(String, OptionValue)>,
    /// Map catalogue.
    #[serde(default)]
    pub maps: Vec<Map>,
    /// Game mode catalogue.
    #[serde(default)]
    pub game_modes: Vec<GameMode>,
    /// Id of the selected map.
    #[serde(default)]
    pub selected_map: Option<String>,
    /// Name of the selected game mode.
    #[serde(default)]
    pub selected_game_mode: Option<String>,
    /// Team-start mappings.
    #[serde(default)]
    pub team_start_mappings: Vec<TeamStartMapping>,
    /// Launch seed.
    #[serde(default)]
    pub seed: u64,
}

impl LobbyFile {
    /// Load a lobby from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LobbyError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "lobby file not found"),
            ));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| LobbyError::io(path, e))?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Parse a lobby from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self> {
        Self::parse(contents, "<inline>")
    }

    fn parse(contents: &str, origin: &str) -> Result<Self> {
        ron::from_str(contents).map_err(|e| LobbyError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Write the lobby as pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            LobbyError::DataParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Build the option set from the definitions.
    pub fn option_set(&self) -> Result<OptionSet> {
        let mut set = OptionSet::new();
        for def in &self.options {
            set.insert(OptionControl::new(def.name.clone(), def.kind.clone(), def.default)?)?;
        }
        Ok(set)
    }

    /// Build a session in the state the file describes.
    ///
    /// Host option values are applied before the selection so forced values
    /// still win. Unknown selections are an error.
    pub fn into_session(self) -> Result<LobbySession> {
        let options = self.option_set()?;
        let mut session = LobbySession::new(self.config, self.local, options, self.seed)?;

        for (name, value) in self.option_values {
            session.set_option(&name, value)?;
        }
        for human in self.humans {
            session.add_human(human)?;
        }
        for ai in self.ai {
            session.add_ai(ai)?;
        }

        let map = match &self.selected_map {
            Some(id) => Some(
                self.maps
                    .iter()
                    .find(|m| &m.id == id)
                    .cloned()
                    .ok_or_else(|| LobbyError::InvalidAttribute(format!("unknown map '{id}'")))?,
            ),
            None => None,
        };
        let game_mode = match &self.selected_game_mode {
            Some(name) => Some(
                self.game_modes
                    .iter()
                    .find(|g| &g.name == name)
                    .cloned()
                    .ok_or_else(|| {
                        LobbyError::InvalidAttribute(format!("unknown game mode '{name}'"))
                    })?,
            ),
            None => None,
        };

        match (game_mode, map) {
            (Some(game_mode), Some(map)) => session.select(game_mode, map),
            (None, None) => debug!("Lobby file has no selection"),
            _ => warn!("Lobby file selects only one of map and game mode, ignoring selection"),
        }
        session.set_team_start_mappings(self.team_start_mappings);

        Ok(session)
    }
}
