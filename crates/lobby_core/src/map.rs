//! Map and game mode data providers.
//!
//! Maps and game modes are loaded elsewhere; the lobby only reads them.
//! Both can force option values, veto sides, and inject raw spawn file
//! entries.

use serde::{Deserialize, Serialize};

use crate::ini::IniDocument;

/// Highest starting waypoint index the engine spawns players on, plus one.
pub const MAX_START_WAYPOINTS: usize = 8;

/// Option values a map or game mode forces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedValues {
    /// Forced checkbox states by option name.
    #[serde(default)]
    pub checkboxes: Vec<(String, bool)>,
    /// Forced choice indices by option name.
    #[serde(default)]
    pub choices: Vec<(String, usize)>,
}

impl ForcedValues {
    /// Whether an option name is forced by this source.
    #[must_use]
    pub fn forces(&self, name: &str) -> bool {
        self.checkboxes.iter().any(|(n, _)| n == name) || self.choices.iter().any(|(n, _)| n == name)
    }
}

/// Extra restrictions carried by cooperative missions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoopInfo {
    /// Sides that cannot be played.
    #[serde(default)]
    pub disallowed_sides: Vec<usize>,
    /// Palette colors that cannot be picked.
    #[serde(default)]
    pub disallowed_colors: Vec<usize>,
    /// Starting locations (zero-based) that cannot be picked.
    #[serde(default)]
    pub disallowed_starts: Vec<usize>,
}

/// A playable map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    /// Display name.
    pub name: String,
    /// Stable identifier used by persisted settings (file hash).
    pub id: String,
    /// Number of starting locations.
    pub max_players: usize,
    /// Fewest players the map can be played with.
    #[serde(default = "default_min_players")]
    pub min_players: usize,
    /// Reject launches with more players than `max_players` or shared starts.
    #[serde(default)]
    pub enforce_max_players: bool,
    /// Cooperative mission data; `Some` marks a coop map.
    #[serde(default)]
    pub coop: Option<CoopInfo>,
    /// Teams are disabled on this map.
    #[serde(default)]
    pub force_no_teams: bool,
    /// Starting locations are always random on this map.
    #[serde(default)]
    pub force_random_start_locations: bool,
    /// Only playable in online/LAN lobbies.
    #[serde(default)]
    pub multiplayer_only: bool,
    /// AI participants are not allowed.
    #[serde(default)]
    pub human_players_only: bool,
    /// Options forced by the map.
    #[serde(default)]
    pub forced: ForcedValues,
    /// Raw spawn file `[Settings]` entries forced by the map.
    #[serde(default)]
    pub forced_spawn_options: Vec<(String, String)>,
    /// Map file contents, including the `[Waypoints]` section.
    #[serde(default)]
    pub geometry: IniDocument,
}

fn default_min_players() -> usize {
    1
}

impl Map {
    /// Create a map with defaults for everything but name and size.
    #[must_use]
    pub fn new(name: impl Into<String>, max_players: usize) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            max_players,
            min_players: 1,
            enforce_max_players: false,
            coop: None,
            force_no_teams: false,
            force_random_start_locations: false,
            multiplayer_only: false,
            human_players_only: false,
            forced: ForcedValues::default(),
            forced_spawn_options: Vec::new(),
            geometry: IniDocument::new(),
        }
    }

    /// Whether this is a cooperative mission.
    #[must_use]
    pub const fn is_coop(&self) -> bool {
        self.coop.is_some()
    }

    /// Sides vetoed by coop data.
    #[must_use]
    pub fn disallowed_sides(&self) -> &[usize] {
        self.coop.as_ref().map_or(&[], |c| c.disallowed_sides.as_slice())
    }

    /// Colors vetoed by coop data.
    #[must_use]
    pub fn disallowed_colors(&self) -> &[usize] {
        self.coop.as_ref().map_or(&[], |c| c.disallowed_colors.as_slice())
    }

    /// Starting locations vetoed by coop data.
    #[must_use]
    pub fn disallowed_starts(&self) -> &[usize] {
        self.coop.as_ref().map_or(&[], |c| c.disallowed_starts.as_slice())
    }

    /// Waypoint cell stored for a starting location, if any.
    #[must_use]
    pub fn waypoint(&self, location: usize) -> Option<&str> {
        self.geometry.get("Waypoints", &location.to_string())
    }
}

/// A game mode (e.g. Standard, Free for All, Mission).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMode {
    /// Internal name.
    pub name: String,
    /// Display name written to the spawn file.
    pub ui_name: String,
    /// Sides vetoed by the mode.
    #[serde(default)]
    pub disallowed_sides: Vec<usize>,
    /// Teams are disabled in this mode.
    #[serde(default)]
    pub force_no_teams: bool,
    /// Starting locations are always random in this mode.
    #[serde(default)]
    pub force_random_start_locations: bool,
    /// Only playable in online/LAN lobbies.
    #[serde(default)]
    pub multiplayer_only: bool,
    /// AI participants are not allowed.
    #[serde(default)]
    pub human_players_only: bool,
    /// Player count floor overriding the map's.
    #[serde(default)]
    pub min_players_override: Option<usize>,
    /// Difficulty for coop missions.
    #[serde(default)]
    pub coop_difficulty_level: usize,
    /// Options forced by the mode.
    #[serde(default)]
    pub forced: ForcedValues,
    /// Raw spawn file `[Settings]` entries forced by the mode.
    #[serde(default)]
    pub forced_spawn_options: Vec<(String, String)>,
    /// Rules patch merged into the map.
    #[serde(default)]
    pub map_code: Option<IniDocument>,
}

impl GameMode {
    /// Create a mode with defaults for everything but the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            ui_name: name.clone(),
            name,
            disallowed_sides: Vec::new(),
            force_no_teams: false,
            force_random_start_locations: false,
            multiplayer_only: false,
            human_players_only: false,
            min_players_override: None,
            coop_difficulty_level: 0,
            forced: ForcedValues::default(),
            forced_spawn_options: Vec::new(),
            map_code: None,
        }
    }
}

/// Whether AI participants may join with this map and mode.
#[must_use]
pub fn ai_allowed(map: &Map, game_mode: &GameMode) -> bool {
    !(map.multiplayer_only || game_mode.multiplayer_only)
        || !(map.human_players_only || game_mode.human_players_only)
}

/// Whether teams are disabled for this selection. Coop maps always use teams.
#[must_use]
pub fn teams_disabled(map: &Map, game_mode: &GameMode) -> bool {
    !map.is_coop() && (map.force_no_teams || game_mode.force_no_teams)
}

/// Whether starting locations are forced random for this selection.
#[must_use]
pub fn starts_forced_random(map: &Map, game_mode: &GameMode) -> bool {
    !map.is_coop() && (map.force_random_start_locations || game_mode.force_random_start_locations)
}

/// Binds a team to a starting location, or blocks the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStartMapping {
    /// Zero-based starting location.
    pub start: usize,
    /// Team assigned to participants starting here.
    #[serde(default)]
    pub team: Option<u8>,
    /// Nobody may be randomly placed here.
    #[serde(default)]
    pub blocked: bool,
}

/// Check team-start mappings against the selected map.
///
/// Returns a human-readable error for the first bad mapping.
#[must_use]
pub fn team_mappings_error(mappings: &[TeamStartMapping], map: &Map) -> Option<String> {
    for (i, mapping) in mappings.iter().enumerate() {
        if mapping.start >= map.max_players {
            return Some(format!(
                "Team start mapping {} refers to start {} but the map only has {}.",
                i + 1,
                mapping.start + 1,
                map.max_players
            ));
        }
        if mappings[..i].iter().any(|m| m.start == mapping.start) {
            return Some(format!(
                "Start {} is mapped more than once.",
                mapping.start + 1
            ));
        }
        if mapping.blocked && mapping.team.is_some() {
            return Some(format!(
                "Start {} cannot be both blocked and assigned to a team.",
                mapping.start + 1
            ));
        }
        if !mapping.blocked && mapping.team.is_none() {
            return Some(format!(
                "Start {} needs a team or must be blocked.",
                mapping.start + 1
            ));
        }
    }
    None
}
