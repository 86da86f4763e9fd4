//! Test fixtures and helpers.
//!
//! Pre-built lobby configurations, maps and sessions
//! for consistent testing.

use lobby_core::prelude::*;

/// Name of the local human in every fixture session.
pub const HOST: &str = "Host";

/// Option vetoing both Allied sides.
pub const NO_ALLIES: &str = "No Allies";
/// Plain checkbox written to the spawn file.
pub const CRATES: &str = "Crates";
/// Checkbox that denies scoring when checked.
pub const SHORT_GAME: &str = "Short Game";
/// Checkbox that strips default starting waypoints.
pub const REMOVE_STARTS: &str = "Remove Starts";
/// Choice option with a spawn value per item.
pub const GAME_SPEED: &str = "Game Speed";

/// Four sides (two Allied, two Soviet) and one selector per faction.
#[must_use]
pub fn standard_layout() -> SideLayout {
    SideLayout::new(
        vec![
            "America".to_string(),
            "Korea".to_string(),
            "Russia".to_string(),
            "Iraq".to_string(),
        ],
        vec![
            RandomSelector::new("Random Allies", vec![0, 1]),
            RandomSelector::new("Random Soviet", vec![2, 3]),
        ],
    )
}

/// Eight colors whose engine indices differ from their palette positions.
#[must_use]
pub fn standard_palette() -> ColorPalette {
    let names = ["Gold", "Red", "Blue", "Green", "Orange", "Teal", "Purple", "Pink"];
    ColorPalette::new(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| MultiplayerColor::new(*name, (i * 3) % names.len()))
            .collect(),
    )
}

/// Skirmish lobby configuration.
#[must_use]
pub fn lobby_config() -> LobbyConfig {
    LobbyConfig {
        layout: standard_layout(),
        palette: standard_palette(),
        forced_spawn_options: vec![("Ra2Mode".to_string(), "False".to_string())],
        remove_start_waypoints_option: Some(REMOVE_STARTS.to_string()),
        is_multiplayer: false,
    }
}

/// The fixture option set.
#[must_use]
pub fn standard_options() -> OptionSet {
    let mut options = OptionSet::new();
    let checkboxes = [
        (
            NO_ALLIES,
            CheckboxSpec {
                disallowed_sides: vec![0, 1],
                ..CheckboxSpec::default()
            },
            false,
        ),
        (
            CRATES,
            CheckboxSpec {
                spawn_key: Some("Crates".to_string()),
                ..CheckboxSpec::default()
            },
            true,
        ),
        (
            SHORT_GAME,
            CheckboxSpec {
                spawn_key: Some("ShortGame".to_string()),
                scoring: ScoringEffect::DenyWhenSet,
                ..CheckboxSpec::default()
            },
            false,
        ),
        (REMOVE_STARTS, CheckboxSpec::default(), false),
    ];
    for (name, spec, checked) in checkboxes {
        // Fixture names are unique.
        let _ = options.insert(OptionControl::checkbox(name, spec, checked));
    }

    let speed = ChoiceSpec {
        spawn_key: Some("GameSpeed".to_string()),
        items: (0..4)
            .map(|i| ChoiceItem::new(format!("Speed {i}")).with_spawn_value(i.to_string()))
            .collect(),
    };
    if let Ok(control) = OptionControl::new(GAME_SPEED, OptionKind::Choice(speed), OptionValue::Choice(1)) {
        let _ = options.insert(control);
    }
    options
}

/// Waypoint geometry for `count` starting locations.
#[must_use]
pub fn waypoint_geometry(count: usize) -> IniDocument {
    let mut geometry = IniDocument::new();
    geometry.set("Basic", "Name", "Fixture");
    for i in 0..count {
        geometry.set_int("Waypoints", i.to_string(), 50_050 + i * 1_001);
    }
    geometry
}

/// A plain map with `max_players` starting locations.
#[must_use]
pub fn arena_map(max_players: usize) -> Map {
    let mut map = Map::new(format!("Arena {max_players}"), max_players);
    map.id = format!("arena-{max_players}");
    map.geometry = waypoint_geometry(max_players);
    map
}

/// A coop mission vetoing the Soviet sides and the first color.
#[must_use]
pub fn coop_mission() -> Map {
    let mut map = arena_map(4);
    map.name = "Mission".to_string();
    map.id = "mission".to_string();
    map.coop = Some(CoopInfo {
        disallowed_sides: vec![2, 3],
        disallowed_colors: vec![0],
        disallowed_starts: vec![],
    });
    map
}

/// The standard game mode.
#[must_use]
pub fn standard_mode() -> GameMode {
    GameMode::new("Standard")
}

/// A session with the fixture config, no selection and no AI.
///
/// # Panics
///
/// Panics if the fixture config is inconsistent.
#[must_use]
pub fn empty_session(seed: u64) -> LobbySession {
    LobbySession::new(lobby_config(), Participant::human(HOST), standard_options(), seed)
        .expect("fixture session")
}

/// A skirmish on `map` against the given AI.
///
/// # Panics
///
/// Panics if the AI do not fit on the map.
#[must_use]
pub fn skirmish_session(map: Map, ai: &[AiLevel], seed: u64) -> LobbySession {
    let mut session = empty_session(seed);
    for level in ai {
        session.add_ai(Participant::ai(*level)).expect("fixture AI");
    }
    session.select(standard_mode(), map);
    session
}
