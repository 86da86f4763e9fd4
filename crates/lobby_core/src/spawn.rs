//! `spawn.ini` generation.
//!
//! Projects the resolved roster and options into the engine's launch
//! configuration. Section layout:
//!
//! * `[Settings]`: session-wide values, the local player's house, then
//!   option values and forced raw entries.
//! * `[Other{n}]`: every non-local human.
//! * `[HouseHandicaps]`, `[HouseCountries]`, `[HouseColors]`: AI, by slot.
//! * `[IsSpectator]`, `[Multi{n}_Alliances]`, `[SpawnLocations]`: by slot.

use tracing::debug;

use crate::alliances::write_alliances;
use crate::error::{LobbyError, Result};
use crate::ini::IniDocument;
use crate::map::{GameMode, Map, TeamStartMapping};
use crate::options::{OptionSet, SETTINGS_SECTION};
use crate::randomizer::HouseInfo;
use crate::rank::{game_type, pvp_team_count, GameType};
use crate::roster::Roster;
use crate::slots::SlotOrder;

/// File name of the patched map the engine loads.
pub const SPAWN_MAP_NAME: &str = "spawnmap.ini";

/// Everything the spawn writer reads.
#[derive(Debug, Clone, Copy)]
pub struct SpawnInputs<'a> {
    /// Name of the local human.
    pub local_name: &'a str,
    /// Participants.
    pub roster: &'a Roster,
    /// Resolved houses in roster order, after stacked-start remapping.
    pub houses: &'a [HouseInfo],
    /// Slot numbering.
    pub slots: &'a SlotOrder,
    /// Session options.
    pub options: &'a OptionSet,
    /// Selected map.
    pub map: &'a Map,
    /// Selected game mode.
    pub game_mode: &'a GameMode,
    /// Raw `[Settings]` entries forced for every session.
    pub lobby_forced: &'a [(String, String)],
    /// Team-start mappings.
    pub team_start_mappings: &'a [TeamStartMapping],
    /// Session seed.
    pub seed: u64,
}

/// Build `spawn.ini`.
pub fn write_spawn_config(inputs: &SpawnInputs<'_>) -> Result<IniDocument> {
    let roster = inputs.roster;
    let houses = inputs.houses;
    if houses.len() != roster.len() {
        return Err(LobbyError::InvariantViolation(format!(
            "{} houses for {} participants",
            houses.len(),
            roster.len()
        )));
    }
    if inputs.slots.len() != houses.len() {
        return Err(LobbyError::InvariantViolation(format!(
            "slot order covers {} of {} houses",
            inputs.slots.len(),
            houses.len()
        )));
    }
    let local_index = roster.human_index(inputs.local_name).ok_or_else(|| {
        LobbyError::InvariantViolation(format!("local player '{}' is not in the roster", inputs.local_name))
    })?;
    let local = &houses[local_index];

    let mut ini = IniDocument::new();

    ini.set(SETTINGS_SECTION, "Name", inputs.local_name);
    ini.set(SETTINGS_SECTION, "Scenario", SPAWN_MAP_NAME);
    ini.set(SETTINGS_SECTION, "UIGameMode", inputs.game_mode.ui_name.as_str());
    ini.set(SETTINGS_SECTION, "UIMapName", inputs.map.name.as_str());
    ini.set_int(SETTINGS_SECTION, "PlayerCount", roster.human_count());
    ini.set_int(SETTINGS_SECTION, "Side", local.side_index);
    ini.set_bool(SETTINGS_SECTION, "IsSpectator", local.is_spectator);
    ini.set_int(SETTINGS_SECTION, "Color", local.color_index);
    ini.set_int(SETTINGS_SECTION, "AIPlayers", roster.ai_count());
    ini.set_int(SETTINGS_SECTION, "Seed", inputs.seed);
    if pvp_team_count(roster) > 1 {
        ini.set_bool(SETTINGS_SECTION, "CoachMode", true);
    }
    if game_type(roster) == GameType::Coop {
        ini.set_bool(SETTINGS_SECTION, "AutoSurrender", false);
    }

    inputs.options.write_spawn(&mut ini);

    let forced = inputs
        .lobby_forced
        .iter()
        .chain(&inputs.game_mode.forced_spawn_options)
        .chain(&inputs.map.forced_spawn_options);
    for (key, value) in forced {
        ini.set(SETTINGS_SECTION, key.as_str(), value.as_str());
    }

    let mut other = 1;
    for (i, p) in roster.humans().iter().enumerate() {
        if i == local_index {
            continue;
        }
        let house = &houses[i];
        let section = format!("Other{other}");
        ini.set(&section, "Name", p.name.as_str());
        ini.set_int(&section, "Side", house.side_index);
        ini.set_bool(&section, "IsSpectator", house.is_spectator);
        ini.set_int(&section, "Color", house.color_index);
        ini.set(&section, "Ip", p.address.as_str());
        ini.set_int(&section, "Port", p.port);
        other += 1;
    }

    let human_count = roster.human_count();
    for (ai_index, ai) in roster.ai().iter().enumerate() {
        let house = &houses[human_count + ai_index];
        let key = SlotOrder::key(human_count + ai_index);
        let handicap = ai.ai_level.map_or(0, |level| level.handicap());
        ini.set_int("HouseHandicaps", key.as_str(), handicap);
        ini.set_int("HouseCountries", key.as_str(), house.side_index);
        ini.set_int("HouseColors", key.as_str(), house.color_index);
    }

    for (slot, p) in inputs.slots.iter().take(human_count) {
        if houses[p].is_spectator {
            ini.set_bool("IsSpectator", SlotOrder::key(slot), true);
        }
    }

    write_alliances(&mut ini, roster, houses, inputs.slots, inputs.team_start_mappings);

    for (slot, p) in inputs.slots.iter() {
        if let Some(waypoint) = houses[p].starting_waypoint {
            ini.set_int("SpawnLocations", SlotOrder::key(slot), waypoint);
        }
    }

    debug!(
        "spawn.ini: {} humans, {} AI, seed {}",
        human_count,
        roster.ai_count(),
        inputs.seed
    );
    Ok(ini)
}

/// Side, color and spectator state of one house as written to `spawn.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnAssignment {
    /// Human name; `None` for AI.
    pub human: Option<String>,
    /// Zero-based slot for AI; `None` for humans.
    pub ai_slot: Option<usize>,
    /// Side index.
    pub side_index: usize,
    /// Engine color index.
    pub color_index: usize,
    /// Spectating.
    pub is_spectator: bool,
}

/// The assignments [`read_assignments`] yields for a written config: the
/// local human, the other humans in roster order, then AI in slot order.
#[must_use]
pub fn expected_assignments(local_name: &str, roster: &Roster, houses: &[HouseInfo]) -> Vec<SpawnAssignment> {
    let human = |i: usize, name: &str| {
        houses.get(i).map(|h| SpawnAssignment {
            human: Some(name.to_string()),
            ai_slot: None,
            side_index: h.side_index,
            color_index: h.color_index,
            is_spectator: h.is_spectator,
        })
    };

    let local = roster.human_index(local_name);
    let mut out: Vec<SpawnAssignment> = local.and_then(|i| human(i, local_name)).into_iter().collect();
    for (i, p) in roster.humans().iter().enumerate() {
        if Some(i) != local {
            out.extend(human(i, &p.name));
        }
    }
    for i in roster.human_count()..roster.len() {
        if let Some(h) = houses.get(i) {
            out.push(SpawnAssignment {
                human: None,
                ai_slot: Some(i),
                side_index: h.side_index,
                color_index: h.color_index,
                is_spectator: false,
            });
        }
    }
    out
}

fn read_index(ini: &IniDocument, section: &str, key: &str) -> Result<usize> {
    let raw = ini.get_int(section, key).ok_or_else(|| LobbyError::DataParseError {
        path: "spawn.ini".to_string(),
        message: format!("missing integer [{section}] {key}"),
    })?;
    usize::try_from(raw).map_err(|_| LobbyError::DataParseError {
        path: "spawn.ini".to_string(),
        message: format!("negative value for [{section}] {key}"),
    })
}

fn read_human(ini: &IniDocument, section: &str) -> Result<SpawnAssignment> {
    let name = ini.get(section, "Name").ok_or_else(|| LobbyError::DataParseError {
        path: "spawn.ini".to_string(),
        message: format!("missing [{section}] Name"),
    })?;
    Ok(SpawnAssignment {
        human: Some(name.to_string()),
        ai_slot: None,
        side_index: read_index(ini, section, "Side")?,
        color_index: read_index(ini, section, "Color")?,
        is_spectator: ini.get_bool(section, "IsSpectator").unwrap_or(false),
    })
}

/// Re-derive the per-house assignments from a written `spawn.ini`.
pub fn read_assignments(ini: &IniDocument) -> Result<Vec<SpawnAssignment>> {
    let mut out = vec![read_human(ini, SETTINGS_SECTION)?];

    let mut other = 1;
    while ini.has_section(&format!("Other{other}")) {
        out.push(read_human(ini, &format!("Other{other}"))?);
        other += 1;
    }

    let human_count = read_index(ini, SETTINGS_SECTION, "PlayerCount")?;
    let ai_count = read_index(ini, SETTINGS_SECTION, "AIPlayers")?;
    for slot in human_count..human_count + ai_count {
        let key = SlotOrder::key(slot);
        out.push(SpawnAssignment {
            human: None,
            ai_slot: Some(slot),
            side_index: read_index(ini, "HouseCountries", &key)?,
            color_index: read_index(ini, "HouseColors", &key)?,
            is_spectator: false,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::SideChoice;
    use crate::options::{CheckboxSpec, OptionControl};
    use crate::roster::{AiLevel, Participant};

    fn house(side: usize, color: usize, start: Option<usize>, spectator: bool) -> HouseInfo {
        HouseInfo {
            side_index: side,
            color_index: color,
            starting_waypoint: start,
            real_starting_waypoint: start,
            is_spectator: spectator,
        }
    }

    struct Fixture {
        roster: Roster,
        houses: Vec<HouseInfo>,
        options: OptionSet,
        map: Map,
        mode: GameMode,
    }

    fn fixture() -> Fixture {
        let mut roster = Roster::new();
        roster.add_human(Participant::human("Host").with_team(1)).unwrap();
        let mut guest = Participant::human("Guest").with_team(1);
        guest.address = "10.0.0.2".into();
        guest.port = 1234;
        roster.add_human(guest).unwrap();
        roster
            .add_human(Participant::human("Watcher").with_side(SideChoice::Spectator))
            .unwrap();
        roster.add_ai(Participant::ai(AiLevel::Hard).with_team(2)).unwrap();

        let houses = vec![
            house(1, 4, Some(0), false),
            house(2, 2, Some(1), false),
            house(0, 6, None, true),
            house(3, 1, Some(2), false),
        ];

        let mut options = OptionSet::new();
        options
            .insert(OptionControl::checkbox(
                "Short Game",
                CheckboxSpec {
                    spawn_key: Some("ShortGame".into()),
                    ..Default::default()
                },
                true,
            ))
            .unwrap();

        let mut map = Map::new("Arena", 4);
        map.forced_spawn_options = vec![("ShortGame".into(), "False".into())];
        let mut mode = GameMode::new("Standard");
        mode.ui_name = "Standard Battle".into();
        mode.forced_spawn_options = vec![("Bases".into(), "True".into())];

        Fixture {
            roster,
            houses,
            options,
            map,
            mode,
        }
    }

    fn write(f: &Fixture, lobby_forced: &[(String, String)]) -> IniDocument {
        let slots = SlotOrder::new(&f.houses, f.roster.human_count());
        write_spawn_config(&SpawnInputs {
            local_name: "Host",
            roster: &f.roster,
            houses: &f.houses,
            slots: &slots,
            options: &f.options,
            map: &f.map,
            game_mode: &f.mode,
            lobby_forced,
            team_start_mappings: &[],
            seed: 4242,
        })
        .unwrap()
    }

    #[test]
    fn test_settings_section() {
        let f = fixture();
        let ini = write(&f, &[]);

        assert_eq!(ini.get("Settings", "Name"), Some("Host"));
        assert_eq!(ini.get("Settings", "Scenario"), Some("spawnmap.ini"));
        assert_eq!(ini.get("Settings", "UIGameMode"), Some("Standard Battle"));
        assert_eq!(ini.get("Settings", "PlayerCount"), Some("3"));
        assert_eq!(ini.get("Settings", "Side"), Some("1"));
        assert_eq!(ini.get("Settings", "Color"), Some("4"));
        assert_eq!(ini.get("Settings", "IsSpectator"), Some("False"));
        assert_eq!(ini.get("Settings", "AIPlayers"), Some("1"));
        assert_eq!(ini.get("Settings", "Seed"), Some("4242"));
        // One human team of two: coop, no coach mode.
        assert_eq!(ini.get("Settings", "CoachMode"), None);
        assert_eq!(ini.get("Settings", "AutoSurrender"), Some("False"));
    }

    #[test]
    fn test_forced_entries_win_over_options() {
        let f = fixture();
        let lobby = vec![("Bases".to_string(), "False".to_string())];
        let ini = write(&f, &lobby);

        assert_eq!(ini.get("Settings", "ShortGame"), Some("False"));
        // Game mode is applied after the lobby-wide entries.
        assert_eq!(ini.get("Settings", "Bases"), Some("True"));
    }

    #[test]
    fn test_other_sections_and_ai_tables() {
        let f = fixture();
        let ini = write(&f, &[]);

        assert_eq!(ini.get("Other1", "Name"), Some("Guest"));
        assert_eq!(ini.get("Other1", "Ip"), Some("10.0.0.2"));
        assert_eq!(ini.get("Other1", "Port"), Some("1234"));
        assert_eq!(ini.get("Other2", "IsSpectator"), Some("True"));
        assert!(!ini.has_section("Other3"));

        assert_eq!(ini.get("HouseHandicaps", "Multi4"), Some("0"));
        assert_eq!(ini.get("HouseCountries", "Multi4"), Some("3"));
        assert_eq!(ini.get("HouseColors", "Multi4"), Some("1"));
    }

    #[test]
    fn test_slot_tables_follow_color_order() {
        let f = fixture();
        let ini = write(&f, &[]);

        // Human colors 4, 2, 6 give slots Guest, Host, Watcher.
        assert_eq!(ini.get("SpawnLocations", "Multi1"), Some("1"));
        assert_eq!(ini.get("SpawnLocations", "Multi2"), Some("0"));
        assert_eq!(ini.get("SpawnLocations", "Multi3"), None);
        assert_eq!(ini.get("SpawnLocations", "Multi4"), Some("2"));
        assert_eq!(ini.get("IsSpectator", "Multi3"), Some("True"));
        assert_eq!(ini.get("Multi1_Alliances", "HouseAllyOne"), Some("1"));
        assert_eq!(ini.get("Multi2_Alliances", "HouseAllyOne"), Some("0"));
    }

    #[test]
    fn test_assignments_round_trip() {
        let f = fixture();
        let ini = write(&f, &[]);
        let text = ini.to_string();
        let reparsed = IniDocument::parse(&text).unwrap();

        assert_eq!(
            read_assignments(&reparsed).unwrap(),
            expected_assignments("Host", &f.roster, &f.houses)
        );
    }

    #[test]
    fn test_mismatched_slot_order_is_rejected() {
        let f = fixture();
        let fewer = SlotOrder::new(&f.houses[..2], 2);
        let result = write_spawn_config(&SpawnInputs {
            local_name: "Host",
            roster: &f.roster,
            houses: &f.houses,
            slots: &fewer,
            options: &f.options,
            map: &f.map,
            game_mode: &f.mode,
            lobby_forced: &[],
            team_start_mappings: &[],
            seed: 1,
        });
        assert!(matches!(result, Err(LobbyError::InvariantViolation(_))));
    }

    #[test]
    fn test_missing_local_player_is_rejected() {
        let f = fixture();
        let slots = SlotOrder::new(&f.houses, 3);
        let result = write_spawn_config(&SpawnInputs {
            local_name: "Nobody",
            roster: &f.roster,
            houses: &f.houses,
            slots: &slots,
            options: &f.options,
            map: &f.map,
            game_mode: &f.mode,
            lobby_forced: &[],
            team_start_mappings: &[],
            seed: 1,
        });
        assert!(result.is_err());
    }
}
