//! Alliance tables.

use crate::ini::IniDocument;
use crate::map::TeamStartMapping;
use crate::randomizer::HouseInfo;
use crate::roster::Roster;
use crate::slots::SlotOrder;

const ALLY_KEYS: [&str; 7] = [
    "HouseAllyOne",
    "HouseAllyTwo",
    "HouseAllyThree",
    "HouseAllyFour",
    "HouseAllyFive",
    "HouseAllySix",
    "HouseAllySeven",
];

/// Team a participant plays on this match.
///
/// A team-start mapping on the participant's real starting location
/// overrides the team picked in the lobby.
#[must_use]
pub fn effective_team(
    team: Option<u8>,
    house: &HouseInfo,
    mappings: &[TeamStartMapping],
) -> Option<u8> {
    if house.is_spectator {
        return None;
    }
    house
        .real_starting_waypoint
        .and_then(|real| mappings.iter().find(|m| m.start == real && !m.blocked))
        .and_then(|m| m.team)
        .or(team)
}

/// Write `[Multi{n}_Alliances]` for every participant on a team.
///
/// Allies are listed by zero-based slot, in slot order.
pub fn write_alliances(
    ini: &mut IniDocument,
    roster: &Roster,
    houses: &[HouseInfo],
    slots: &SlotOrder,
    mappings: &[TeamStartMapping],
) {
    let teams: Vec<Option<u8>> = slots
        .iter()
        .map(|(_, p)| {
            let team = roster.get(p).and_then(|participant| participant.team);
            houses.get(p).and_then(|house| effective_team(team, house, mappings))
        })
        .collect();

    for (slot, team) in teams.iter().enumerate() {
        let Some(team) = team else {
            continue;
        };
        let allies = teams
            .iter()
            .enumerate()
            .filter(|&(other, t)| other != slot && *t == Some(*team))
            .map(|(other, _)| other);

        let section = format!("{}_Alliances", SlotOrder::key(slot));
        for (key, ally) in ALLY_KEYS.iter().zip(allies) {
            ini.set_int(&section, *key, ally);
        }
    }
}
