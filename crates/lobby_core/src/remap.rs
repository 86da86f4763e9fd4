//! Separation of stacked starting locations.
//!
//! Pre-placed map objects are owned per starting waypoint, so the engine
//! needs every player on a distinct waypoint. Players sharing a location are
//! moved to the lowest unused waypoint in `0..8`, and that waypoint is made
//! to point at the shared location's cell.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LobbyError, Result};
use crate::ini::IniDocument;
use crate::map::MAX_START_WAYPOINTS;
use crate::randomizer::HouseInfo;

const WAYPOINTS_SECTION: &str = "Waypoints";

/// One stacked participant moved to a new waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRemap {
    /// Roster index.
    pub participant: usize,
    /// Shared location the participant actually starts at.
    pub real: usize,
    /// Distinct waypoint written to the spawn file.
    pub assigned: usize,
}

/// Give every stacked participant a distinct waypoint and patch `geometry`.
///
/// When `remove_default_starts` is set, waypoints `0..8` are stripped first
/// (unless the map enforces its player count) and only the ones still in use
/// are restored from their original coordinates.
pub fn remap_stacked_starts(
    houses: &mut [HouseInfo],
    geometry: &mut IniDocument,
    remove_default_starts: bool,
    enforce_max_players: bool,
) -> Result<Vec<StartRemap>> {
    let original: Vec<Option<String>> = (0..MAX_START_WAYPOINTS)
        .map(|i| geometry.get(WAYPOINTS_SECTION, &i.to_string()).map(str::to_string))
        .collect();
    let coordinate = |location: usize| -> Result<String> {
        original.get(location).cloned().flatten().ok_or_else(|| {
            LobbyError::InvariantViolation(format!("no coordinates for starting location {location}"))
        })
    };

    let stripped = remove_default_starts && !enforce_max_players;
    if stripped {
        debug!("Removing default starting waypoints");
        for i in 0..MAX_START_WAYPOINTS {
            geometry.remove_key(WAYPOINTS_SECTION, &i.to_string());
        }
    }

    let mut used = [false; MAX_START_WAYPOINTS];
    for house in houses.iter() {
        if let Some(real) = house.real_starting_waypoint {
            if let Some(slot) = used.get_mut(real) {
                *slot = true;
            }
        }
    }

    let mut remaps = Vec::new();
    for (participant, house) in houses.iter_mut().enumerate() {
        let Some(real) = house.real_starting_waypoint else {
            continue;
        };
        if house.starting_waypoint.is_some() {
            continue;
        }

        let assigned = used.iter().position(|&u| !u).ok_or_else(|| {
            LobbyError::InvariantViolation("no free starting waypoint for stacked location".into())
        })?;
        used[assigned] = true;

        let cell = coordinate(real)?;
        geometry.set(WAYPOINTS_SECTION, assigned.to_string(), cell);
        house.starting_waypoint = Some(assigned);

        info!("Stacked start {real} of participant {participant} moved to waypoint {assigned}");
        remaps.push(StartRemap {
            participant,
            real,
            assigned,
        });
    }

    if stripped {
        for house in houses.iter() {
            if let Some(location) = house.starting_waypoint {
                let key = location.to_string();
                if geometry.get(WAYPOINTS_SECTION, &key).is_none() {
                    geometry.set(WAYPOINTS_SECTION, key, coordinate(location)?);
                }
            }
        }
    }

    Ok(remaps)
}
