//! Forced option merging.
//!
//! When a map or game mode is selected, the options either of them forces
//! are locked to the forced values and every other option goes back to the
//! host's own pick. Game-mode values are applied first and map values
//! second, so the map wins when both force the same option.

use tracing::{debug, warn};

use crate::map::ForcedValues;
use crate::options::{OptionSet, OptionValue};

/// Where a forced value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcingSource {
    /// The selected game mode.
    GameMode,
    /// The selected map.
    Map,
}

/// Apply the forced values of one source to the still-free options.
///
/// Forced options are removed from `free`. An option forced by an earlier
/// source is still overwritten, which is what lets the map win.
fn apply_forced(
    options: &mut OptionSet,
    free: &mut Vec<String>,
    source: ForcingSource,
    forced: &ForcedValues,
) {
    let values = forced
        .checkboxes
        .iter()
        .map(|(name, v)| (name, OptionValue::Bool(*v)))
        .chain(
            forced
                .choices
                .iter()
                .map(|(name, v)| (name, OptionValue::Choice(*v))),
        );

    for (name, value) in values {
        let Some(option) = options.get_mut(name) else {
            warn!("{source:?} forces unknown option '{name}', ignoring");
            continue;
        };
        if let Err(e) = option.apply_forced(value) {
            warn!("{source:?} forced value rejected: {e}");
            continue;
        }
        debug!("{source:?} forces '{name}' = {value}");
        free.retain(|n| n != name);
    }
}

/// Merge game-mode and map forced values into the option set.
///
/// Returns the names of options that ended up forced, in option order.
pub fn apply_forced_options(
    options: &mut OptionSet,
    game_mode: &ForcedValues,
    map: &ForcedValues,
) -> Vec<String> {
    let mut free: Vec<String> = options.iter().map(|o| o.name().to_string()).collect();

    apply_forced(options, &mut free, ForcingSource::GameMode, game_mode);
    apply_forced(options, &mut free, ForcingSource::Map, map);

    for name in &free {
        if let Some(option) = options.get_mut(name) {
            option.restore_host();
        }
    }

    options
        .iter()
        .filter(|o| !free.iter().any(|n| n == o.name()))
        .map(|o| o.name().to_string())
        .collect()
}
