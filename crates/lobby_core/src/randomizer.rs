//! Seed-driven resolution of random sides, colors and starting locations.
//!
//! Everything random about a launch is drawn from one [`ChaCha8Rng`] seeded
//! from the session seed, in a fixed order: participant by participant in
//! roster order, side then color then start. Re-running with the same roster
//! and seed reproduces the same houses.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constraints::ConstraintSnapshot;
use crate::error::{LobbyError, Result};
use crate::factions::{ColorPalette, SideChoice, SideLayout};
use crate::map::{Map, TeamStartMapping};
use crate::roster::{Participant, Roster};

/// The resolved side, color and start of one participant for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HouseInfo {
    /// Concrete side index.
    pub side_index: usize,
    /// Engine color index.
    pub color_index: usize,
    /// Distinct starting waypoint; `None` lets the engine decide.
    pub starting_waypoint: Option<usize>,
    /// Starting location before stacked locations are separated.
    pub real_starting_waypoint: Option<usize>,
    /// Whether the participant spectates.
    pub is_spectator: bool,
}

impl HouseInfo {
    /// Whether the real location is shared and still needs a distinct slot.
    #[must_use]
    pub const fn is_stacked(&self) -> bool {
        self.real_starting_waypoint.is_some() && self.starting_waypoint.is_none()
    }
}

/// Everything the randomizer reads.
#[derive(Debug, Clone, Copy)]
pub struct RandomizeInputs<'a> {
    /// Participants in roster order.
    pub roster: &'a Roster,
    /// Sides and random selectors.
    pub layout: &'a SideLayout,
    /// Selectable colors.
    pub palette: &'a ColorPalette,
    /// Selected map.
    pub map: &'a Map,
    /// Current constraints.
    pub constraints: &'a ConstraintSnapshot,
    /// Team-start mappings from the extra options.
    pub team_start_mappings: &'a [TeamStartMapping],
    /// Session seed.
    pub seed: u64,
}

/// Pools shared across participants during one randomization pass.
struct Pools {
    free_colors: Vec<usize>,
    free_starts: Vec<usize>,
    taken_starts: Vec<usize>,
    draw_starts: bool,
}

impl Pools {
    fn build(inputs: &RandomizeInputs<'_>) -> Self {
        let map = inputs.map;

        let mut free_colors: Vec<usize> = (0..inputs.palette.len()).collect();
        free_colors.retain(|c| !map.disallowed_colors().contains(c));
        for p in inputs.roster.iter() {
            if let Some(color) = p.color {
                free_colors.retain(|&c| c != color);
            }
        }

        let mut free_starts: Vec<usize> = (0..map.max_players).collect();
        for p in inputs.roster.iter().filter(|p| !p.is_spectator()) {
            if let Some(start) = p.start {
                free_starts.retain(|&s| s != start);
            }
        }
        for mapping in inputs.team_start_mappings.iter().filter(|m| m.blocked) {
            free_starts.retain(|&s| s != mapping.start);
        }

        Self {
            free_colors,
            free_starts,
            taken_starts: Vec::new(),
            draw_starts: !inputs.team_start_mappings.is_empty(),
        }
    }
}

/// Resolve every participant's house.
///
/// Only called after the launch gate has passed, so an exhausted color pool
/// or a side choice with no allowed member is an internal failure.
pub fn randomize(inputs: &RandomizeInputs<'_>) -> Result<Vec<HouseInfo>> {
    let mut rng = ChaCha8Rng::seed_from_u64(inputs.seed);
    let mut pools = Pools::build(inputs);
    let allowed = inputs.constraints.allowed_sides();

    let mut houses = Vec::with_capacity(inputs.roster.len());
    for p in inputs.roster.iter() {
        let is_spectator = p.is_spectator();
        let side_index = resolve_side(p, inputs.layout, inputs.constraints, &allowed, &mut rng)?;
        let color_index = resolve_color(p, inputs.palette, &mut pools, &mut rng)?;
        let (starting_waypoint, real_starting_waypoint) = if is_spectator {
            (None, None)
        } else {
            resolve_start(p, &mut pools, &mut rng)
        };

        debug!(
            "{}: side {side_index}, color {color_index}, start {starting_waypoint:?} (real {real_starting_waypoint:?})",
            p.name
        );

        houses.push(HouseInfo {
            side_index,
            color_index,
            starting_waypoint,
            real_starting_waypoint,
            is_spectator,
        });
    }

    Ok(houses)
}

fn pick<T: Copy>(rng: &mut ChaCha8Rng, items: &[T]) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.gen_range(0..items.len())])
    }
}

fn resolve_side(
    p: &Participant,
    layout: &SideLayout,
    constraints: &ConstraintSnapshot,
    allowed: &[usize],
    rng: &mut ChaCha8Rng,
) -> Result<usize> {
    match p.side {
        SideChoice::Side(i) => Ok(i),
        SideChoice::Random | SideChoice::Spectator => pick(rng, allowed).ok_or_else(|| {
            LobbyError::InvariantViolation(format!("no allowed side left for {}", p.name))
        }),
        SideChoice::Selector(k) => {
            let selector = layout.selectors.get(k).ok_or_else(|| {
                LobbyError::InvariantViolation(format!("{} uses unknown random selector {k}", p.name))
            })?;
            let members: Vec<usize> = selector
                .sides
                .iter()
                .copied()
                .filter(|&s| !constraints.disallowed_sides.get(s).copied().unwrap_or(true))
                .collect();
            pick(rng, &members).ok_or_else(|| {
                LobbyError::InvariantViolation(format!(
                    "random selector '{}' has no allowed side",
                    selector.name
                ))
            })
        }
    }
}

fn resolve_color(
    p: &Participant,
    palette: &ColorPalette,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
) -> Result<usize> {
    let palette_index = match p.color {
        Some(color) => color,
        None => {
            if pools.free_colors.is_empty() {
                return Err(LobbyError::InvariantViolation(format!(
                    "color pool exhausted at {}",
                    p.name
                )));
            }
            let at = rng.gen_range(0..pools.free_colors.len());
            pools.free_colors.remove(at)
        }
    };
    palette.game_index(palette_index).ok_or_else(|| {
        LobbyError::InvariantViolation(format!("{} uses unknown color {palette_index}", p.name))
    })
}

/// Returns `(starting, real)`.
fn resolve_start(p: &Participant, pools: &mut Pools, rng: &mut ChaCha8Rng) -> (Option<usize>, Option<usize>) {
    if let Some(start) = p.start {
        if pools.taken_starts.contains(&start) {
            return (None, Some(start));
        }
        pools.taken_starts.push(start);
        return (Some(start), Some(start));
    }

    if !pools.draw_starts || pools.free_starts.is_empty() {
        return (None, None);
    }

    let at = rng.gen_range(0..pools.free_starts.len());
    let start = pools.free_starts.remove(at);
    pools.taken_starts.push(start);
    (Some(start), Some(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::{MultiplayerColor, RandomSelector};
    use crate::roster::AiLevel;

    fn layout() -> SideLayout {
        SideLayout::new(
            vec!["America".into(), "Korea".into(), "Russia".into(), "Iraq".into()],
            vec![RandomSelector::new("Random Soviet", vec![2, 3])],
        )
    }

    fn palette() -> ColorPalette {
        ColorPalette::new(
            ["Gold", "Red", "Blue", "Green", "Orange", "Purple", "Pink", "Teal"]
                .iter()
                .enumerate()
                .map(|(i, n)| MultiplayerColor::new(*n, 7 - i))
                .collect(),
        )
    }

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster
            .add_human(Participant::human("Host").with_side(SideChoice::Side(0)).with_color(0))
            .unwrap();
        roster
            .add_human(Participant::human("Guest").with_side(SideChoice::Selector(0)))
            .unwrap();
        roster.add_ai(Participant::ai(AiLevel::Hard)).unwrap();
        roster.add_ai(Participant::ai(AiLevel::Easy).with_start(1)).unwrap();
        roster
    }

    fn run(roster: &Roster, map: &Map, mappings: &[TeamStartMapping], seed: u64) -> Result<Vec<HouseInfo>> {
        let layout = layout();
        let palette = palette();
        let constraints = ConstraintSnapshot::unconstrained(&layout, &palette, map.max_players);
        randomize(&RandomizeInputs {
            roster,
            layout: &layout,
            palette: &palette,
            map,
            constraints: &constraints,
            team_start_mappings: mappings,
            seed,
        })
    }

    #[test]
    fn test_same_seed_same_houses() {
        let map = Map::new("Arena", 4);
        let a = run(&roster(), &map, &[], 1234).unwrap();
        let b = run(&roster(), &map, &[], 1234).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_explicit_choices_are_kept() {
        let map = Map::new("Arena", 4);
        let houses = run(&roster(), &map, &[], 7).unwrap();

        assert_eq!(houses[0].side_index, 0);
        assert_eq!(houses[0].color_index, 7);
        assert!(matches!(houses[1].side_index, 2 | 3));
        assert_eq!(houses[3].starting_waypoint, Some(1));
        assert_eq!(houses[3].real_starting_waypoint, Some(1));
    }

    #[test]
    fn test_random_colors_are_distinct_and_skip_explicit() {
        let map = Map::new("Arena", 4);
        let houses = run(&roster(), &map, &[], 99).unwrap();
        let mut colors: Vec<_> = houses.iter().map(|h| h.color_index).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), houses.len());
    }

    #[test]
    fn test_random_start_left_to_engine_without_mappings() {
        let map = Map::new("Arena", 4);
        let houses = run(&roster(), &map, &[], 5).unwrap();
        assert_eq!(houses[0].starting_waypoint, None);
        assert_eq!(houses[0].real_starting_waypoint, None);
    }

    #[test]
    fn test_random_start_drawn_with_mappings_and_avoids_blocked() {
        let map = Map::new("Arena", 4);
        let mappings = [
            TeamStartMapping { start: 0, team: None, blocked: true },
            TeamStartMapping { start: 2, team: Some(1), blocked: false },
        ];
        for seed in 0..20 {
            let houses = run(&roster(), &map, &mappings, seed).unwrap();
            let mut drawn: Vec<_> = houses[..2].iter().map(|h| h.starting_waypoint.unwrap()).collect();
            drawn.sort_unstable();
            assert_eq!(drawn, vec![2, 3], "seed {seed}");
            // Pool is empty for the third random participant.
            assert_eq!(houses[2].starting_waypoint, None);
        }
    }

    #[test]
    fn test_shared_explicit_start_is_stacked() {
        let map = Map::new("Arena", 4);
        let mut roster = Roster::new();
        roster.add_human(Participant::human("A").with_start(2)).unwrap();
        roster.add_human(Participant::human("B").with_start(2)).unwrap();

        let houses = run(&roster, &map, &[], 1).unwrap();
        assert!(!houses[0].is_stacked());
        assert!(houses[1].is_stacked());
        assert_eq!(houses[1].real_starting_waypoint, Some(2));
    }

    #[test]
    fn test_spectator_gets_no_start() {
        let map = Map::new("Arena", 4);
        let mut roster = Roster::new();
        roster
            .add_human(Participant::human("Watcher").with_side(SideChoice::Spectator).with_start(0))
            .unwrap();
        let houses = run(&roster, &map, &[], 3).unwrap();
        assert!(houses[0].is_spectator);
        assert_eq!(houses[0].starting_waypoint, None);
        assert_eq!(houses[0].real_starting_waypoint, None);
    }

    #[test]
    fn test_exhausted_color_pool_is_invariant_violation() {
        let map = Map::new("Arena", 8);
        let mut roster = Roster::new();
        roster.add_human(Participant::human("A")).unwrap();
        roster.add_human(Participant::human("B")).unwrap();
        let layout = layout();
        let palette = ColorPalette::new(vec![MultiplayerColor::new("Gold", 0)]);
        let constraints = ConstraintSnapshot::unconstrained(&layout, &palette, 8);

        let result = randomize(&RandomizeInputs {
            roster: &roster,
            layout: &layout,
            palette: &palette,
            map: &map,
            constraints: &constraints,
            team_start_mappings: &[],
            seed: 0,
        });
        assert!(matches!(result, Err(LobbyError::InvariantViolation(_))));
    }
}
