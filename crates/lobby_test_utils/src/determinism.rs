//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a lobby produces identical
//! launch files given identical inputs.
//!
//! # Testing Strategy
//!
//! Every participant in an online match writes its own spawn file, so the
//! launch pipeline must be 100% deterministic for a given lobby and seed.
//! Sources of non-determinism include:
//!
//! - **System randomness**: All "random" picks use a seeded `ChaCha8Rng`.
//!
//! - **HashMap iteration order**: INI sections and option sets are kept in
//!   insertion order.
//!
//! - **Slot ordering**: Humans are ordered by a stable sort on color index.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use lobby_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic pipeline).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Launch is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a pipeline multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `setup` - Function to create the initial state
/// * `run` - Function producing the output from the state
/// * `hash` - Function to compute the output hash
pub fn verify_determinism<S, O, Setup, Run, HashFn>(
    runs: usize,
    setup: Setup,
    run: Run,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Run: Fn(&mut S) -> O,
    HashFn: Fn(&O) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            hash(&run(&mut state))
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Hash of everything a launch writes.
#[must_use]
pub fn plan_hash(plan: &LaunchPlan) -> u64 {
    let mut hasher = DefaultHasher::new();
    plan.houses.hash(&mut hasher);
    plan.spawn.to_string().hash(&mut hasher);
    plan.map.to_string().hash(&mut hasher);
    hasher.finish()
}

/// Prepare the launch of freshly built sessions `runs` times.
///
/// A launch that fails hashes to 0, so a pipeline that only sometimes
/// fails is reported as non-deterministic.
pub fn verify_launch_determinism<F>(setup_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> LobbySession,
{
    verify_determinism(
        runs,
        setup_fn,
        |session| session.prepare_launch().ok(),
        |plan| plan.as_ref().map_or(0, plan_hash),
    )
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for lobby testing.
///
/// These strategies generate random but reproducible lobbies for
/// property-based testing against the fixture layout and palette.
pub mod strategies {
    use proptest::prelude::*;

    use lobby_core::prelude::*;

    /// Any AI level.
    pub fn arb_ai_level() -> impl Strategy<Value = AiLevel> {
        prop_oneof![Just(AiLevel::Easy), Just(AiLevel::Medium), Just(AiLevel::Hard)]
    }

    /// A playing side choice for the fixture layout (four sides, two selectors).
    pub fn arb_side_choice() -> impl Strategy<Value = SideChoice> {
        prop_oneof![
            Just(SideChoice::Random),
            (0usize..2).prop_map(SideChoice::Selector),
            (0usize..4).prop_map(SideChoice::Side),
        ]
    }

    /// An AI participant with optional color, start and team picks.
    pub fn arb_ai(max_players: usize) -> impl Strategy<Value = Participant> {
        (
            arb_ai_level(),
            arb_side_choice(),
            proptest::option::of(0usize..8),
            proptest::option::of(0..max_players),
            proptest::option::of(1u8..=4),
        )
            .prop_map(|(level, side, color, start, team)| {
                let mut p = Participant::ai(level).with_side(side);
                p.color = color;
                p.start = start;
                p.team = team;
                p
            })
    }

    /// One to `max_ai` AI participants.
    pub fn arb_ai_roster(max_ai: usize, max_players: usize) -> impl Strategy<Value = Vec<Participant>> {
        proptest::collection::vec(arb_ai(max_players), 1..=max_ai)
    }

    /// Any seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
