//! Properties of the launch pipeline over generated lobbies.

use lobby_core::prelude::*;
use lobby_core::spawn::{expected_assignments, read_assignments};
use lobby_test_utils::determinism::strategies::{arb_ai_roster, arb_seed};
use lobby_test_utils::determinism::{plan_hash, verify_launch_determinism};
use lobby_test_utils::fixtures::{
    arena_map, coop_mission, empty_session, lobby_config, skirmish_session, standard_mode,
    standard_options, HOST, NO_ALLIES, REMOVE_STARTS,
};
use proptest::prelude::*;

const MAP_SIZE: usize = 8;

fn session_with(ai: &[Participant], seed: u64) -> LobbySession {
    let mut session = empty_session(seed);
    for p in ai {
        session.add_ai(p.clone()).unwrap();
    }
    session.select(standard_mode(), arena_map(MAP_SIZE));
    session
}

fn assert_no_vetoed_references(session: &LobbySession) {
    let constraints = session.constraints();
    for p in session.roster().iter() {
        assert!(constraints.allows_side(p.side), "{} on vetoed side {:?}", p.name, p.side);
        if let Some(color) = p.color {
            assert!(constraints.allows_color(color), "{} on vetoed color {color}", p.name);
        }
        if let Some(start) = p.start {
            assert!(constraints.allows_start(start), "{} on vetoed start {start}", p.name);
        }
    }
}

proptest! {
    #[test]
    fn prop_launch_is_reproducible(ai in arb_ai_roster(7, MAP_SIZE), seed in arb_seed()) {
        let first = session_with(&ai, seed).prepare_launch().unwrap();
        let second = session_with(&ai, seed).prepare_launch().unwrap();
        prop_assert_eq!(&first.houses, &second.houses);
        prop_assert_eq!(plan_hash(&first), plan_hash(&second));
    }

    #[test]
    fn prop_vetoes_never_referenced(ai in arb_ai_roster(7, MAP_SIZE)) {
        let mut session = session_with(&ai, 1);
        session.set_option(NO_ALLIES, OptionValue::Bool(true)).unwrap();
        assert_no_vetoed_references(&session);
        prop_assert!(session.roster().iter().all(|p| !matches!(
            p.side,
            SideChoice::Side(0) | SideChoice::Side(1) | SideChoice::Selector(0)
        )));

        let plan = session.prepare_launch().unwrap();
        prop_assert!(plan.houses.iter().all(|h| h.side_index >= 2));
    }

    #[test]
    fn prop_located_houses_get_distinct_waypoints(
        ai in arb_ai_roster(7, MAP_SIZE),
        seed in arb_seed(),
        strip in any::<bool>(),
    ) {
        let mut session = session_with(&ai, seed);
        session.set_option(REMOVE_STARTS, OptionValue::Bool(strip)).unwrap();
        let plan = session.prepare_launch().unwrap();

        let mut seen = Vec::new();
        for house in plan.houses.iter().filter(|h| h.real_starting_waypoint.is_some()) {
            let waypoint = house.starting_waypoint.unwrap();
            prop_assert!(!seen.contains(&waypoint));
            seen.push(waypoint);
            prop_assert!(plan.map.get("Waypoints", &waypoint.to_string()).is_some());
        }
    }

    #[test]
    fn prop_spawn_file_reproduces_assignments(ai in arb_ai_roster(7, MAP_SIZE), seed in arb_seed()) {
        let mut session = session_with(&ai, seed);
        let plan = session.prepare_launch().unwrap();
        let reparsed = IniDocument::parse(&plan.spawn.to_string()).unwrap();

        let expected = expected_assignments(HOST, session.roster(), &plan.houses);
        prop_assert_eq!(read_assignments(&reparsed).unwrap(), expected);
    }
}

#[test]
fn test_fixture_launch_is_deterministic() {
    verify_launch_determinism(
        || skirmish_session(arena_map(4), &[AiLevel::Easy, AiLevel::Medium, AiLevel::Hard], 99),
        5,
    )
    .assert_deterministic();
}

#[test]
fn test_different_seeds_resolve_differently() {
    let hashes: Vec<u64> = (0..16)
        .map(|seed| {
            let mut session = skirmish_session(arena_map(8), &[AiLevel::Easy; 7], seed);
            plan_hash(&session.prepare_launch().unwrap())
        })
        .collect();
    let mut unique = hashes.clone();
    unique.sort_unstable();
    unique.dedup();
    assert!(unique.len() > 1);
}

#[test]
fn test_coop_vetoes_apply() {
    let mut session = skirmish_session(arena_map(4), &[AiLevel::Hard], 3);
    session
        .update_participant(
            0,
            ParticipantUpdate {
                side: Some(SideChoice::Side(2)),
                color: Some(Some(0)),
                ..ParticipantUpdate::default()
            },
        )
        .unwrap();

    session.select(standard_mode(), coop_mission());

    assert_no_vetoed_references(&session);
    let host = session.roster().get(0).unwrap();
    assert_eq!(host.side, SideChoice::Random);
    assert_eq!(host.color, None);

    let plan = session.prepare_launch().unwrap();
    let gold = lobby_config().palette.game_index(0).unwrap();
    assert!(plan.houses.iter().all(|h| h.side_index < 2));
    assert!(plan.houses.iter().all(|h| h.color_index != gold));
}

#[test]
fn test_forced_values_lock_options_and_map_wins() {
    let mut mode = standard_mode();
    mode.forced = ForcedValues {
        checkboxes: vec![("Crates".to_string(), true), ("Short Game".to_string(), true)],
        choices: vec![("Game Speed".to_string(), 3)],
    };
    let mut map = arena_map(4);
    map.forced = ForcedValues {
        checkboxes: vec![("Crates".to_string(), false)],
        choices: vec![],
    };

    let mut session = empty_session(1);
    session.select(mode, map);

    let options = session.options();
    let crates = options.get("Crates").unwrap();
    assert_eq!(crates.value(), OptionValue::Bool(false));
    assert!(!crates.allow_change());
    assert_eq!(options.get("Short Game").unwrap().value(), OptionValue::Bool(true));
    assert_eq!(options.get("Game Speed").unwrap().value(), OptionValue::Choice(3));
    assert!(options.get(NO_ALLIES).unwrap().allow_change());

    session.select(standard_mode(), arena_map(4));
    let restored = standard_options();
    for option in session.options().iter() {
        assert!(option.allow_change());
        assert_eq!(option.value(), restored.get(option.name()).unwrap().value());
    }
}

#[test]
fn test_stacked_explicit_starts_are_separated() {
    let mut session = empty_session(5);
    session.add_ai(Participant::ai(AiLevel::Hard).with_start(0)).unwrap();
    session.add_ai(Participant::ai(AiLevel::Hard).with_start(0)).unwrap();
    session.select(standard_mode(), arena_map(4));
    session
        .update_participant(
            0,
            ParticipantUpdate {
                start: Some(Some(0)),
                ..ParticipantUpdate::default()
            },
        )
        .unwrap();
    session.set_option(REMOVE_STARTS, OptionValue::Bool(true)).unwrap();

    let plan = session.prepare_launch().unwrap();

    assert_eq!(plan.houses[0].starting_waypoint, Some(0));
    assert_eq!(plan.remaps.len(), 2);
    let origin = arena_map(4).waypoint(0).map(str::to_string);
    for remap in &plan.remaps {
        assert_eq!(remap.real, 0);
        assert_eq!(
            plan.map.get("Waypoints", &remap.assigned.to_string()).map(str::to_string),
            origin
        );
    }
    // Unused default starts are stripped.
    assert_eq!(plan.map.get("Waypoints", "3"), None);
}
