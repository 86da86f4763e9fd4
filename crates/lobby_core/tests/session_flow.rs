//! End-to-end session flows: persisted settings and launching.

use lobby_core::prelude::*;
use lobby_core::statistics::AI_PLAYER_NAME;
use lobby_test_utils::fixtures::{
    arena_map, empty_session, lobby_config, skirmish_session, standard_mode, CRATES, GAME_SPEED,
    HOST,
};

struct NoopGame;

impl GameProcess for NoopGame {
    fn start(&mut self, _paths: &LaunchPaths) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct MemoryRecorder(Vec<MatchStatistics>);

impl StatisticsRecorder for MemoryRecorder {
    fn record(&mut self, statistics: MatchStatistics) -> Result<()> {
        self.0.push(statistics);
        Ok(())
    }
}

#[test]
fn test_settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ini");
    let layout = lobby_config().layout;

    let mut session = skirmish_session(arena_map(4), &[AiLevel::Hard, AiLevel::Easy], 1);
    session
        .update_participant(
            0,
            ParticipantUpdate {
                side: Some(SideChoice::Selector(1)),
                color: Some(Some(5)),
                team: Some(Some(2)),
                ..ParticipantUpdate::default()
            },
        )
        .unwrap();
    session.set_option(CRATES, OptionValue::Bool(false)).unwrap();
    session.set_option(GAME_SPEED, OptionValue::Choice(3)).unwrap();
    session.capture_settings().save(&path, &layout).unwrap();

    let saved = SavedSettings::load(&path, &layout).unwrap();
    assert_eq!(saved.map_id.as_deref(), Some("arena-4"));

    let mut restored = empty_session(2);
    restored.select(standard_mode(), arena_map(4));
    restored.apply_saved_settings(&saved).unwrap();

    let host = restored.roster().get(0).unwrap();
    assert_eq!(host.name, HOST);
    assert_eq!(host.side, SideChoice::Selector(1));
    assert_eq!(host.color, Some(5));
    assert_eq!(host.team, Some(2));
    let ai: Vec<Option<AiLevel>> = restored.roster().ai().iter().map(|p| p.ai_level).collect();
    assert_eq!(ai, vec![Some(AiLevel::Hard), Some(AiLevel::Easy)]);
    assert!(!restored.options().is_checked(CRATES));
    assert_eq!(restored.options().get(GAME_SPEED).unwrap().value(), OptionValue::Choice(3));
}

#[test]
fn test_missing_settings_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let saved = SavedSettings::load(dir.path().join("missing.ini"), &lobby_config().layout).unwrap();
    assert_eq!(saved, SavedSettings::default());
}

#[test]
fn test_launch_cycle_records_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = skirmish_session(arena_map(3), &[AiLevel::Medium, AiLevel::Hard], 11);
    session.add_human(Participant::human("Guest")).unwrap();
    session.set_option("Short Game", OptionValue::Bool(true)).unwrap();

    let mut launcher = MatchLauncher::new(NoopGame, LaunchPaths::in_dir(dir.path()));
    let plan = launcher.launch(&mut session).unwrap();
    assert_eq!(plan.slots.human_count(), 2);

    let mut recorder = MemoryRecorder::default();
    launcher.on_game_exited(&mut session, 12, &mut recorder).unwrap();

    let stats = &recorder.0[0];
    assert!(!stats.valid_for_star);
    assert_eq!(stats.human_count, 2);
    assert_eq!(stats.players.len(), 4);
    assert!(stats.players[0].is_local);
    assert_eq!(stats.players[2].name, AI_PLAYER_NAME);
    assert_eq!(stats.players[3].ai_strength, Some(2));
    assert!(session.roster().iter().all(|p| !p.ready));
    assert_eq!(session.seed(), 12);
}

#[test]
fn test_validation_messages_reach_the_caller() {
    let mut session = empty_session(1);
    let mut map = arena_map(2);
    map.enforce_max_players = true;
    session.add_ai(Participant::ai(AiLevel::Easy)).unwrap();
    session.add_ai(Participant::ai(AiLevel::Easy)).unwrap();
    session.select(standard_mode(), map);

    let err = session.prepare_launch().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot start game: The selected map cannot be played with more than 2 players."
    );
}

#[test]
fn test_lobby_file_round_trip_into_launch() {
    let mut file = LobbyFile::from_ron_str(
        r#"(
            config: (
                layout: (sides: ["Allies", "Soviet"], selectors: []),
                palette: (colors: [
                    (name: "Red", game_color_index: 4),
                    (name: "Blue", game_color_index: 2),
                ]),
            ),
            local: (name: "Host", color: Some(1)),
            ai: [(name: "AI", ai_level: Some(Medium))],
            maps: [(name: "Duel", id: "duel", max_players: 2)],
            game_modes: [(name: "Standard", ui_name: "Standard")],
            selected_map: Some("duel"),
            selected_game_mode: Some("Standard"),
            seed: 3,
        )"#,
    )
    .unwrap();
    file.seed = 4;
    let text = file.to_ron_string().unwrap();

    let mut session = LobbyFile::from_ron_str(&text).unwrap().into_session().unwrap();
    let plan = session.prepare_launch().unwrap();

    assert_eq!(plan.seed, 4);
    assert_eq!(plan.houses[0].color_index, 2);
    assert_eq!(plan.houses[1].color_index, 4);
}
