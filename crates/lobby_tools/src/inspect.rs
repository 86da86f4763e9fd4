//! Lobby reports and offline launches.

use std::path::Path;

use lobby_core::prelude::*;
use lobby_core::rank::game_type;
use lobby_core::validation::playing_count;
use serde::Serialize;
use tracing::info;

use crate::recorder::JsonStatisticsRecorder;
use crate::Result;

/// File the launch command writes statistics to.
pub const STATISTICS_FILE: &str = "statistics.jsonl";

/// Summary of a lobby's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyReport {
    /// Selected map, if any.
    pub map: Option<String>,
    /// Selected game mode, if any.
    pub game_mode: Option<String>,
    /// Participants, spectators included.
    pub participants: usize,
    /// Participants that play.
    pub playing: usize,
    /// Human team structure.
    pub game_type: GameType,
    /// Eligibility tier.
    pub rank: Rank,
    /// Why the lobby cannot launch, if it cannot.
    pub launch_error: Option<String>,
}

/// Report on a session.
#[must_use]
pub fn inspect(session: &LobbySession) -> LobbyReport {
    LobbyReport {
        map: session.map().map(|m| m.name.clone()),
        game_mode: session.game_mode().map(|g| g.ui_name.clone()),
        participants: session.roster().len(),
        playing: playing_count(session.roster()),
        game_type: game_type(session.roster()),
        rank: session.rank(),
        launch_error: session.validate().err().map(|e| e.to_string()),
    }
}

/// Report as pretty JSON.
pub fn report_json(report: &LobbyReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Load a lobby file and build its session.
pub fn load_session(path: &Path) -> Result<LobbySession> {
    Ok(LobbyFile::load(path)?.into_session()?)
}

/// Write launch files for a lobby into `out_dir` and record its statistics
/// as if the match had finished.
pub fn launch_offline(session: &mut LobbySession, out_dir: &Path, next_seed: u64) -> Result<LaunchPlan> {
    let plan = session.prepare_launch()?;
    let paths = LaunchPaths::in_dir(out_dir);
    write_launch_files(&plan, &paths)?;

    let mut recorder = JsonStatisticsRecorder::new(out_dir.join(STATISTICS_FILE));
    recorder.record(plan.statistics.clone())?;
    session.finish_match(next_seed);

    info!(
        "Wrote launch files for '{}' ({} houses, {} remapped)",
        plan.statistics.map_name,
        plan.houses.len(),
        plan.remaps.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobby_test_utils::fixtures::{arena_map, empty_session, skirmish_session, HOST};

    #[test]
    fn test_report_without_selection() {
        let report = inspect(&empty_session(1));
        assert_eq!(report.map, None);
        assert_eq!(report.rank, Rank::None);
        assert!(report.launch_error.is_some());
    }

    #[test]
    fn test_report_for_skirmish() {
        let session = skirmish_session(arena_map(2), &[AiLevel::Medium], 1);
        let report = inspect(&session);
        assert_eq!(report.playing, 2);
        assert_eq!(report.rank, Rank::Medium);
        assert_eq!(report.launch_error, None);
        assert!(report_json(&report).unwrap().contains("\"Medium\""));
    }

    #[test]
    fn test_offline_launch_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = skirmish_session(arena_map(2), &[AiLevel::Hard], 7);

        let plan = launch_offline(&mut session, dir.path(), 8).unwrap();

        let spawn = IniDocument::load(dir.path().join("spawn.ini")).unwrap();
        assert_eq!(spawn.get("Settings", "Name"), Some(HOST));
        assert!(dir.path().join("spawnmap.ini").exists());
        let stats = JsonStatisticsRecorder::new(dir.path().join(STATISTICS_FILE))
            .read_all()
            .unwrap();
        assert_eq!(stats, vec![plan.statistics]);
        assert_eq!(session.seed(), 8);
    }
}
