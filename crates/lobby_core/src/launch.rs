//! Launch files and the game process boundary.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::{LobbyError, Result};
use crate::ini::IniDocument;
use crate::session::{LaunchPlan, LobbySession};
use crate::spawn::SPAWN_MAP_NAME;
use crate::statistics::{MatchStatistics, StatisticsRecorder};

/// Name of the spawn configuration file.
pub const SPAWN_INI_NAME: &str = "spawn.ini";

/// Where launch files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPaths {
    /// `spawn.ini`.
    pub spawn: PathBuf,
    /// `spawnmap.ini`.
    pub map: PathBuf,
}

impl LaunchPaths {
    /// Both files inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            spawn: dir.join(SPAWN_INI_NAME),
            map: dir.join(SPAWN_MAP_NAME),
        }
    }
}

fn replace_file(path: &Path, contents: &IniDocument) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| {
            error!("Failed to delete {}: {e}", path.display());
            LobbyError::LaunchFailed(format!("could not delete {}: {e}", path.display()))
        })?;
    }
    contents.save(path).map_err(|e| {
        error!("Failed to write {}: {e}", path.display());
        LobbyError::LaunchFailed(format!("could not write {}: {e}", path.display()))
    })
}

/// Delete any previous launch files and write the plan's files.
pub fn write_launch_files(plan: &LaunchPlan, paths: &LaunchPaths) -> Result<()> {
    replace_file(&paths.spawn, &plan.spawn)?;
    replace_file(&paths.map, &plan.map)?;
    info!(
        "Wrote {} and {}",
        paths.spawn.display(),
        paths.map.display()
    );
    Ok(())
}

/// Starts the external game.
pub trait GameProcess {
    /// Start the game with the written launch files.
    fn start(&mut self, paths: &LaunchPaths) -> Result<()>;
}

/// Writes launch files, starts the game and reports the finished match.
#[derive(Debug)]
pub struct MatchLauncher<P> {
    process: P,
    paths: LaunchPaths,
    pending: Option<MatchStatistics>,
}

impl<P: GameProcess> MatchLauncher<P> {
    /// Create a launcher.
    pub const fn new(process: P, paths: LaunchPaths) -> Self {
        Self {
            process,
            paths,
            pending: None,
        }
    }

    /// Launch paths.
    #[must_use]
    pub const fn paths(&self) -> &LaunchPaths {
        &self.paths
    }

    /// The game process.
    #[must_use]
    pub const fn process(&self) -> &P {
        &self.process
    }

    /// Whether a match is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Validate, resolve, write files and start the game.
    pub fn launch(&mut self, session: &mut LobbySession) -> Result<LaunchPlan> {
        if self.pending.is_some() {
            return Err(LobbyError::LaunchFailed("a match is already running".to_string()));
        }
        let plan = session.prepare_launch()?;
        write_launch_files(&plan, &self.paths)?;
        self.process.start(&self.paths)?;
        info!("Started game {}", plan.statistics.game_id);
        self.pending = Some(plan.statistics.clone());
        Ok(plan)
    }

    /// Handle the game process exiting.
    ///
    /// The pending record goes to `recorder`, ready statuses are cleared and
    /// the session is reseeded. A signal with nothing pending is ignored.
    pub fn on_game_exited(
        &mut self,
        session: &mut LobbySession,
        next_seed: u64,
        recorder: &mut dyn StatisticsRecorder,
    ) -> Result<()> {
        let Some(statistics) = self.pending.take() else {
            warn!("Game exit reported with no match running");
            return Ok(());
        };
        session.finish_match(next_seed);
        recorder.record(statistics)
    }
}
