//! JSON statistics store.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use lobby_core::error::{LobbyError, Result};
use lobby_core::statistics::{MatchStatistics, StatisticsRecorder};
use tracing::debug;

/// Appends one JSON line per finished match.
#[derive(Debug, Clone)]
pub struct JsonStatisticsRecorder {
    path: PathBuf,
}

impl JsonStatisticsRecorder {
    /// Record into `path`, creating it on first use.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// File the records go to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back.
    pub fn read_all(&self) -> Result<Vec<MatchStatistics>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| LobbyError::io(&self.path, e))?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| LobbyError::DataParseError {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl StatisticsRecorder for JsonStatisticsRecorder {
    fn record(&mut self, statistics: MatchStatistics) -> Result<()> {
        let line = serde_json::to_string(&statistics).map_err(|e| LobbyError::io(&self.path, e.into()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LobbyError::io(&self.path, e))?;
        writeln!(file, "{line}").map_err(|e| LobbyError::io(&self.path, e))?;
        debug!("Recorded game {} to {}", statistics.game_id, self.path.display());
        Ok(())
    }
}
