use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use orbit_core::store::{PersistedState, ProfilePersistence};
use tokio::fs;

/// Keeps the device state in a single JSON file.
///
/// A missing file reads as an empty state. Writes go to a sibling temp file
/// that is then renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ProfilePersistence for JsonFilePersistence {
    async fn load(&self) -> Result<PersistedState> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No local state at {}", self.path.display());
                return Ok(PersistedState::default());
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("Failed to read {}", self.path.display()));
            }
        };

        serde_json::from_slice(&raw)
            .wrap_err_with(|| format!("Corrupt local state in {}", self.path.display()))
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_vec_pretty(state)?)
            .await
            .wrap_err_with(|| format!("Failed to write {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .await
            .wrap_err_with(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
