use crate::poller::DEFAULT_SETTLE_DELAY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "padmap_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Wait between connect and the first evaluated input
    pub settle_delay_ms: u64,
    /// Directory holding the controller images
    pub asset_dir: PathBuf,
    /// Last directory used for export or import
    pub export_dir: Option<PathBuf>,
    pub notification_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            asset_dir: PathBuf::from("controllers"),
            export_dir: None,
            notification_secs: 4,
        }
    }
}

impl AppConfig {
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {:?}", path);
                        return Some(config);
                    }
                    Err(e) => {
                        log::error!("Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    log::error!("Failed to read config file: {}", e);
                }
            }
        }
        None
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn exe_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> PathBuf {
        Self::exe_dir().join(CONFIG_FILENAME)
    }

    /// Relative asset paths are looked up next to the executable first,
    /// then in the working directory.
    pub fn resolved_asset_dir(&self) -> PathBuf {
        if self.asset_dir.is_absolute() {
            return self.asset_dir.clone();
        }
        let beside_exe = Self::exe_dir().join(&self.asset_dir);
        if beside_exe.is_dir() {
            beside_exe
        } else {
            self.asset_dir.clone()
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_secs(self.notification_secs.max(1))
    }
}
