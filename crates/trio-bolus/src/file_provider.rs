//! File-backed settings provider
//!
//! Reads the JSON documents the loop keeps on disk. Each document resolves
//! through the same chain:
//!
//! 1. the stored file under `root`
//! 2. the bundled default document under `defaults_root`, if configured
//! 3. the compiled-in default (`Default::default()`)
//!
//! A missing or undecodable file moves to the next step with a log line.
//! Any other I/O failure is returned, so the caller gets the zero result.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use trio_core::{BolusSettings, Preferences, PumpSettings, Result, TrioError};
use trio_schedule::{BasalProfileEntry, BgTargets, CarbRatios, InsulinSensitivities, TherapyProfile};

use crate::provider::SettingsProvider;

pub mod files {
    pub const PREFERENCES: &str = "preferences.json";
    pub const PUMP_SETTINGS: &str = "settings.json";
    pub const BOLUS_SETTINGS: &str = "trio_settings.json";
    pub const BASAL_PROFILE: &str = "basal_profile.json";
    pub const CARB_RATIOS: &str = "carb_ratios.json";
    pub const BG_TARGETS: &str = "bg_targets.json";
    pub const INSULIN_SENSITIVITIES: &str = "insulin_sensitivities.json";
}

#[derive(Debug, Clone)]
pub struct FileSettingsProvider {
    root: PathBuf,
    defaults_root: Option<PathBuf>,
}

impl FileSettingsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            defaults_root: None,
        }
    }

    /// Directory of bundled default documents, consulted when a stored file is unusable
    pub fn with_defaults(mut self, defaults_root: impl Into<PathBuf>) -> Self {
        self.defaults_root = Some(defaults_root.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn load<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        if let Some(value) = read_document(&self.root.join(name)).await? {
            return Ok(value);
        }

        if let Some(defaults_root) = &self.defaults_root {
            if let Some(value) = read_document(&defaults_root.join(name)).await? {
                debug!(file = name, "using bundled default");
                return Ok(value);
            }
        }

        debug!(file = name, "using built-in default");
        Ok(T::default())
    }
}

/// `Ok(None)` when the file is absent or does not decode.
async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(TrioError::IoError {
                path: path.display().to_string(),
                source,
            })
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings file does not decode, falling back");
            Ok(None)
        }
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    async fn preferences(&self) -> Result<Preferences> {
        self.load(files::PREFERENCES).await
    }

    async fn pump_settings(&self) -> Result<PumpSettings> {
        self.load(files::PUMP_SETTINGS).await
    }

    async fn bolus_settings(&self) -> Result<BolusSettings> {
        self.load(files::BOLUS_SETTINGS).await
    }

    async fn therapy_profile(&self) -> Result<TherapyProfile> {
        let (basal_profile, carb_ratios, bg_targets, insulin_sensitivities) = tokio::try_join!(
            self.load::<Vec<BasalProfileEntry>>(files::BASAL_PROFILE),
            self.load::<CarbRatios>(files::CARB_RATIOS),
            self.load::<BgTargets>(files::BG_TARGETS),
            self.load::<InsulinSensitivities>(files::INSULIN_SENSITIVITIES),
        )?;

        Ok(TherapyProfile {
            basal_profile,
            carb_ratios,
            bg_targets,
            insulin_sensitivities,
        })
    }
}
