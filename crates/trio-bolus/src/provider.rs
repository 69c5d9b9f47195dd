//! Provider traits: the collaborators that supply calculation inputs
//!
//! Storage, CGM and loop integrations implement these. The calculator only
//! reads through them and never mutates what they return.
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trio_core::{BolusSettings, Determination, GlucoseSample, Preferences, PumpSettings, Result};
use trio_schedule::TherapyProfile;

/// Therapy settings and scalar preferences
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn preferences(&self) -> Result<Preferences>;

    async fn pump_settings(&self) -> Result<PumpSettings>;

    async fn bolus_settings(&self) -> Result<BolusSettings>;

    /// Basal, carb ratio, BG target and ISF schedules
    async fn therapy_profile(&self) -> Result<TherapyProfile>;
}

/// CGM history
#[async_trait]
pub trait GlucoseProvider: Send + Sync {
    /// Up to `limit` most recent readings, newest first
    async fn recent_glucose(&self, limit: usize) -> Result<Vec<GlucoseSample>>;
}

/// Algorithm output history
#[async_trait]
pub trait DeterminationProvider: Send + Sync {
    /// Most recent determination made at or after `since`
    async fn latest_determination(&self, since: DateTime<Utc>) -> Result<Option<Determination>>;
}

/// Time of the last successful closed-loop cycle
pub trait LoopClock: Send + Sync {
    fn last_loop_date(&self) -> Option<DateTime<Utc>>;
}

// ============================================================================
// IN-MEMORY PROVIDERS
// ============================================================================

/// Settings held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    pub preferences: Preferences,
    pub pump: PumpSettings,
    pub bolus: BolusSettings,
    pub profile: TherapyProfile,
}

#[async_trait]
impl SettingsProvider for InMemorySettings {
    async fn preferences(&self) -> Result<Preferences> {
        Ok(self.preferences.clone())
    }

    async fn pump_settings(&self) -> Result<PumpSettings> {
        Ok(self.pump.clone())
    }

    async fn bolus_settings(&self) -> Result<BolusSettings> {
        Ok(self.bolus.clone())
    }

    async fn therapy_profile(&self) -> Result<TherapyProfile> {
        Ok(self.profile.clone())
    }
}

/// Glucose readings held in memory, kept newest first
#[derive(Debug, Default)]
pub struct InMemoryGlucoseStore {
    samples: RwLock<Vec<GlucoseSample>>,
}

impl InMemoryGlucoseStore {
    pub fn new(samples: Vec<GlucoseSample>) -> Self {
        let store = Self::default();
        for sample in samples {
            store.push(sample);
        }
        store
    }

    pub fn push(&self, sample: GlucoseSample) {
        let mut samples = self.samples.write().unwrap_or_else(|e| e.into_inner());
        let position = samples
            .iter()
            .position(|s| s.date < sample.date)
            .unwrap_or(samples.len());
        samples.insert(position, sample);
    }
}

#[async_trait]
impl GlucoseProvider for InMemoryGlucoseStore {
    async fn recent_glucose(&self, limit: usize) -> Result<Vec<GlucoseSample>> {
        let samples = self.samples.read().unwrap_or_else(|e| e.into_inner());
        Ok(samples.iter().take(limit).copied().collect())
    }
}

/// Determinations held in memory
#[derive(Debug, Default)]
pub struct InMemoryDeterminationStore {
    determinations: RwLock<Vec<Determination>>,
}

impl InMemoryDeterminationStore {
    pub fn new(determinations: Vec<Determination>) -> Self {
        Self {
            determinations: RwLock::new(determinations),
        }
    }

    pub fn push(&self, determination: Determination) {
        self.determinations
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(determination);
    }
}

#[async_trait]
impl DeterminationProvider for InMemoryDeterminationStore {
    async fn latest_determination(&self, since: DateTime<Utc>) -> Result<Option<Determination>> {
        let determinations = self.determinations.read().unwrap_or_else(|e| e.into_inner());
        Ok(determinations
            .iter()
            .filter(|d| d.timestamp >= since)
            .max_by_key(|d| d.timestamp)
            .cloned())
    }
}

/// Loop clock with a fixed, settable value
#[derive(Debug, Default)]
pub struct FixedLoopClock {
    last_loop: RwLock<Option<DateTime<Utc>>>,
}

impl FixedLoopClock {
    pub fn new(last_loop: Option<DateTime<Utc>>) -> Self {
        Self {
            last_loop: RwLock::new(last_loop),
        }
    }

    pub fn set(&self, date: DateTime<Utc>) {
        *self.last_loop.write().unwrap_or_else(|e| e.into_inner()) = Some(date);
    }
}

impl LoopClock for FixedLoopClock {
    fn last_loop_date(&self) -> Option<DateTime<Utc>> {
        *self.last_loop.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: LoopClock + ?Sized> LoopClock for Arc<T> {
    fn last_loop_date(&self) -> Option<DateTime<Utc>> {
        (**self).last_loop_date()
    }
}
