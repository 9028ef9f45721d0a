// src/types.rs

use std::str::FromStr;
use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Behaviour when a watch trigger arrives while a watch-triggered run is
/// already in progress.
///
/// - `Queue`: remember the trigger and run it once the current run finishes
///   (default behaviour).
/// - `Cancel`: drop anything queued earlier and only keep the latest trigger.
///   The run in progress is never interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}

impl FromStr for TriggerWhileRunningBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileRunningBehaviour::Queue),
            "cancel" => Ok(TriggerWhileRunningBehaviour::Cancel),
            other => Err(format!(
                "invalid triggered_while_running_behaviour: {other} (expected \"queue\" or \"cancel\")"
            )),
        }
    }
}

/// Runtime caching strategy understood by the generated service worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CachingStrategy {
    /// Serve from cache, fall back to the network and store the response.
    #[serde(rename = "cacheFirst")]
    CacheFirst,
    /// Race cache and network; whichever answers first wins, the network
    /// response always refreshes the cache.
    #[serde(rename = "fastest")]
    Fastest,
}

impl CachingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachingStrategy::CacheFirst => "cacheFirst",
            CachingStrategy::Fastest => "fastest",
        }
    }
}

impl FromStr for CachingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cacheFirst" => Ok(CachingStrategy::CacheFirst),
            "fastest" => Ok(CachingStrategy::Fastest),
            other => Err(format!(
                "invalid caching handler: {other} (expected \"cacheFirst\" or \"fastest\")"
            )),
        }
    }
}
