pub mod file;
pub mod key;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{core::subsystem::Subsystem, prelude::*, store::key::TagKey};

/// Value of a single tag in the point store.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    Number(f64),
    Text(String),
}

impl TagValue {
    pub fn number(value: impl Into<f64>) -> Self {
        Self::Number(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(value) => Some(value),
            Self::Number(_) => None,
        }
    }
}

/// Schema of a data point in the external store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum PointType {
    EnergySystem,
    EnergySummary,
    ComparisonValues,
    DailyEnergy,
    ResetTimes,
    WeeklyEnergyDays,
}

/// Every data point the engine writes, with its schema. Created on startup
/// when missing.
#[must_use]
pub fn point_inventory() -> Vec<(String, PointType)> {
    let mut points = Vec::new();
    for subsystem in Subsystem::ALL {
        points.push((subsystem.as_str().to_owned(), PointType::EnergySystem));
    }
    points.push(("EnergySummary".to_owned(), PointType::EnergySummary));
    points.push(("Comparison".to_owned(), PointType::ComparisonValues));
    for subsystem in Subsystem::ALL {
        points.push((format!("DailyEnergy{subsystem}"), PointType::DailyEnergy));
    }
    points.push(("DailyEnergyTotal".to_owned(), PointType::DailyEnergy));
    points.push(("WeeklyEnergyTotal".to_owned(), PointType::DailyEnergy));
    points.push(("ResetTimes".to_owned(), PointType::ResetTimes));
    points.push(("WeeklyEnergy".to_owned(), PointType::WeeklyEnergyDays));
    points.push(("WeeklyCosts".to_owned(), PointType::WeeklyEnergyDays));
    points
}

/// The external point/tag store the engine persists to.
///
/// `get` is positional: the result has one entry per requested key, `None`
/// for values that were never written. `set` is batched; implementations
/// apply the whole batch in one step where the backend allows, so reset
/// markers land together with the state they gate.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn exists(&self, point: &str) -> Result<bool>;

    async fn create(&self, point: &str, point_type: PointType) -> Result<()>;

    async fn get(&self, keys: &[TagKey]) -> Result<Vec<Option<TagValue>>>;

    async fn set(&self, updates: Vec<(TagKey, TagValue)>) -> Result<()>;
}
