use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    prelude::*,
    store::{PointType, TagStore, TagValue, key::TagKey},
};

/// Tag store backed by a single JSON file.
///
/// The whole map is kept in memory and flushed on every write, via a
/// temporary file and a rename so a crash mid-flush leaves the previous
/// snapshot intact. Plenty for a handful of points on a multi-second cycle.
#[derive(Clone)]
#[must_use]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    contents: Arc<Mutex<Contents>>,
}

#[derive(Default, Deserialize, Serialize)]
struct Contents {
    #[serde(default)]
    points: BTreeMap<String, PointType>,

    #[serde(default)]
    values: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store, loading any previous snapshot.
    ///
    /// A missing file is a first run; an unreadable one degrades to empty
    /// state rather than refusing to start.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let contents = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(contents) => contents,
                Err(error) => {
                    warn!(path = %path.display(), "malformed store file, starting empty: {error:#}");
                    Contents::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Contents::default(),
            Err(error) => {
                warn!(path = %path.display(), "failed to read the store file, starting empty: {error:#}");
                Contents::default()
            }
        };
        Self { path: Arc::new(path), contents: Arc::new(Mutex::new(contents)) }
    }

    fn flush(&self, contents: &Contents) -> Result {
        let temporary_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(contents)?;
        fs::write(&temporary_path, bytes)
            .with_context(|| format!("failed to write `{}`", temporary_path.display()))?;
        fs::rename(&temporary_path, self.path.as_ref())
            .with_context(|| format!("failed to replace `{}`", self.path.display()))?;
        Ok(())
    }
}

/// JSON has no non-finite numbers, so an undefined comparison value is
/// stored as `null` and read back as a missing value.
fn to_json(value: TagValue) -> Value {
    match value {
        TagValue::Number(number) => {
            serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
        }
        TagValue::Text(text) => Value::String(text),
    }
}

fn from_json(value: &Value) -> Option<TagValue> {
    match value {
        Value::Number(number) => number.as_f64().map(TagValue::Number),
        Value::String(text) => Some(TagValue::Text(text.clone())),
        _ => None,
    }
}

#[async_trait]
impl TagStore for JsonFileStore {
    async fn exists(&self, point: &str) -> Result<bool> {
        let contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(contents.points.contains_key(point))
    }

    async fn create(&self, point: &str, point_type: PointType) -> Result<()> {
        let mut contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        contents.points.insert(point.to_owned(), point_type);
        self.flush(&contents)
    }

    async fn get(&self, keys: &[TagKey]) -> Result<Vec<Option<TagValue>>> {
        let contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(keys.iter().map(|key| contents.values.get(&key.to_string()).and_then(from_json)).collect())
    }

    async fn set(&self, updates: Vec<(TagKey, TagValue)>) -> Result<()> {
        let mut contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in updates {
            contents.values.insert(key.to_string(), to_json(value));
        }
        self.flush(&contents)
    }
}
