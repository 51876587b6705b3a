//! The task result cache and its reuse decision

use crate::keys::result_key;
use crate::store::{FileStore, KeyValueStore};
use stamp_config::Settings;
use stamp_core::{Error, Result, TaskResult, TaskScope};
use stamp_utils::tracing::cache_event;
use std::sync::Arc;

/// What to do with a task at a given version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// An exact-version result exists; skip execution
    Reuse(TaskResult),
    /// The task must run
    Execute(ExecuteReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteReason {
    /// No result recorded for this version
    Missing,
    /// The caller asked for a re-run
    Forced,
}

impl CacheDecision {
    pub fn should_execute(&self) -> bool {
        matches!(self, CacheDecision::Execute(_))
    }
}

/// Results keyed by (scope, version) over a key-value store
///
/// Entries are never invalidated: a content change yields a new version
/// and therefore a new key.
#[derive(Clone)]
pub struct TaskResultCache {
    store: Arc<dyn KeyValueStore>,
    max_output_bytes: usize,
}

impl TaskResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>, settings: &Settings) -> Self {
        Self::with_max_output_bytes(store, settings.max_output_bytes)
    }

    /// File-backed cache in the configured result directory
    pub fn open(settings: &Settings) -> Result<Self> {
        let store = FileStore::new(settings.result_cache_dir())?;
        Ok(Self::new(Arc::new(store), settings))
    }

    pub fn with_max_output_bytes(store: Arc<dyn KeyValueStore>, max_output_bytes: usize) -> Self {
        Self {
            store,
            max_output_bytes,
        }
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Persist `result` for `scope` at `version`, keeping only the tail of
    /// oversized output
    pub async fn put(&self, scope: &TaskScope, version: &str, mut result: TaskResult) -> Result<()> {
        if result.scope != *scope || result.version != version {
            return Err(Error::configuration(format!(
                "result for {} at {} cannot be stored under {scope} at {version}",
                result.scope, result.version
            )));
        }

        let original_len = result.output.len();
        let kept = truncate_tail(&result.output, self.max_output_bytes);
        if kept.len() < original_len {
            tracing::debug!(
                scope = %scope,
                version,
                original_bytes = original_len,
                kept_bytes = kept.len(),
                "Truncated task output"
            );
            result.output = kept.to_string();
        }

        let key = result_key(scope, version);
        let value = serde_json::to_string(&result)?;
        self.store.put(&key, value).await
    }

    /// Result recorded for `scope` at exactly `version`
    pub async fn get(&self, scope: &TaskScope, version: &str) -> Result<Option<TaskResult>> {
        let key = result_key(scope, version);
        let Some(value) = self.store.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<TaskResult>(&value) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring undecodable cached result");
                Ok(None)
            }
        }
    }

    /// Reuse only when an exact-version entry exists and no re-run was forced
    pub async fn decide(&self, scope: &TaskScope, version: &str, force: bool) -> Result<CacheDecision> {
        if force {
            cache_event(&scope.to_string(), version, false);
            return Ok(CacheDecision::Execute(ExecuteReason::Forced));
        }

        let decision = match self.get(scope, version).await? {
            Some(result) => CacheDecision::Reuse(result),
            None => CacheDecision::Execute(ExecuteReason::Missing),
        };
        cache_event(&scope.to_string(), version, !decision.should_execute());
        Ok(decision)
    }
}

/// Last `max_bytes` of `output`, moved forward to the next char boundary
pub fn truncate_tail(output: &str, max_bytes: usize) -> &str {
    if output.len() <= max_bytes {
        return output;
    }
    let mut start = output.len() - max_bytes;
    while !output.is_char_boundary(start) {
        start += 1;
    }
    &output[start..]
}
