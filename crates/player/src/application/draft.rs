//! Debounced draft persistence for in-progress forms.
//!
//! A [`DraftSaver`] owns the in-memory state of one form and mirrors it into
//! platform storage under `draft_<key>`. Edits schedule a save after the
//! autosave delay; each new edit replaces the pending save, so only the latest
//! state is written. Drafts older than the expiry window are purged when
//! checked.
//!
//! Storage failures are logged and otherwise ignored: a draft is a
//! convenience, never a reason to block the form.
//!
//! The stored record is the caller's state as a JSON object plus `lastSaved`
//! (epoch millis):
//!
//! ```json
//! {"package_id": 2, "game_data": {"game_uid": "123456789"}, "lastSaved": 1735689600000}
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::ports::outbound::storage_keys;
use crate::state::Platform;

/// Field holding the save timestamp in the stored record.
pub const LAST_SAVED_FIELD: &str = "lastSaved";

pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOptions {
    /// Logical key; stored as `draft_<key>`
    pub key: String,
    pub expire_after: Duration,
    pub autosave_delay: Duration,
}

impl DraftOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expire_after: DEFAULT_EXPIRE_AFTER,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }

    pub fn with_expire_after(mut self, expire_after: Duration) -> Self {
        self.expire_after = expire_after;
        self
    }

    pub fn with_autosave_delay(mut self, autosave_delay: Duration) -> Self {
        self.autosave_delay = autosave_delay;
        self
    }

    pub fn storage_key(&self) -> String {
        storage_keys::draft(&self.key)
    }
}

/// Where the saver is in its save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// Nothing scheduled
    Idle,
    /// A debounced save is waiting for the delay to pass
    PendingSave,
    /// The last scheduled or forced save completed
    Saved,
}

/// What the last storage check or save found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftInfo {
    pub last_saved: Option<DateTime<Utc>>,
    /// The stored draft had expired and was purged
    pub expired: bool,
}

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct DraftState<T> {
    data: T,
    has_draft: bool,
    info: DraftInfo,
    phase: DraftPhase,
    pending: Option<JoinHandle<()>>,
    /// Bumped whenever a pending save is scheduled or cancelled
    generation: u64,
    on_save: Option<Callback<T>>,
    on_restore: Option<Callback<T>>,
}

impl<T> DraftState<T> {
    fn cancel_pending(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

struct Shared<T> {
    storage_key: String,
    options: DraftOptions,
    platform: Platform,
    state: Mutex<DraftState<T>>,
}

/// Debounced, expiring local draft of a form's state.
pub struct DraftSaver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> DraftSaver<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    /// Creates the saver and checks storage once for an existing draft.
    ///
    /// The stored draft is not applied; call [`DraftSaver::restore_draft`] if
    /// the user accepts it.
    pub fn new(initial: T, options: DraftOptions, platform: Platform) -> Self {
        let saver = Self {
            shared: Arc::new(Shared {
                storage_key: options.storage_key(),
                options,
                platform,
                state: Mutex::new(DraftState {
                    data: initial,
                    has_draft: false,
                    info: DraftInfo::default(),
                    phase: DraftPhase::Idle,
                    pending: None,
                    generation: 0,
                    on_save: None,
                    on_restore: None,
                }),
            }),
        };
        saver.check_draft();
        saver
    }

    /// Called with the saved state after every successful write.
    pub fn with_on_save(self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.shared.lock().on_save = Some(Arc::new(callback));
        self
    }

    /// Called with the restored state after a successful restore.
    pub fn with_on_restore(self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.shared.lock().on_restore = Some(Arc::new(callback));
        self
    }

    pub fn options(&self) -> &DraftOptions {
        &self.shared.options
    }

    /// Snapshot of the current in-memory state.
    pub fn data(&self) -> T {
        self.shared.lock().data.clone()
    }

    pub fn has_draft(&self) -> bool {
        self.shared.lock().has_draft
    }

    pub fn draft_info(&self) -> DraftInfo {
        self.shared.lock().info
    }

    /// Whether a debounced save is waiting to run.
    pub fn is_auto_saving(&self) -> bool {
        self.shared.lock().phase == DraftPhase::PendingSave
    }

    pub fn phase(&self) -> DraftPhase {
        self.shared.lock().phase
    }

    /// Edits the state and, if it has any content, schedules a save.
    pub fn update_data(&self, update: impl FnOnce(&mut T)) {
        let mut state = self.shared.lock();
        update(&mut state.data);
        self.schedule_if_content(state);
    }

    /// Replaces the state and, if it has any content, schedules a save.
    pub fn replace_data(&self, data: T) {
        let mut state = self.shared.lock();
        state.data = data;
        self.schedule_if_content(state);
    }

    /// Reads the stored draft, purging it if expired or unreadable.
    pub fn check_draft(&self) -> Option<T> {
        self.shared.check_draft()
    }

    /// Replaces the in-memory state with a valid stored draft.
    pub fn restore_draft(&self) -> bool {
        let Some(data) = self.shared.check_draft() else {
            return false;
        };

        let on_restore = {
            let mut state = self.shared.lock();
            state.data = data.clone();
            state.on_restore.clone()
        };
        tracing::debug!(key = %self.shared.storage_key, "Draft restored");
        if let Some(callback) = on_restore {
            callback(&data);
        }
        true
    }

    /// Deletes the stored draft and cancels any pending save.
    pub fn clear_draft(&self) {
        let mut state = self.shared.lock();
        state.cancel_pending();
        if state.phase == DraftPhase::PendingSave {
            state.phase = DraftPhase::Idle;
        }
        if let Err(error) = self.shared.platform.storage_remove(&self.shared.storage_key) {
            tracing::error!(key = %self.shared.storage_key, error = %error, "Failed to clear draft");
            return;
        }
        state.has_draft = false;
        state.info = DraftInfo::default();
    }

    /// Writes the current state now, replacing any pending save.
    pub fn save_draft(&self) -> bool {
        let snapshot = {
            let mut state = self.shared.lock();
            state.cancel_pending();
            state.data.clone()
        };
        self.shared.write(&snapshot, None)
    }

    /// Forces a pending debounced save to happen now (page-unload hook).
    ///
    /// Does nothing when no save is pending.
    pub fn flush_pending(&self) -> bool {
        let snapshot = {
            let mut state = self.shared.lock();
            if !state.cancel_pending() {
                return false;
            }
            state.data.clone()
        };
        self.shared.write(&snapshot, None)
    }

    fn schedule_if_content(&self, mut state: MutexGuard<'_, DraftState<T>>) {
        if !has_content(&state.data) {
            // Edits that blank the form drop any save queued for older content.
            if state.cancel_pending() && state.phase == DraftPhase::PendingSave {
                state.phase = DraftPhase::Idle;
            }
            return;
        }

        state.cancel_pending();
        let generation = state.generation;

        match Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.shared);
                let delay = self.shared.options.autosave_delay;
                state.phase = DraftPhase::PendingSave;
                state.pending = Some(runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    shared.fire(generation);
                }));
            }
            Err(_) => {
                tracing::warn!(
                    key = %self.shared.storage_key,
                    "No async runtime for debounced draft save, saving immediately"
                );
                let snapshot = state.data.clone();
                drop(state);
                self.shared.write(&snapshot, None);
            }
        }
    }
}

impl<T> Shared<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    fn lock(&self) -> MutexGuard<'_, DraftState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Debounce timer expiry.
    fn fire(&self, generation: u64) {
        let snapshot = {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            state.pending = None;
            if !has_content(&state.data) {
                state.phase = DraftPhase::Idle;
                return;
            }
            state.data.clone()
        };
        self.write(&snapshot, Some(generation));
    }

    /// Stamps and stores `data`. Returns whether the write succeeded.
    fn write(&self, data: &T, generation: Option<u64>) -> bool {
        let now = self.platform.now_millis();
        let record = match encode_record(data, now) {
            Ok(record) => record,
            Err(error) => {
                tracing::error!(key = %self.storage_key, error = %error, "Failed to serialize draft");
                return false;
            }
        };

        if let Err(error) = self.platform.storage_save(&self.storage_key, &record) {
            tracing::error!(key = %self.storage_key, error = %error, "Failed to save draft");
            let mut state = self.lock();
            if generation.map_or(true, |g| g == state.generation) {
                state.phase = DraftPhase::Idle;
            }
            return false;
        }

        let on_save = {
            let mut state = self.lock();
            state.has_draft = true;
            state.info = DraftInfo {
                last_saved: millis_to_datetime(now),
                expired: false,
            };
            // A newer edit may have scheduled another save meanwhile.
            if generation.map_or(true, |g| g == state.generation) {
                state.phase = DraftPhase::Saved;
            }
            state.on_save.clone()
        };
        tracing::debug!(key = %self.storage_key, saved_at = now, "Draft saved");
        if let Some(callback) = on_save {
            callback(data);
        }
        true
    }

    fn check_draft(&self) -> Option<T> {
        let Some(stored) = self.platform.storage_load(&self.storage_key) else {
            let mut state = self.lock();
            state.has_draft = false;
            state.info = DraftInfo::default();
            return None;
        };

        let (data, last_saved) = match decode_record::<T>(&stored) {
            Ok(decoded) => decoded,
            Err(error) => {
                tracing::error!(key = %self.storage_key, error = %error, "Stored draft is unreadable, removing it");
                self.remove_quietly();
                let mut state = self.lock();
                state.has_draft = false;
                state.info = DraftInfo::default();
                return None;
            }
        };

        let age = self.platform.now_millis().saturating_sub(last_saved);
        let expired = u128::from(age) > self.options.expire_after.as_millis();

        {
            let mut state = self.lock();
            state.info = DraftInfo {
                last_saved: millis_to_datetime(last_saved),
                expired,
            };
            state.has_draft = !expired;
        }

        if expired {
            tracing::info!(key = %self.storage_key, age_ms = age, "Draft expired, removing it");
            self.remove_quietly();
            return None;
        }
        Some(data)
    }

    fn remove_quietly(&self) {
        if let Err(error) = self.platform.storage_remove(&self.storage_key) {
            tracing::error!(key = %self.storage_key, error = %error, "Failed to remove draft");
        }
    }
}

impl<T> Drop for DraftSaver<T> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.cancel_pending();
    }
}

impl<T> fmt::Debug for DraftSaver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftSaver")
            .field("key", &self.shared.storage_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
enum RecordError {
    #[error("draft state must serialize to a JSON object")]
    NotAnObject,
    #[error("draft record has no valid 'lastSaved' timestamp")]
    MissingTimestamp,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn encode_record<T: Serialize>(data: &T, now_millis: u64) -> Result<String, RecordError> {
    let Value::Object(mut fields) = serde_json::to_value(data)? else {
        return Err(RecordError::NotAnObject);
    };
    fields.insert(LAST_SAVED_FIELD.to_string(), Value::from(now_millis));
    Ok(serde_json::to_string(&fields)?)
}

fn decode_record<T: DeserializeOwned>(raw: &str) -> Result<(T, u64), RecordError> {
    let mut fields: Map<String, Value> = serde_json::from_str(raw)?;
    let last_saved = fields
        .remove(LAST_SAVED_FIELD)
        .and_then(|value| {
            value
                .as_u64()
                .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
        })
        .ok_or(RecordError::MissingTimestamp)?;
    let data = serde_json::from_value(Value::Object(fields))?;
    Ok((data, last_saved))
}

fn millis_to_datetime(millis: u64) -> Option<DateTime<Utc>> {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

/// Whether any field holds a non-blank string, a non-zero number, a non-empty
/// list, any boolean, or a nested object with content of its own.
fn has_content<T: Serialize>(data: &T) -> bool {
    match serde_json::to_value(data) {
        Ok(Value::Object(fields)) => fields.values().any(value_has_content),
        Ok(other) => value_has_content(&other),
        Err(_) => false,
    }
}

fn value_has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) => true,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => fields.values().any(value_has_content),
    }
}
