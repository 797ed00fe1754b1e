//! Explicit context object owning the registry, the active draft, storage, and listeners.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use schema::{RawSchema, Schema, Value, Values};
use tracing::{debug, error, info, warn};

use crate::{
    Control, Draft, DraftSnapshot, Error, ListenerId, ManagerConfig, OwnerSummary, Registry,
    Result, Status,
    broadcast::Broadcaster,
    control,
    debounce::Debouncer,
    store::{Backend, MemoryBackend, Storage},
};

/// Registry plus the single active draft.
#[derive(Debug, Default)]
struct State {
    /// Registered schemas.
    registry: Registry,
    /// Draft of the selected owner, if any.
    draft: Option<Draft>,
    /// Generation for the next draft.
    next_generation: u64,
}

impl State {
    /// Start a fresh draft for `schema`, seeded with `values`.
    fn open_draft(&mut self, schema: Arc<Schema>, values: Values) {
        self.next_generation += 1;
        self.draft = Some(Draft::new(self.next_generation, schema, values));
    }

    /// The active draft.
    fn draft_mut(&mut self) -> Result<&mut Draft> {
        self.draft.as_mut().ok_or(Error::NoActiveSession)
    }
}

/// Settings manager: the schema registry, the draft session of the selected
/// owner, persistence, and change notification behind one context object.
///
/// Owners call [`Manager::register`], [`Manager::get_settings`] and
/// [`Manager::on_change`]. Editor surfaces drive the draft with
/// [`Manager::select`], [`Manager::edit`], [`Manager::commit`] and
/// [`Manager::discard`].
///
/// Cloning is cheap; clones share all state. Listeners are always invoked
/// after internal locks are released.
#[derive(Clone)]
pub struct Manager {
    /// Tunables.
    config: Arc<ManagerConfig>,
    /// Registry and draft.
    state: Arc<Mutex<State>>,
    /// Persisted values.
    storage: Storage,
    /// Committed-settings fan-out.
    broadcaster: Broadcaster,
    /// Per-field re-validation timers of the active draft.
    debouncer: Debouncer,
}

impl Manager {
    /// Create a manager persisting through `backend`.
    pub fn new(config: ManagerConfig, backend: Arc<dyn Backend>) -> Self {
        let storage = Storage::new(backend, config.storage_prefix.clone());
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(State::default())),
            storage,
            broadcaster: Broadcaster::new(),
            debouncer: Debouncer::new(),
        }
    }

    /// Create a manager with default config and process-local storage.
    pub fn in_memory() -> Self {
        Self::new(ManagerConfig::default(), Arc::new(MemoryBackend::new()))
    }

    /// Active configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Register an owner schema. Returns false, logging the reason, when the
    /// schema is structurally invalid; nothing is stored in that case.
    pub fn register(&self, raw: RawSchema) -> bool {
        self.try_register(raw).is_ok()
    }

    /// Like [`Manager::register`], returning the rejection reason.
    pub fn try_register(&self, raw: RawSchema) -> Result<()> {
        let id = raw.id.clone().unwrap_or_default();
        let schema = raw.resolve().map_err(|e| {
            error!(owner = %id, error = %e, "schema_rejected");
            Error::from(e)
        })?;
        self.register_schema(schema);
        Ok(())
    }

    /// Register an already resolved schema. A schema with the same id is
    /// replaced (last registration wins); if its owner is being edited the
    /// draft is reseeded from the new schema.
    pub fn register_schema(&self, schema: Schema) {
        let id = schema.id.clone();
        let fields = schema.settings.len();
        let mut state = self.state.lock();
        if state.registry.insert(schema).is_some() {
            warn!(owner = %id, "owner_replaced");
        }
        info!(owner = %id, fields, "owner_registered");

        if state.draft.as_ref().is_some_and(|d| d.owner() == id)
            && let Some(schema) = state.registry.get(&id)
        {
            self.debouncer.cancel_all();
            let values = self.storage.resolve(&schema);
            state.open_draft(schema, values);
            debug!(owner = %id, "draft_reseeded");
        }
    }

    /// Effective settings of `id`: stored values, falling back to each field's
    /// default. `None` (logged) when the owner is unknown.
    pub fn get_settings(&self, id: &str) -> Option<Values> {
        match self.try_get_settings(id) {
            Ok(values) => Some(values),
            Err(e) => {
                error!(owner = %id, error = %e, "get_settings_failed");
                None
            }
        }
    }

    /// Like [`Manager::get_settings`], returning the reason on failure.
    pub fn try_get_settings(&self, id: &str) -> Result<Values> {
        let schema = self.schema(id).ok_or_else(|| Error::UnknownOwner { id: id.into() })?;
        Ok(self.storage.resolve(&schema))
    }

    /// Registered schema of `id`.
    pub fn schema(&self, id: &str) -> Option<Arc<Schema>> {
        self.state.lock().registry.get(id)
    }

    /// Call `listener` with the finalized settings each time `id` is
    /// committed or reset.
    pub fn on_change<F>(&self, id: &str, listener: F) -> ListenerId
    where
        F: Fn(&Values) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(id, Arc::new(listener))
    }

    /// Stop a listener added with [`Manager::on_change`].
    pub fn remove_listener(&self, listener: ListenerId) -> bool {
        self.broadcaster.unsubscribe(listener)
    }

    /// Every registered owner in registration order.
    pub fn owners(&self) -> Vec<OwnerSummary> {
        self.filter_owners("")
    }

    /// Owners whose name or id contains `text`, ignoring case.
    pub fn filter_owners(&self, text: &str) -> Vec<OwnerSummary> {
        self.state
            .lock()
            .registry
            .filter(text, self.config.name_display_width)
    }

    /// Start editing `id`, discarding any current draft. An unknown owner is
    /// logged and leaves the current draft in place.
    pub fn select(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let Some(schema) = state.registry.get(id) else {
            error!(owner = %id, "select_unknown_owner");
            return Err(Error::UnknownOwner { id: id.into() });
        };
        self.debouncer.cancel_all();
        let values = self.storage.resolve(&schema);
        state.open_draft(schema, values);
        debug!(owner = %id, "draft_opened");
        Ok(())
    }

    /// Close the editor: drop the draft and its pending timers. Returns false
    /// when nothing was selected.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        self.debouncer.cancel_all();
        state.draft.take().is_some()
    }

    /// Owner id of the active draft.
    pub fn active_owner(&self) -> Option<String> {
        self.state
            .lock()
            .draft
            .as_ref()
            .map(|d| d.owner().to_string())
    }

    /// Set the draft value of `key`.
    ///
    /// The value is stored at once. Its violations are recomputed at once for
    /// toggles, selects and tags, and after the configured idle window for
    /// text and number inputs; a later edit of the same field restarts the
    /// window.
    pub fn edit(&self, key: &str, value: Value) -> Result<()> {
        let mut state = self.state.lock();
        let draft = state.draft_mut()?;
        let debounced = draft
            .schema()
            .field(key)
            .is_some_and(|f| Control::for_field(f).debounced());
        draft.set_value(key, value.clone())?;

        if !debounced {
            draft.revalidate(key);
            return Ok(());
        }
        let generation = draft.generation();
        let weak = Arc::downgrade(&self.state);
        let field = key.to_string();
        let scheduled = self
            .debouncer
            .schedule(key.to_string(), self.config.debounce(), move || {
                revalidate_later(&weak, generation, &field, &value);
            });
        if !scheduled {
            draft.revalidate(key);
        }
        Ok(())
    }

    /// Read raw user input for `key` through the field's control, then
    /// [`Manager::edit`] it.
    pub fn edit_input(&self, key: &str, input: &str) -> Result<()> {
        let value = {
            let mut state = self.state.lock();
            let draft = state.draft_mut()?;
            let field = draft.schema().field(key).ok_or_else(|| Error::UnknownField {
                owner: draft.owner().to_string(),
                key: key.to_string(),
            })?;
            Control::for_field(field).read(input)
        };
        self.edit(key, value)
    }

    /// Append one tag to a list field. Blank and duplicate tags are ignored.
    pub fn add_tag(&self, key: &str, tag: &str) -> Result<()> {
        let current = self.draft_value(key)?;
        self.edit(key, control::add_tag(&current, tag))
    }

    /// Remove one tag from a list field.
    pub fn remove_tag(&self, key: &str, tag: &str) -> Result<()> {
        let current = self.draft_value(key)?;
        self.edit(key, control::remove_tag(&current, tag))
    }

    /// Current draft value of `key`.
    fn draft_value(&self, key: &str) -> Result<Value> {
        let mut state = self.state.lock();
        let draft = state.draft_mut()?;
        draft
            .value(key)
            .cloned()
            .ok_or_else(|| Error::UnknownField {
                owner: draft.owner().to_string(),
                key: key.to_string(),
            })
    }

    /// Validate every field of the draft against its current value and, if
    /// all pass, persist them as one batch and notify listeners.
    ///
    /// On violations nothing is written and the violations are returned. On a
    /// storage failure the draft is left as it was, still unsaved.
    pub fn commit(&self) -> Result<Values> {
        let (owner, values) = {
            let mut state = self.state.lock();
            let draft = state.draft_mut()?;
            self.debouncer.cancel_all();
            if !draft.revalidate_all() {
                let errors = draft.errors().clone();
                info!(owner = %draft.owner(), failing = errors.len(), "commit_blocked");
                return Err(Error::ValidationFailed { errors });
            }
            let values = draft.finalized();
            if let Err(e) = self.storage.save_all(draft.owner(), &values) {
                warn!(owner = %draft.owner(), error = %e, "commit_persist_failed");
                return Err(e.into());
            }
            draft.mark_saved(values.clone());
            (draft.owner().to_string(), values)
        };
        info!(owner = %owner, "settings_committed");
        self.broadcaster.publish(&owner, &values);
        Ok(values)
    }

    /// Delete every stored value of the selected owner, reseed the draft with
    /// the defaults, and notify listeners with them.
    pub fn discard(&self) -> Result<Values> {
        let (owner, defaults) = {
            let mut state = self.state.lock();
            let draft = state.draft_mut()?;
            self.debouncer.cancel_all();
            let owner = draft.owner().to_string();
            let removed = self.storage.clear(&owner).inspect_err(|e| {
                warn!(owner = %owner, error = %e, "reset_persist_failed");
            })?;
            let defaults = draft.schema().defaults();
            draft.reset(defaults.clone());
            info!(owner = %owner, removed, "settings_reset");
            (owner, defaults)
        };
        self.broadcaster.publish(&owner, &defaults);
        Ok(defaults)
    }

    /// Status of the active draft.
    pub fn status(&self) -> Option<Status> {
        self.state.lock().draft.as_ref().map(Draft::status)
    }

    /// Copy of the active draft.
    pub fn snapshot(&self) -> Option<DraftSnapshot> {
        self.state.lock().draft.as_ref().map(Draft::snapshot)
    }

    /// Whether re-validation of `key` is still waiting on the idle window.
    pub fn is_pending(&self, key: &str) -> bool {
        self.debouncer.is_pending(key)
    }
}

/// Debounced re-validation of `key`; skipped if the draft was replaced or the
/// value has since changed.
fn revalidate_later(state: &Weak<Mutex<State>>, generation: u64, key: &str, value: &Value) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.lock();
    let Some(draft) = state.draft.as_mut() else {
        return;
    };
    if draft.generation() != generation || draft.value(key) != Some(value) {
        debug!(key = %key, "revalidate_stale");
        return;
    }
    let failing = draft.revalidate(key).len();
    debug!(owner = %draft.owner(), key = %key, failing, "field_revalidated");
}
