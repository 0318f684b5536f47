//! The document store: the one owner of the component tree being edited.
//!
//! Every structural mutation snapshots the pre-mutation document into a
//! [`History`] and notifies subscribers. The store never validates; callers
//! run [`crate::validation`] when they want to.
//!
//! Mutations addressed at an id that doesn't exist at the root level are
//! no-ops: they return `false` and record no history.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::history::{History, HistoryOptions, HistoryStats};
use crate::storage::{PersistedState, STORAGE_VERSION};
use crate::types::*;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    pub history: HistoryOptions,
}

/// Which store operation produced a [`StoreChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreAction {
    Add,
    Remove,
    Update,
    Reorder,
    Duplicate,
    Clear,
    ReplaceAll,
    Undo,
    Redo,
    Select,
    SetTheme,
}

impl StoreAction {
    /// Whether the action changed the document (as opposed to selection or
    /// theme).
    pub fn is_structural(self) -> bool {
        !matches!(self, Self::Select | Self::SetTheme)
    }
}

/// Notification delivered to subscribers after each applied operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub action: StoreAction,
    /// Root count after the change.
    pub len: usize,
}

/// A finished drag gesture from the host's drag-and-drop layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub active_id: ComponentId,
    /// `None` when dropped outside any sortable target.
    pub over_id: Option<ComponentId>,
}

pub type ListenerId = u64;

/// Returns `false` to detach itself.
type Listener = Box<dyn FnMut(&StoreChange) -> bool + Send>;

// ===========================================================================
// DocumentStore
// ===========================================================================

pub struct DocumentStore {
    history: History<Document>,
    selected: Option<ComponentId>,
    theme: Theme,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
    disposed: bool,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("components", &self.components())
            .field("selected", &self.selected)
            .field("theme", &self.theme)
            .field("history", &self.history.stats())
            .field("listeners", &self.listeners.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl DocumentStore {
    /// An empty document with default options.
    pub fn new() -> Self {
        Self::with_state(Vec::new(), StoreOptions::default())
    }

    pub fn with_state(initial: Document, options: StoreOptions) -> Self {
        Self {
            history: History::with_options(initial, options.history),
            selected: None,
            theme: Theme::default(),
            listeners: Vec::new(),
            next_listener: 0,
            disposed: false,
        }
    }

    /// Restore a saved session. History starts empty.
    pub fn from_persisted(state: PersistedState, options: StoreOptions) -> Self {
        let mut store = Self::with_state(state.components, options);
        store.theme = state.theme;
        store
    }

    /// Detach every listener. Later mutations are ignored.
    pub fn dispose(&mut self) {
        debug!(listeners = self.listeners.len(), "disposing document store");
        self.listeners.clear();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn components(&self) -> &[Component] {
        self.history.present()
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components().find_by_id(id)
    }

    pub fn len(&self) -> usize {
        self.components().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components().is_empty()
    }

    pub fn history(&self) -> &History<Document> {
        &self.history
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn selected(&self) -> Option<&ComponentId> {
        self.selected.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The slice of state that survives a restart.
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            version: STORAGE_VERSION,
            components: self.components().to_vec(),
            theme: self.theme,
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, mut listener: impl FnMut(&StoreChange) + Send + 'static) -> ListenerId {
        self.subscribe_while(move |change| {
            listener(change);
            true
        })
    }

    /// Like [`subscribe`](Self::subscribe), but the listener is dropped the
    /// first time it returns `false`.
    pub fn subscribe_while(&mut self, listener: impl FnMut(&StoreChange) -> bool + Send + 'static) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, action: StoreAction) {
        let change = StoreChange {
            action,
            len: self.len(),
        };
        self.listeners.retain_mut(|(id, listener)| {
            let keep = listener(&change);
            if !keep {
                trace!(listener = *id, "listener detached");
            }
            keep
        });
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    fn accepts(&self, action: StoreAction) -> bool {
        if self.disposed {
            warn!(?action, "ignoring mutation on disposed store");
        }
        !self.disposed
    }

    fn commit(&mut self, action: StoreAction, next: Document) {
        self.history.push(next);
        self.notify(action);
    }

    /// Append `component` to the root sequence.
    pub fn add(&mut self, component: Component) {
        if !self.accepts(StoreAction::Add) {
            return;
        }
        let mut next = self.components().to_vec();
        next.push(component);
        self.commit(StoreAction::Add, next);
    }

    /// Remove the root node addressed by `id`.
    pub fn remove(&mut self, id: &ComponentId) -> bool {
        if !self.accepts(StoreAction::Remove) {
            return false;
        }
        let Some(index) = self.components().position_of(id) else {
            return false;
        };
        let mut next = self.components().to_vec();
        next.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.commit(StoreAction::Remove, next);
        true
    }

    /// Shallow-merge wire fields into the root node addressed by `id`.
    ///
    /// Returns `Ok(false)` for an unknown id. A patch that changes `id` or
    /// `type`, or leaves the node unrepresentable, is an error and records
    /// nothing.
    pub fn update(&mut self, id: &ComponentId, patch: &Map<String, Value>) -> Result<bool, ComponentError> {
        if !self.accepts(StoreAction::Update) {
            return Ok(false);
        }
        let Some(index) = self.components().position_of(id) else {
            return Ok(false);
        };
        let merged = self.components()[index].merge_patch(patch)?;
        let mut next = self.components().to_vec();
        next[index] = merged;
        self.commit(StoreAction::Update, next);
        Ok(true)
    }

    /// Typed update. The node keeps its id whatever `f` does to it.
    pub fn modify(&mut self, id: &ComponentId, f: impl FnOnce(&mut Component)) -> bool {
        if !self.accepts(StoreAction::Update) {
            return false;
        }
        let Some(index) = self.components().position_of(id) else {
            return false;
        };
        let mut next = self.components().to_vec();
        let mut node = next[index].clone();
        f(&mut node);
        next[index] = node.with_id(id.clone());
        self.commit(StoreAction::Update, next);
        true
    }

    /// Splice the node at `from` out and reinsert it at `to`.
    ///
    /// `to` past the end appends. `from` out of range is a no-op.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if !self.accepts(StoreAction::Reorder) || from >= self.len() {
            return false;
        }
        let mut next = self.components().to_vec();
        let node = next.remove(from);
        let to = to.min(next.len());
        next.insert(to, node);
        self.commit(StoreAction::Reorder, next);
        true
    }

    /// Append a deep copy of the node addressed by `id`. Returns the copy's
    /// id.
    pub fn duplicate(&mut self, id: &ComponentId) -> Option<ComponentId> {
        if !self.accepts(StoreAction::Duplicate) {
            return None;
        }
        let copy = self.get(id)?.duplicate();
        let copy_id = copy.id().cloned();
        let mut next = self.components().to_vec();
        next.push(copy);
        self.commit(StoreAction::Duplicate, next);
        copy_id
    }

    pub fn clear(&mut self) {
        if !self.accepts(StoreAction::Clear) {
            return;
        }
        self.selected = None;
        self.commit(StoreAction::Clear, Vec::new());
    }

    /// Swap in a whole new document (import, paste-with-replace).
    pub fn replace_all(&mut self, components: Document) {
        if !self.accepts(StoreAction::ReplaceAll) {
            return;
        }
        self.drop_stale_selection(&components);
        self.commit(StoreAction::ReplaceAll, components);
    }

    pub fn undo(&mut self) -> bool {
        if !self.accepts(StoreAction::Undo) || !self.history.undo() {
            return false;
        }
        self.drop_stale_selection_current();
        self.notify(StoreAction::Undo);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.accepts(StoreAction::Redo) || !self.history.redo() {
            return false;
        }
        self.drop_stale_selection_current();
        self.notify(StoreAction::Redo);
        true
    }

    /// Translate a drag-and-drop end event into a reorder. Drops outside a
    /// target, onto the dragged node itself, or involving unknown ids are
    /// ignored.
    pub fn apply_drag(&mut self, event: &DragEnd) -> bool {
        let Some(over) = &event.over_id else {
            return false;
        };
        if *over == event.active_id {
            return false;
        }
        let components = self.components();
        match (components.position_of(&event.active_id), components.position_of(over)) {
            (Some(from), Some(to)) => {
                debug!(from, to, active = %event.active_id, "drag ended");
                self.reorder(from, to)
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Editor state (not recorded in history)
    // -----------------------------------------------------------------------

    pub fn select(&mut self, id: Option<ComponentId>) {
        if !self.accepts(StoreAction::Select) {
            return;
        }
        self.selected = id;
        self.notify(StoreAction::Select);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if !self.accepts(StoreAction::SetTheme) {
            return;
        }
        self.theme = theme;
        self.notify(StoreAction::SetTheme);
    }

    fn drop_stale_selection(&mut self, document: &[Component]) {
        if let Some(selected) = &self.selected {
            if document.find_in_tree(selected).is_none() {
                self.selected = None;
            }
        }
    }

    fn drop_stale_selection_current(&mut self) {
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|id| self.components().find_in_tree(id).is_some());
        if !keep {
            self.selected = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn abc() -> DocumentStore {
        DocumentStore::with_state(
            vec![
                text_display("A").with_id("a"),
                text_display("B").with_id("b"),
                text_display("C").with_id("c"),
            ],
            StoreOptions::default(),
        )
    }

    fn order(store: &DocumentStore) -> Vec<String> {
        store
            .components()
            .ids()
            .into_iter()
            .map(ComponentId::into_inner)
            .collect()
    }

    #[test]
    fn reorder_is_a_splice_not_a_swap() {
        let mut store = abc();
        assert!(store.reorder(0, 2));
        assert_eq!(order(&store), ["b", "c", "a"]);

        let mut store = abc();
        assert!(store.reorder(2, 0));
        assert_eq!(order(&store), ["c", "a", "b"]);
    }

    #[test]
    fn reorder_clamps_target_and_rejects_bad_source() {
        let mut store = abc();
        assert!(store.reorder(0, 99));
        assert_eq!(order(&store), ["b", "c", "a"]);

        let before = store.history_stats();
        assert!(!store.reorder(3, 0));
        assert_eq!(store.history_stats(), before);
    }

    #[test]
    fn undo_redo_inverse_over_mutations() {
        let mut store = DocumentStore::new();
        let initial = store.components().to_vec();

        store.add(text_display("one").with_id("1"));
        store.add(text_display("two").with_id("2"));
        store
            .update(&"1".into(), json!({"content": "uno"}).as_object().unwrap())
            .unwrap();
        store.reorder(1, 0);
        store.remove(&"2".into());
        let last = store.components().to_vec();

        for _ in 0..5 {
            assert!(store.undo());
        }
        assert_eq!(store.components(), initial.as_slice());
        assert!(!store.undo());

        for _ in 0..5 {
            assert!(store.redo());
        }
        assert_eq!(store.components(), last.as_slice());
        assert!(!store.redo());
    }

    #[test]
    fn remove_of_unknown_id_records_nothing() {
        let mut store = abc();
        assert!(!store.remove(&"missing".into()));
        assert!(!store.can_undo());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn new_mutation_discards_redo() {
        let mut store = abc();
        store.clear();
        store.undo();
        assert!(store.can_redo());
        store.add(separator(SeparatorSpacing::Small, true));
        assert!(!store.can_redo());
    }

    #[test]
    fn update_merges_and_refuses_id_changes() {
        let mut store = DocumentStore::new();
        store.add(button(ButtonStyle::Primary, "Hi", "a").with_id("btn"));

        let patch = json!({"label": "Bye"});
        assert!(store.update(&"btn".into(), patch.as_object().unwrap()).unwrap());
        match store.get(&"btn".into()) {
            Some(Component::Button(b)) => {
                assert_eq!(b.label, "Bye");
                assert_eq!(b.custom_id.as_deref(), Some("a"));
            }
            other => panic!("expected Button, got {other:?}"),
        }

        let undo_depth = store.history_stats().past_count;
        let bad = json!({"id": "stolen"});
        assert!(store.update(&"btn".into(), bad.as_object().unwrap()).is_err());
        assert_eq!(store.history_stats().past_count, undo_depth);

        let unknown = store.update(&"nope".into(), patch.as_object().unwrap()).unwrap();
        assert!(!unknown);
    }

    #[test]
    fn update_does_not_validate() {
        let mut store = DocumentStore::new();
        store.add(button(ButtonStyle::Primary, "Hi", "a").with_id("btn"));
        let patch = json!({"label": ""});
        assert!(store.update(&"btn".into(), patch.as_object().unwrap()).unwrap());
    }

    #[test]
    fn modify_keeps_the_id() {
        let mut store = abc();
        assert!(store.modify(&"a".into(), |node| {
            *node = text_display("replaced");
        }));
        match store.get(&"a".into()) {
            Some(Component::TextDisplay(t)) => assert_eq!(t.content, "replaced"),
            other => panic!("expected TextDisplay, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_appends_copy_with_fresh_id() {
        let mut store = abc();
        let copy = store.duplicate(&"b".into()).unwrap();
        assert!(copy.as_str().starts_with("b_copy_"));
        assert_eq!(store.len(), 4);
        assert_eq!(store.components()[3].id(), Some(&copy));
        assert!(store.duplicate(&"missing".into()).is_none());
    }

    #[test]
    fn removing_selected_clears_selection() {
        let mut store = abc();
        store.select(Some("b".into()));
        store.remove(&"a".into());
        assert_eq!(store.selected(), Some(&"b".into()));
        store.remove(&"b".into());
        assert!(store.selected().is_none());

        store.select(Some("c".into()));
        store.clear();
        assert!(store.selected().is_none());
    }

    #[test]
    fn selection_and_theme_skip_history() {
        let mut store = abc();
        store.select(Some("a".into()));
        store.set_theme(Theme::Light);
        assert!(!store.can_undo());
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn drag_end_reorders_by_id() {
        let mut store = abc();
        let drag = DragEnd {
            active_id: "a".into(),
            over_id: Some("c".into()),
        };
        assert!(store.apply_drag(&drag));
        assert_eq!(order(&store), ["b", "c", "a"]);

        let onto_self = DragEnd {
            active_id: "a".into(),
            over_id: Some("a".into()),
        };
        assert!(!store.apply_drag(&onto_self));
        let outside = DragEnd {
            active_id: "a".into(),
            over_id: None,
        };
        assert!(!store.apply_drag(&outside));
    }

    #[test]
    fn listeners_see_each_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = DocumentStore::new();
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        store.add(text_display("x"));
        store.undo();
        assert!(store.unsubscribe(id));
        store.add(text_display("y"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], StoreChange { action: StoreAction::Add, len: 1 });
        assert_eq!(seen[1].action, StoreAction::Undo);
        assert!(!store.unsubscribe(id));
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn listener_detaches_by_returning_false() {
        let mut store = DocumentStore::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        store.subscribe_while(move |_| {
            *sink.lock().unwrap() += 1;
            false
        });
        store.subscribe(|_| {});
        assert_eq!(store.listener_count(), 2);

        store.add(text_display("a"));
        store.add(text_display("b"));
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(store.listener_count(), 1);
        assert!(format!("{store:?}").contains("listeners: 1"));
    }

    #[test]
    fn disposed_store_ignores_mutations() {
        let mut store = abc();
        store.dispose();
        store.add(text_display("late"));
        assert!(!store.remove(&"a".into()));
        assert_eq!(store.len(), 3);
        assert!(store.is_disposed());
    }

    #[test]
    fn history_cap_applies_to_store() {
        let options = StoreOptions {
            history: HistoryOptions {
                max_history_size: 2,
                enable_compression: false,
            },
        };
        let mut store = DocumentStore::with_state(Vec::new(), options);
        for i in 0..5 {
            store.add(text_display(format!("{i}")));
        }
        assert_eq!(store.history_stats().past_count, 2);
    }

    #[test]
    fn persisted_round_trip() {
        let mut store = abc();
        store.set_theme(Theme::Light);
        let saved = store.persisted();
        let restored = DocumentStore::from_persisted(saved, StoreOptions::default());
        assert_eq!(restored.components(), store.components());
        assert_eq!(restored.theme(), Theme::Light);
        assert!(!restored.can_undo());
    }
}
