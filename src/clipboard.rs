//! Copy, cut and paste of component subtrees.
//!
//! The in-process [`Clipboard`] holds deep copies. Pasting mints fresh ids
//! for every node of every pasted subtree unless the caller opts out, so a
//! paste never collides with the nodes it was copied from.
//!
//! With the `io` feature the system clipboard is reachable through the
//! [`SystemClipboard`] trait. Its failures are logged and reported as
//! `false`/`None`, never as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::batch_delete;
use crate::import::{parse_json, validate_components};
use crate::store::DocumentStore;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardData {
    pub components: Document,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardOptions {
    pub regenerate_ids: bool,
    /// Also write to the system clipboard when one is available.
    pub copy_to_system: bool,
}

impl Default for ClipboardOptions {
    fn default() -> Self {
        Self {
            regenerate_ids: true,
            copy_to_system: true,
        }
    }
}

fn fresh_copies(components: &[Component], regenerate_ids: bool) -> Document {
    if regenerate_ids {
        components.iter().map(Component::with_fresh_ids).collect()
    } else {
        components.to_vec()
    }
}

// ===========================================================================
// In-process clipboard
// ===========================================================================

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    data: Option<ClipboardData>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&ClipboardData> {
        self.data.as_ref()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Number of root nodes held.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |data| data.components.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    /// Replace the clipboard contents with deep copies of `components`.
    pub fn copy(&mut self, components: &[Component]) -> &ClipboardData {
        debug!(count = components.len(), "copied components");
        self.data.insert(ClipboardData {
            components: components.to_vec(),
            timestamp: Utc::now(),
        })
    }

    /// Copy the root nodes addressed by `ids` and remove them from `store`
    /// as one undoable step. Returns how many were cut.
    pub fn cut(&mut self, store: &mut DocumentStore, ids: &[ComponentId]) -> usize {
        let cut: Document = store
            .components()
            .iter()
            .filter(|c| c.id().is_some_and(|id| ids.contains(id)))
            .cloned()
            .collect();
        if cut.is_empty() {
            return 0;
        }

        let outcome = batch_delete(store.components(), ids);
        self.copy(&cut);
        store.replace_all(outcome.remaining);
        outcome.deleted_count
    }

    /// Deep copies of the held nodes, or `None` when empty.
    pub fn paste(&self, options: ClipboardOptions) -> Option<Document> {
        let data = self.data.as_ref()?;
        Some(fresh_copies(&data.components, options.regenerate_ids))
    }

    /// Paste into `store`, appending one node at a time or replacing the
    /// whole document. Returns how many nodes were pasted.
    pub fn paste_into(&self, store: &mut DocumentStore, options: ClipboardOptions, replace: bool) -> usize {
        let Some(components) = self.paste(options) else {
            return 0;
        };
        let count = components.len();
        if replace {
            store.replace_all(components);
        } else {
            for component in components {
                store.add(component);
            }
        }
        count
    }
}

// ===========================================================================
// Text form
// ===========================================================================

/// Pretty-printed JSON array.
pub fn to_clipboard_text(components: &[Component]) -> String {
    serde_json::to_string_pretty(components).unwrap_or_else(|e| {
        warn!(error = %e, "failed to serialize clipboard contents");
        "[]".to_string()
    })
}

/// Parse pasted text: a JSON array or a message object. Entries that aren't
/// components are skipped. `None` if the text isn't usable at all.
pub fn from_clipboard_text(text: &str, regenerate_ids: bool) -> Option<Document> {
    let values = match parse_json(text) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "clipboard text is not a component list");
            return None;
        }
    };
    let validation = validate_components(values);
    Some(fresh_copies(&validation.valid, regenerate_ids))
}

// ===========================================================================
// System clipboard boundary
// ===========================================================================

#[cfg(feature = "io")]
pub use self::system::*;

#[cfg(feature = "io")]
mod system {
    use std::future::Future;

    use async_lock::Mutex;
    use thiserror::Error;
    use tracing::{debug, warn};

    use super::{from_clipboard_text, to_clipboard_text, Clipboard, ClipboardData, ClipboardOptions};
    use crate::types::*;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ClipboardError {
        #[error("system clipboard is unavailable")]
        Unavailable,
        #[error("clipboard access failed: {0}")]
        Access(String),
    }

    /// Plain-text access to the host's clipboard.
    pub trait SystemClipboard: Send + Sync {
        fn write_text(&self, text: String) -> impl Future<Output = Result<(), ClipboardError>> + Send;
        fn read_text(&self) -> impl Future<Output = Result<String, ClipboardError>> + Send;
    }

    /// A clipboard living in memory, for headless hosts and tests.
    #[derive(Debug, Default)]
    pub struct MemoryClipboard {
        text: Mutex<Option<String>>,
        unavailable: bool,
    }

    impl MemoryClipboard {
        pub fn new() -> Self {
            Self::default()
        }

        /// A clipboard whose every access fails.
        pub fn unavailable() -> Self {
            Self {
                text: Mutex::new(None),
                unavailable: true,
            }
        }

        pub async fn contents(&self) -> Option<String> {
            self.text.lock().await.clone()
        }
    }

    impl SystemClipboard for MemoryClipboard {
        async fn write_text(&self, text: String) -> Result<(), ClipboardError> {
            if self.unavailable {
                return Err(ClipboardError::Unavailable);
            }
            *self.text.lock().await = Some(text);
            Ok(())
        }

        async fn read_text(&self) -> Result<String, ClipboardError> {
            if self.unavailable {
                return Err(ClipboardError::Unavailable);
            }
            self.text
                .lock()
                .await
                .clone()
                .ok_or_else(|| ClipboardError::Access("clipboard is empty".into()))
        }
    }

    pub async fn copy_to_system_clipboard(system: &impl SystemClipboard, components: &[Component]) -> bool {
        match system.write_text(to_clipboard_text(components)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to copy to system clipboard");
                false
            }
        }
    }

    /// Ids are always regenerated.
    pub async fn read_from_system_clipboard(system: &impl SystemClipboard) -> Option<Document> {
        match system.read_text().await {
            Ok(text) => from_clipboard_text(&text, true),
            Err(e) => {
                warn!(error = %e, "failed to read from system clipboard");
                None
            }
        }
    }

    impl Clipboard {
        /// [`Clipboard::copy`], then mirror to `system` if
        /// `options.copy_to_system`. A system failure doesn't undo the
        /// in-process copy.
        pub async fn copy_with_system(
            &mut self,
            components: &[Component],
            options: ClipboardOptions,
            system: &impl SystemClipboard,
        ) -> ClipboardData {
            let data = self.copy(components).clone();
            if options.copy_to_system {
                let mirrored = copy_to_system_clipboard(system, components).await;
                debug!(mirrored, "mirrored copy to system clipboard");
            }
            data
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Component {
        container(
            None,
            vec![action_row(vec![button(ButtonStyle::Primary, "A", "a").with_id("btn")]).with_id("row")],
        )
        .with_id("box")
    }

    fn all_ids(components: &[Component]) -> Vec<ComponentId> {
        components.walk().into_iter().filter_map(|c| c.id().cloned()).collect()
    }

    #[test]
    fn empty_clipboard() {
        let clipboard = Clipboard::new();
        assert!(!clipboard.has_data());
        assert_eq!(clipboard.len(), 0);
        assert!(clipboard.paste(ClipboardOptions::default()).is_none());
    }

    #[test]
    fn paste_regenerates_every_id() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[nested()]);
        assert_eq!(clipboard.len(), 1);

        let original = all_ids(&[nested()]);
        let pasted = clipboard.paste(ClipboardOptions::default()).unwrap();
        let fresh = all_ids(&pasted);
        assert_eq!(fresh.len(), 3);
        assert!(fresh.iter().all(|id| !original.contains(id)));

        // Pasting twice yields distinct ids too.
        let again = all_ids(&clipboard.paste(ClipboardOptions::default()).unwrap());
        assert!(again.iter().all(|id| !fresh.contains(id)));
    }

    #[test]
    fn paste_can_keep_ids() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[nested()]);
        let options = ClipboardOptions {
            regenerate_ids: false,
            ..Default::default()
        };
        assert_eq!(clipboard.paste(options).unwrap(), vec![nested()]);
    }

    #[test]
    fn cut_removes_in_one_step() {
        let mut store = DocumentStore::new();
        store.add(text_display("a").with_id("a"));
        store.add(text_display("b").with_id("b"));
        store.add(text_display("c").with_id("c"));
        let depth = store.history_stats().past_count;

        let mut clipboard = Clipboard::new();
        let cut = clipboard.cut(&mut store, &["a".into(), "c".into()]);
        assert_eq!(cut, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(clipboard.len(), 2);
        assert_eq!(store.history_stats().past_count, depth + 1);

        assert_eq!(clipboard.cut(&mut store, &["zzz".into()]), 0);
        assert_eq!(clipboard.len(), 2);
    }

    #[test]
    fn paste_into_store() {
        let mut store = DocumentStore::new();
        store.add(text_display("keep"));
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[text_display("x"), text_display("y")]);

        assert_eq!(clipboard.paste_into(&mut store, ClipboardOptions::default(), false), 2);
        assert_eq!(store.len(), 3);
        assert_eq!(clipboard.paste_into(&mut store, ClipboardOptions::default(), true), 2);
        assert_eq!(store.len(), 2);

        clipboard.clear();
        assert_eq!(clipboard.paste_into(&mut store, ClipboardOptions::default(), false), 0);
    }

    #[test]
    fn text_round_trip() {
        let text = to_clipboard_text(&[nested()]);
        assert!(text.starts_with("[\n  {"));
        assert_eq!(from_clipboard_text(&text, false).unwrap(), vec![nested()]);

        let message = r#"{"components": [{"type": 100, "content": "hi"}, {"type": 42}], "flags": 128}"#;
        let pasted = from_clipboard_text(message, true).unwrap();
        assert_eq!(pasted.len(), 1);
        assert!(pasted[0].id().is_some());

        assert!(from_clipboard_text("plain words", true).is_none());
    }

    #[cfg(feature = "io")]
    mod system {
        use super::*;
        use futures_lite::future::block_on;

        #[test]
        fn system_round_trip() {
            let system = MemoryClipboard::new();
            assert!(block_on(copy_to_system_clipboard(&system, &[nested()])));

            let pasted = block_on(read_from_system_clipboard(&system)).unwrap();
            assert_eq!(pasted.len(), 1);
            assert_ne!(pasted[0].id(), nested().id());
        }

        #[test]
        fn failures_become_sentinels() {
            let system = MemoryClipboard::unavailable();
            assert!(!block_on(copy_to_system_clipboard(&system, &[nested()])));
            assert!(block_on(read_from_system_clipboard(&system)).is_none());

            let empty = MemoryClipboard::new();
            assert!(block_on(read_from_system_clipboard(&empty)).is_none());
        }

        #[test]
        fn copy_mirrors_when_asked() {
            let system = MemoryClipboard::new();
            let mut clipboard = Clipboard::new();
            block_on(clipboard.copy_with_system(&[text_display("x")], ClipboardOptions::default(), &system));
            assert!(block_on(system.contents()).is_some());
            assert!(clipboard.has_data());

            let quiet = MemoryClipboard::new();
            let options = ClipboardOptions {
                copy_to_system: false,
                ..Default::default()
            };
            block_on(clipboard.copy_with_system(&[text_display("y")], options, &quiet));
            assert!(block_on(quiet.contents()).is_none());

            // An unavailable system clipboard doesn't block the local copy.
            let broken = MemoryClipboard::unavailable();
            let data = block_on(clipboard.copy_with_system(&[text_display("z")], ClipboardOptions::default(), &broken));
            assert_eq!(data.components.len(), 1);
        }
    }
}
