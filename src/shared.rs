//! A [`DocumentStore`] shared between async tasks, with change events
//! delivered over a channel instead of callbacks.

use std::sync::Arc;

use async_channel::Receiver;
use async_lock::{Mutex, MutexGuard};
use tracing::trace;

use crate::storage::{save_state, KeyValueStorage, StorageError};
use crate::store::{DocumentStore, StoreChange};

/// Cheap to clone (internals are behind `Arc`).
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<DocumentStore>>,
}

impl SharedStore {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, DocumentStore> {
        self.inner.lock().await
    }

    /// Run `f` with the store locked.
    pub async fn with<R>(&self, f: impl FnOnce(&mut DocumentStore) -> R) -> R {
        let mut store = self.inner.lock().await;
        f(&mut store)
    }

    /// Every change applied after this call, in order. Dropping the receiver
    /// detaches its listener on the next change.
    pub async fn subscribe_channel(&self) -> Receiver<StoreChange> {
        let (tx, rx) = async_channel::unbounded();
        let mut store = self.inner.lock().await;
        store.subscribe_while(move |change| {
            let sent = tx.try_send(change.clone()).is_ok();
            if !sent {
                trace!("change receiver dropped");
            }
            sent
        });
        rx
    }

    /// Persist the current document and theme.
    pub async fn save(&self, storage: &mut impl KeyValueStorage) -> Result<(), StorageError> {
        let state = self.inner.lock().await.persisted();
        save_state(storage, &state)
    }
}

#[cfg(test)]
mod tests {
    use futures_lite::future::block_on;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::storage::{load_state, MemoryStorage};
    use crate::store::StoreAction;
    use crate::types::*;

    assert_impl_all!(SharedStore: Send, Sync, Clone);

    #[test]
    fn changes_arrive_in_order() {
        block_on(async {
            let shared = SharedStore::new(DocumentStore::new());
            let changes = shared.subscribe_channel().await;

            let other = shared.clone();
            other.with(|store| store.add(text_display("a").with_id("a"))).await;
            other.with(|store| store.remove(&"a".into())).await;

            let first = changes.recv().await.unwrap();
            let second = changes.recv().await.unwrap();
            assert_eq!((first.action, first.len), (StoreAction::Add, 1));
            assert_eq!((second.action, second.len), (StoreAction::Remove, 0));
            assert!(changes.is_empty());
        });
    }

    #[test]
    fn dropped_receiver_does_not_block_mutations() {
        block_on(async {
            let shared = SharedStore::new(DocumentStore::new());
            for _ in 0..100 {
                drop(shared.subscribe_channel().await);
            }
            let kept = shared.subscribe_channel().await;
            assert_eq!(shared.lock().await.listener_count(), 101);

            shared.with(|store| store.add(text_display("a"))).await;
            assert_eq!(shared.lock().await.len(), 1);
            assert_eq!(shared.lock().await.listener_count(), 1);
            assert_eq!(kept.recv().await.unwrap().action, StoreAction::Add);
        });
    }

    #[test]
    fn save_persists_current_state() {
        block_on(async {
            let shared = SharedStore::new(DocumentStore::new());
            shared.with(|store| store.add(text_display("kept").with_id("k"))).await;

            let mut storage = MemoryStorage::default();
            shared.save(&mut storage).await.unwrap();
            let state = load_state(&storage).unwrap().unwrap();
            assert_eq!(state.components, vec![text_display("kept").with_id("k")]);
        });
    }
}
