use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::session::{CredentialStore, StoredCredentials};

/// In-memory credential store for tests and demos.
///
/// Stands in for the durable browser storage the real client writes its
/// `(token, identity)` pair to. Clones share the same slot.
#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<StoredCredentials>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Option<StoredCredentials> {
        self.slot.lock().expect("poisoned lock").clone()
    }

    async fn store(&self, credentials: StoredCredentials) {
        let mut guard = self.slot.lock().expect("poisoned lock");
        *guard = Some(credentials);
    }

    async fn clear(&self) {
        let mut guard = self.slot.lock().expect("poisoned lock");
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthToken, Identity};
    use futures::executor::block_on;

    #[test]
    fn store_load_clear_round_trip() {
        let store = MemoryCredentialStore::new();
        assert!(block_on(store.load()).is_none());

        let credentials = StoredCredentials {
            token: AuthToken::from("tok_1"),
            identity: Identity::from_string("member@example.ca".to_string()),
        };
        block_on(store.store(credentials.clone()));
        assert_eq!(block_on(store.load()), Some(credentials));

        block_on(store.clear());
        assert!(block_on(store.load()).is_none());
    }

    #[test]
    fn clones_share_the_same_slot() {
        let store = MemoryCredentialStore::new();
        let alias = store.clone();

        block_on(store.store(StoredCredentials {
            token: AuthToken::from("tok_1"),
            identity: Identity::from_string("member@example.ca".to_string()),
        }));
        assert!(block_on(alias.load()).is_some());

        block_on(alias.clear());
        assert!(block_on(store.load()).is_none());
    }
}
