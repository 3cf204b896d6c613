use thiserror::Error;
use tokio::sync::watch;

use crate::ai::{MealResolver, ResolveError};
use crate::db::{EntryStore, StoreError};
use crate::models::FoodEntry;

/// Failure of a ledger operation: either the description could not be
/// resolved (nothing was persisted) or the store could not complete.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Composes the entry store and the meal resolver for consumers.
///
/// Built explicitly from its parts at startup; holds no global state.
pub struct Ledger {
    store: EntryStore,
    resolver: MealResolver,
}

impl Ledger {
    pub fn new(store: EntryStore, resolver: MealResolver) -> Self {
        Self { store, resolver }
    }

    /// Live ordered entry collection, newest first.
    pub fn entries(&self) -> watch::Receiver<Vec<FoodEntry>> {
        self.store.observe()
    }

    /// The current collection, without subscribing.
    pub fn snapshot(&self) -> Vec<FoodEntry> {
        self.store.snapshot()
    }

    /// Resolves a free-text description and persists the result. On any
    /// resolution failure the store is untouched.
    pub async fn add_from_text(
        &self,
        description: &str,
        api_key: &str,
    ) -> Result<FoodEntry, LedgerError> {
        let entry = self.resolver.resolve(description, api_key).await?;
        let stored = self.store.insert(&entry).await?;
        Ok(stored)
    }

    /// Removes an entry by id; removing a missing id is a no-op.
    pub async fn remove(&self, id: i64) -> Result<(), LedgerError> {
        self.store.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn stub_service(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    async fn ledger_against(url: String) -> (Ledger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        let store = EntryStore::new(pool).await.unwrap();
        let resolver = MealResolver::new(url, "test-model").unwrap();
        (Ledger::new(store, resolver), temp_dir)
    }

    #[tokio::test]
    async fn test_add_from_text_persists_resolved_entry() {
        let body = serde_json::json!({
            "choices": [{ "message": {
                "content": "{\"food_name\":\"Grilled Chicken Breast\",\"calories\":284,\"protein\":53}"
            } }]
        })
        .to_string();
        let url = stub_service("200 OK", body).await;
        let (ledger, _dir) = ledger_against(url).await;

        let mut rx = ledger.entries();
        assert!(rx.borrow().is_empty());

        let stored = ledger
            .add_from_text("grilled chicken breast", "valid-key")
            .await
            .unwrap();
        assert!(stored.id > 0);

        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Grilled Chicken Breast");
    }

    #[tokio::test]
    async fn test_resolution_failure_leaves_store_untouched() {
        let url = stub_service(
            "401 Unauthorized",
            "{\"error\":\"invalid api key\"}".to_string(),
        )
        .await;
        let (ledger, _dir) = ledger_against(url).await;

        let err = ledger
            .add_from_text("grilled chicken breast", "bad-key")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Resolve(ResolveError::Api { status: 401, .. })
        ));
        assert!(ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_blank_description_makes_no_call_and_no_entry() {
        let (ledger, _dir) = ledger_against("http://127.0.0.1:1".to_string()).await;

        let err = ledger.add_from_text("", "key").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Resolve(ResolveError::BlankInput)
        ));
        assert!(ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (ledger, _dir) = ledger_against("http://127.0.0.1:1".to_string()).await;
        ledger.remove(42).await.unwrap();
        assert!(ledger.snapshot().is_empty());
    }
}
