//! Shared station credential.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::station::client::TelemetrySource;
use crate::station::StationError;

/// Access/refresh token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct StationCredential {
    pub access_token: String,
    pub refresh_token: String,
}

impl StationCredential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for StationCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StationCredential(<redacted>)")
    }
}

/// Holds the current credential.
///
/// Reads are lock-free. Refreshes are serialized, and a caller whose
/// credential was already replaced by someone else gets the replacement
/// instead of spending the refresh token a second time.
pub struct CredentialStore {
    current: ArcSwap<StationCredential>,
    refresh_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(credential: StationCredential) -> Self {
        Self {
            current: ArcSwap::from_pointee(credential),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<StationCredential> {
        self.current.load_full()
    }

    pub fn replace(&self, credential: StationCredential) {
        self.current.store(Arc::new(credential));
    }

    /// Exchange `stale` for a fresh credential via `source`.
    pub async fn refresh(
        &self,
        stale: &Arc<StationCredential>,
        source: &dyn TelemetrySource,
    ) -> Result<Arc<StationCredential>, StationError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.current.load_full();
        if !Arc::ptr_eq(&current, stale) {
            tracing::debug!("Credential already refreshed by another caller");
            metrics::record_credential_refresh("reused");
            return Ok(current);
        }

        match source.refresh(&stale.refresh_token).await {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                self.current.store(fresh.clone());
                metrics::record_credential_refresh("refreshed");
                tracing::info!("Station credential refreshed");
                Ok(fresh)
            }
            Err(e) => {
                metrics::record_credential_refresh("failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
