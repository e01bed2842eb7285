//! REST session acquisition

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use vmview_upstream::{SessionToken, VcenterApi};

use crate::error::InventoryError;

/// Obtains a fresh session token for each aggregation pass
///
/// Tokens are never cached; every caller re-authenticates.
#[derive(Clone)]
pub struct SessionProvider {
    api: Arc<dyn VcenterApi>,
}

impl SessionProvider {
    pub fn new(api: Arc<dyn VcenterApi>) -> Self {
        Self { api }
    }

    /// Exchange the configured credentials for a token
    ///
    /// # Errors
    /// Returns [`InventoryError::UpstreamAuth`] carrying the upstream status,
    /// or 500 when the upstream could not be reached.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<SessionToken, InventoryError> {
        match self.api.create_session().await {
            Ok(token) => {
                debug!("session established");
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "authentication failed");
                Err(InventoryError::auth(&e))
            }
        }
    }
}
