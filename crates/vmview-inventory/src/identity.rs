//! Guest identity lookups

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use vmview_upstream::types::{FullName, RawGuestIdentity};
use vmview_upstream::{SessionToken, VcenterApi};

use crate::cache::TtlCache;
use crate::config::CachePolicy;
use crate::resolution::Resolution;

/// Guest OS identity reported by the guest tools
///
/// Every field is independently optional; an empty identity is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestIdentity {
    /// Long OS name (`Ubuntu Linux (64-bit)`)
    pub full_name: Option<String>,
    /// Short OS identifier (`UBUNTU_64`)
    pub name: Option<String>,
    pub ip_addresses: Vec<String>,
}

impl From<RawGuestIdentity> for GuestIdentity {
    fn from(raw: RawGuestIdentity) -> Self {
        let full_name = match raw.full_name {
            Some(FullName::Localized {
                default_message, ..
            }) => default_message,
            Some(FullName::Plain(name)) => Some(name),
            Some(FullName::Other(_)) | None => None,
        };
        Self {
            full_name,
            name: raw.name,
            ip_addresses: raw.ip_address.map(|ips| ips.into_vec()).unwrap_or_default(),
        }
    }
}

pub struct GuestIdentityResolver {
    api: Arc<dyn VcenterApi>,
    cache: TtlCache<String, Resolution<GuestIdentity>>,
}

impl GuestIdentityResolver {
    pub fn new(api: Arc<dyn VcenterApi>, policy: &CachePolicy) -> Self {
        Self {
            api,
            cache: TtlCache::new("guest_identity", policy.identity_capacity, policy.ttl()),
        }
    }

    /// Fetch a VM's guest identity, or an empty one on failure
    #[instrument(skip(self, session))]
    pub async fn resolve_identity(
        &self,
        vm_id: &str,
        session: &SessionToken,
    ) -> Resolution<GuestIdentity> {
        if let Some(cached) = self.cache.get(vm_id).await {
            debug!("identity cache hit");
            return cached;
        }

        let resolution = match self.api.vm_guest_identity(session, vm_id).await {
            Ok(raw) => Resolution::Resolved(GuestIdentity::from(raw)),
            Err(e) => {
                warn!(vm_id, error = %e, timeout = e.is_timeout(), "guest identity unavailable");
                Resolution::Fallback(GuestIdentity::default())
            }
        };

        self.cache.put(vm_id.to_string(), resolution.clone()).await;
        resolution
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(json: &str) -> GuestIdentity {
        GuestIdentity::from(serde_json::from_str::<RawGuestIdentity>(json).unwrap())
    }

    #[test]
    fn test_localized_full_name() {
        let id = identity(
            r#"{"full_name": {"default_message": "Ubuntu Linux (64-bit)"}, "name": "UBUNTU_64"}"#,
        );
        assert_eq!(id.full_name.as_deref(), Some("Ubuntu Linux (64-bit)"));
        assert_eq!(id.name.as_deref(), Some("UBUNTU_64"));
    }

    #[test]
    fn test_plain_full_name_and_ip_list() {
        let id = identity(r#"{"full_name": "Windows Server 2022", "ip_address": ["10.0.0.6"]}"#);
        assert_eq!(id.full_name.as_deref(), Some("Windows Server 2022"));
        assert_eq!(id.ip_addresses, vec!["10.0.0.6"]);
    }

    #[test]
    fn test_unusable_shapes_are_absent() {
        let id = identity(r#"{"full_name": 7, "ip_address": {"v4": "x"}}"#);
        assert_eq!(id, GuestIdentity::default());
    }
}
