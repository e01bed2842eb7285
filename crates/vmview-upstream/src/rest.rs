//! REST client for the management API

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use vmview_api::PowerAction;

use crate::error::{Result, UpstreamError};
use crate::traits::VcenterApi;
use crate::types::{
    RawGuestIdentity, RawHardware, RawNetworkInfo, RawNetworkItem, RawNic, RawVmInfo,
    RawVmListItem, SessionToken, ValueEnvelope,
};

/// Header carrying the session token
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// Username/password pair for the upstream
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Per-call timeouts
///
/// `short` bounds per-VM and per-network point lookups; `long` bounds the
/// listings and the detail summary.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub short: Duration,
    pub long: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5),
            long: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the REST management API
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
    timeouts: Timeouts,
}

impl RestClient {
    /// Create a new REST client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        Self::with_client(base_url, credentials, Client::new())
    }

    /// Create a new REST client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or cannot carry a path.
    pub fn with_client(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        client: Client,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Url(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self {
            client,
            base_url,
            credentials,
            timeouts: Timeouts::default(),
        })
    }

    /// Set per-call timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build a full URL from path segments
    ///
    /// Segments are percent-encoded, so ids can be passed through verbatim.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and unwrap the `{"value": ...}` envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let envelope: ValueEnvelope<T> = response.json().await?;
        Ok(envelope.value)
    }

    /// Perform an authenticated GET request
    async fn get<T: DeserializeOwned>(
        &self,
        session: &SessionToken,
        segments: &[&str],
        timeout: Duration,
    ) -> Result<T> {
        let url = self.url(segments);
        debug!(%url, "GET");
        let request = self
            .client
            .get(url)
            .header(SESSION_HEADER, session.as_str())
            .timeout(timeout);
        self.send(request).await
    }
}

#[async_trait]
impl VcenterApi for RestClient {
    #[instrument(skip(self), fields(user = %self.credentials.user))]
    async fn create_session(&self) -> Result<SessionToken> {
        let url = self.url(&["rest", "com", "vmware", "cis", "session"]);
        let request = self
            .client
            .post(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .timeout(self.timeouts.short);
        let token: String = self.send(request).await?;
        Ok(SessionToken::new(token))
    }

    async fn list_vms(&self, session: &SessionToken) -> Result<Vec<RawVmListItem>> {
        self.get(session, &["rest", "vcenter", "vm"], self.timeouts.long)
            .await
    }

    async fn vm_info(&self, session: &SessionToken, vm_id: &str) -> Result<RawVmInfo> {
        self.get(session, &["rest", "vcenter", "vm", vm_id], self.timeouts.long)
            .await
    }

    async fn vm_hardware(&self, session: &SessionToken, vm_id: &str) -> Result<RawHardware> {
        self.get(
            session,
            &["rest", "vcenter", "vm", vm_id, "hardware"],
            self.timeouts.short,
        )
        .await
    }

    async fn vm_ethernet(&self, session: &SessionToken, vm_id: &str) -> Result<Vec<RawNic>> {
        self.get(
            session,
            &["rest", "vcenter", "vm", vm_id, "hardware", "ethernet"],
            self.timeouts.short,
        )
        .await
    }

    async fn vm_guest_identity(
        &self,
        session: &SessionToken,
        vm_id: &str,
    ) -> Result<RawGuestIdentity> {
        self.get(
            session,
            &["rest", "vcenter", "vm", vm_id, "guest", "identity"],
            self.timeouts.short,
        )
        .await
    }

    #[instrument(skip(self, session))]
    async fn vm_power(
        &self,
        session: &SessionToken,
        vm_id: &str,
        action: PowerAction,
    ) -> Result<()> {
        let url = self.url(&["rest", "vcenter", "vm", vm_id, "power", action.as_str()]);
        let response = self
            .client
            .post(url)
            .header(SESSION_HEADER, session.as_str())
            .timeout(self.timeouts.short)
            .send()
            .await?;

        // Power calls answer with an empty body on success
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        Ok(())
    }

    async fn list_networks(&self, session: &SessionToken) -> Result<Vec<RawNetworkItem>> {
        self.get(session, &["rest", "vcenter", "network"], self.timeouts.long)
            .await
    }

    async fn network_info(
        &self,
        session: &SessionToken,
        network_id: &str,
    ) -> Result<RawNetworkInfo> {
        self.get(
            session,
            &["rest", "vcenter", "network", network_id],
            self.timeouts.short,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RestClient {
        RestClient::new("https://vcenter.example.com", Credentials::new("u", "p")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = RestClient::new("https://vcenter.example.com", Credentials::new("u", "p"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = RestClient::new("not a url", Credentials::new("u", "p"));
        assert!(client.is_err());

        let client = RestClient::new("mailto:ops@example.com", Credentials::new("u", "p"));
        assert!(client.is_err());
    }

    #[test]
    fn test_url_building() {
        let url = client().url(&["rest", "vcenter", "vm", "vm-42", "hardware"]);
        assert_eq!(
            url.as_str(),
            "https://vcenter.example.com/rest/vcenter/vm/vm-42/hardware"
        );
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let client =
            RestClient::new("https://proxy.example.com/vc/", Credentials::new("u", "p")).unwrap();
        let url = client.url(&["rest", "vcenter", "network"]);
        assert_eq!(url.as_str(), "https://proxy.example.com/vc/rest/vcenter/network");
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let url = client().url(&["rest", "vcenter", "network", "a/b c"]);
        assert_eq!(
            url.as_str(),
            "https://vcenter.example.com/rest/vcenter/network/a%2Fb%20c"
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("svc", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("svc"));
        assert!(!debug.contains("hunter2"));
    }
}
