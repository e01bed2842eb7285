//! vim25 SOAP client for the object graph
//!
//! Only the handful of calls needed to answer "which host and cluster does
//! this VM run on" are implemented: `RetrieveServiceContent`, `Login`,
//! `CreateContainerView`, `RetrievePropertiesEx` (plus its continuation),
//! `DestroyView` and `Logout`. Each [`SoapClient::connect`] gets a private
//! cookie jar, so every connection is its own upstream session.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{Result, UpstreamError};
use crate::rest::Credentials;
use crate::traits::{ObjectGraph, ObjectGraphSession};
use crate::types::{EntityProperties, ManagedObjectRef, VmHostBinding};

const SOAP_ACTION: &str = "urn:vim25/8.0";

static OBJECTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<objects>(.*?)</objects>").expect("valid regex"));
static OBJ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<obj type="([^"]+)">([^<]*)</obj>"#).expect("valid regex"));
static PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<propSet>\s*<name>([^<]*)</name>\s*<val([^>]*)>([^<]*)</val>\s*</propSet>")
        .expect("valid regex")
});
static TYPE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)type="([^"]+)""#).expect("valid regex"));
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<token>([^<]*)</token>").expect("valid regex"));
static RETURNVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<returnval(?:\s+type="[^"]*")?[^>]*>([^<]*)</returnval>"#).expect("valid regex")
});
static FAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<faultstring>(.*?)</faultstring>").expect("valid regex"));

/// Entry points returned by `RetrieveServiceContent`
#[derive(Debug, Clone)]
struct ServiceContent {
    root_folder: ManagedObjectRef,
    property_collector: ManagedObjectRef,
    view_manager: ManagedObjectRef,
    session_manager: ManagedObjectRef,
}

/// Connection factory for the vim25 SOAP endpoint
#[derive(Debug, Clone)]
pub struct SoapClient {
    endpoint: Url,
    credentials: Credentials,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl SoapClient {
    /// Create a client for `https://<host>:<port>/sdk`
    ///
    /// `host` may carry a scheme (`https://vc.example.com`), which is stripped.
    ///
    /// # Errors
    /// Returns an error if the resulting endpoint URL is invalid.
    pub fn new(host: &str, port: u16, credentials: Credentials) -> Result<Self> {
        let bare = host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        let endpoint = Url::parse(&format!("https://{bare}:{port}/sdk"))?;
        Ok(Self {
            endpoint,
            credentials,
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        })
    }

    /// Set per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification (self-signed appliances)
    #[must_use]
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// SOAP endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectGraph for SoapClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn connect(&self) -> Result<Box<dyn ObjectGraphSession>> {
        let client = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout)
            .build()?;

        let transport = SoapTransport {
            client,
            endpoint: self.endpoint.clone(),
        };

        let body = transport
            .call(
                r#"<RetrieveServiceContent xmlns="urn:vim25"><_this type="ServiceInstance">ServiceInstance</_this></RetrieveServiceContent>"#,
            )
            .await?;
        let content = parse_service_content(&body)?;

        let login = format!(
            r#"<Login xmlns="urn:vim25">{}<userName>{}</userName><password>{}</password></Login>"#,
            this_ref(&content.session_manager),
            escape_xml(&self.credentials.user),
            escape_xml(&self.credentials.password),
        );
        transport.call(&login).await?;
        debug!("object-graph session established");

        Ok(Box::new(SoapSession { transport, content }))
    }
}

/// Raw SOAP envelope exchange over one cookie-carrying client
struct SoapTransport {
    client: Client,
    endpoint: Url,
}

impl SoapTransport {
    async fn call(&self, body: &str) -> Result<String> {
        let envelope = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
                r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
                r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
                "<soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"
            ),
            body
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if let Some(fault) = parse_fault(&text) {
            return Err(UpstreamError::Soap { fault });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

/// An authenticated SOAP session
struct SoapSession {
    transport: SoapTransport,
    content: ServiceContent,
}

impl SoapSession {
    /// `RetrievePropertiesEx` followed by `ContinueRetrievePropertiesEx` until
    /// the result set is exhausted
    async fn retrieve(&self, spec_set: &str) -> Result<Vec<ObjectContent>> {
        let request = format!(
            r#"<RetrievePropertiesEx xmlns="urn:vim25">{}<specSet>{}</specSet><options></options></RetrievePropertiesEx>"#,
            this_ref(&self.content.property_collector),
            spec_set,
        );
        let mut body = self.transport.call(&request).await?;
        let mut objects = parse_object_contents(&body);

        while let Some(token) = parse_token(&body) {
            let request = format!(
                r#"<ContinueRetrievePropertiesEx xmlns="urn:vim25">{}<token>{}</token></ContinueRetrievePropertiesEx>"#,
                this_ref(&self.content.property_collector),
                escape_xml(&token),
            );
            body = self.transport.call(&request).await?;
            objects.extend(parse_object_contents(&body));
        }

        Ok(objects)
    }

    async fn read_vm_hosts(&self, view: &ManagedObjectRef) -> Result<Vec<VmHostBinding>> {
        let spec_set = format!(
            concat!(
                "<propSet><type>VirtualMachine</type><pathSet>runtime.host</pathSet></propSet>",
                "<objectSet><obj type=\"{}\">{}</obj><skip>true</skip>",
                "<selectSet xsi:type=\"TraversalSpec\"><name>traverseView</name>",
                "<type>ContainerView</type><path>view</path><skip>false</skip></selectSet>",
                "</objectSet>"
            ),
            escape_xml(&view.kind),
            escape_xml(&view.value),
        );

        let objects = self.retrieve(&spec_set).await?;
        Ok(objects
            .into_iter()
            .filter(|o| o.obj.kind == "VirtualMachine")
            .map(|o| {
                let host = o.prop("runtime.host").and_then(PropValue::as_reference);
                VmHostBinding { vm: o.obj, host }
            })
            .collect())
    }
}

#[async_trait]
impl ObjectGraphSession for SoapSession {
    #[instrument(skip(self))]
    async fn vm_hosts(&self) -> Result<Vec<VmHostBinding>> {
        let request = format!(
            r#"<CreateContainerView xmlns="urn:vim25">{}<container type="{}">{}</container><type>VirtualMachine</type><recursive>true</recursive></CreateContainerView>"#,
            this_ref(&self.content.view_manager),
            escape_xml(&self.content.root_folder.kind),
            escape_xml(&self.content.root_folder.value),
        );
        let body = self.transport.call(&request).await?;
        let view = parse_returnval(&body)
            .map(|value| ManagedObjectRef::new("ContainerView", value))
            .ok_or_else(|| UpstreamError::InvalidResponse("no container view returned".into()))?;

        let result = self.read_vm_hosts(&view).await;

        // The view lives server-side until destroyed, whatever the read did
        let destroy = format!(
            r#"<DestroyView xmlns="urn:vim25">{}</DestroyView>"#,
            this_ref(&view)
        );
        if let Err(e) = self.transport.call(&destroy).await {
            warn!(error = %e, view = %view, "failed to destroy container view");
        }

        let bindings = result?;
        debug!(count = bindings.len(), "enumerated VM placements");
        Ok(bindings)
    }

    async fn entity_properties(&self, entity: &ManagedObjectRef) -> Result<EntityProperties> {
        let spec_set = format!(
            concat!(
                "<propSet><type>{kind}</type><pathSet>name</pathSet><pathSet>parent</pathSet></propSet>",
                "<objectSet><obj type=\"{kind}\">{value}</obj><skip>false</skip></objectSet>"
            ),
            kind = escape_xml(&entity.kind),
            value = escape_xml(&entity.value),
        );

        let objects = self.retrieve(&spec_set).await?;
        let Some(object) = objects.into_iter().find(|o| o.obj == *entity) else {
            return Ok(EntityProperties::default());
        };

        Ok(EntityProperties {
            name: object.prop("name").map(|val| val.text.clone()),
            parent: object.prop("parent").and_then(PropValue::as_reference),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        let request = format!(
            r#"<Logout xmlns="urn:vim25">{}</Logout>"#,
            this_ref(&self.content.session_manager)
        );
        self.transport.call(&request).await?;
        debug!("object-graph session closed");
        Ok(())
    }
}

// ============================================================================
// XML helpers
// ============================================================================

/// One `<objects>` entry of a property retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectContent {
    obj: ManagedObjectRef,
    props: Vec<(String, PropValue)>,
}

impl ObjectContent {
    fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A `<val>` element: its `type` attribute (for references) and text
#[derive(Debug, Clone, PartialEq, Eq)]
struct PropValue {
    kind: Option<String>,
    text: String,
}

impl PropValue {
    /// Interpret as a managed object reference; plain values carry no `type`
    fn as_reference(&self) -> Option<ManagedObjectRef> {
        self.kind
            .as_ref()
            .map(|kind| ManagedObjectRef::new(kind.clone(), self.text.clone()))
    }
}

fn this_ref(obj: &ManagedObjectRef) -> String {
    format!(
        r#"<_this type="{}">{}</_this>"#,
        escape_xml(&obj.kind),
        escape_xml(&obj.value)
    )
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_xml(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn parse_fault(body: &str) -> Option<String> {
    FAULT_RE
        .captures(body)
        .map(|c| unescape_xml(c[1].trim()))
}

fn parse_token(body: &str) -> Option<String> {
    TOKEN_RE
        .captures(body)
        .map(|c| unescape_xml(&c[1]))
        .filter(|t| !t.is_empty())
}

fn parse_returnval(body: &str) -> Option<String> {
    RETURNVAL_RE
        .captures(body)
        .map(|c| unescape_xml(c[1].trim()))
        .filter(|v| !v.is_empty())
}

/// Find `<tag type="Kind">value</tag>` anywhere in the body
fn parse_reference(body: &str, tag: &str) -> Option<ManagedObjectRef> {
    let pattern = format!(
        r#"<{tag}\s+type="([^"]+)"[^>]*>([^<]+)</{tag}>"#,
        tag = regex::escape(tag)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(body)
        .map(|c| ManagedObjectRef::new(unescape_xml(&c[1]), unescape_xml(c[2].trim())))
}

fn parse_service_content(body: &str) -> Result<ServiceContent> {
    let find = |tag: &str| {
        parse_reference(body, tag).ok_or_else(|| {
            UpstreamError::InvalidResponse(format!("service content missing {tag}"))
        })
    };

    Ok(ServiceContent {
        root_folder: find("rootFolder")?,
        property_collector: find("propertyCollector")?,
        view_manager: find("viewManager")?,
        session_manager: find("sessionManager")?,
    })
}

fn parse_object_contents(body: &str) -> Vec<ObjectContent> {
    OBJECTS_RE
        .captures_iter(body)
        .filter_map(|objects| {
            let inner = &objects[1];
            let obj = OBJ_RE.captures(inner).map(|c| {
                ManagedObjectRef::new(unescape_xml(&c[1]), unescape_xml(c[2].trim()))
            })?;
            let props = PROP_RE
                .captures_iter(inner)
                .map(|p| {
                    let kind = TYPE_ATTR_RE
                        .captures(&p[2])
                        .map(|t| unescape_xml(&t[1]));
                    (
                        unescape_xml(&p[1]),
                        PropValue {
                            kind,
                            text: unescape_xml(&p[3]),
                        },
                    )
                })
                .collect();
            Some(ObjectContent { obj, props })
        })
        .collect()
}
