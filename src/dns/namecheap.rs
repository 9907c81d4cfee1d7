//! Namecheap dynamic DNS client.
//!
//! Authenticates with the per-domain dynamic DNS password, sent as a query
//! parameter. Answers are XML with an `<ErrCount>` element, and errors come
//! back with HTTP 200.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::info;

use super::session::{present, ClientOptions, Session};
use super::{AddressChange, Credentials, DynamicDnsProvider, RecordType, UpdateTarget};
use crate::error::{ApiError, ApiErrorDetail, Error, Result, UnrecognizedError};

const PROVIDER: &str = "namecheap";
const NAMECHEAP_DDNS_BASE: &str = "https://dynamicdns.park-your-domain.com/";

/// One host to point at an address.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Domain as written in the dashboard, e.g. `example.com`.
    pub domain: String,
    /// Host to update, e.g. `www`, or `@` for the root.
    pub host: String,
    /// Namecheap uses the caller's address when unset.
    pub ip: Option<IpAddr>,
}

#[derive(Debug, Clone)]
pub struct NamecheapClient {
    session: Arc<Session>,
}

impl NamecheapClient {
    pub fn new(credentials: &Credentials, options: &ClientOptions) -> Result<Self> {
        let password = present(credentials.dyn_dns_password.as_deref())
            .ok_or_else(|| Error::authentication("namecheap needs a dynamic DNS password"))?;

        let session = Session::new(
            PROVIDER,
            NAMECHEAP_DDNS_BASE,
            HeaderMap::new(),
            parse_error_envelope,
            options,
        )?
        .with_query("password", password);

        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// `GET update?host=..&domain=..&ip=..`
    pub async fn update_record(&self, request: &UpdateRequest) -> Result<()> {
        if request.domain.trim().is_empty() || request.host.trim().is_empty() {
            return Err(Error::validation("`domain` and `host` are required"));
        }

        let mut query = vec![
            ("host", request.host.clone()),
            ("domain", request.domain.clone()),
        ];
        if let Some(ip) = request.ip {
            query.push(("ip", ip.to_string()));
        }

        let response = self
            .session
            .send(self.session.request(Method::GET, "update").query(&query))
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let parsed = match parse_interface_response(&body)? {
            Some(parsed) => parsed,
            None => return Err(UnrecognizedError::Status { status, body }.into()),
        };
        if parsed.err_count > 0 {
            return Err(ApiError {
                provider: PROVIDER,
                status,
                errors: parsed.details(),
            }
            .into());
        }

        info!(domain = request.domain.as_str(), host = request.host.as_str(), "updated namecheap host");
        Ok(())
    }
}

#[async_trait]
impl DynamicDnsProvider for NamecheapClient {
    async fn update_address(&self, target: &UpdateTarget, ip: IpAddr) -> Result<AddressChange> {
        target.check(&ip)?;
        if target.record_type != RecordType::A {
            return Err(Error::validation(
                "namecheap dynamic DNS only updates A records",
            ));
        }

        self.update_record(&UpdateRequest {
            domain: target.zone.clone(),
            host: target.record.clone(),
            ip: Some(ip),
        })
        .await?;

        Ok(AddressChange {
            previous: None,
            current: ip.to_string(),
            record_id: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// The parts of `<interface-response>` that matter for error reporting.
#[derive(Debug, Default, PartialEq, Eq)]
struct InterfaceResponse {
    err_count: u32,
    /// `(element name, text)` of each child of `<errors>`, in order.
    errors: Vec<(String, String)>,
    /// `<responses><response><ResponseNumber>` values, in order.
    response_numbers: Vec<String>,
}

impl InterfaceResponse {
    /// Pairs each error with its response number when there is one, and
    /// falls back to the element name (`Err1`, `Err2`, ...).
    fn details(&self) -> Vec<ApiErrorDetail> {
        if self.errors.is_empty() {
            return vec![ApiErrorDetail::new(
                "ErrCount",
                format!("{} error(s) reported without details", self.err_count),
            )];
        }
        self.errors
            .iter()
            .enumerate()
            .map(|(i, (name, text))| {
                let code = self.response_numbers.get(i).unwrap_or(name);
                ApiErrorDetail::new(code, text.clone())
            })
            .collect()
    }
}

/// `None` when the document has no numeric `<ErrCount>`.
fn parse_interface_response(body: &str) -> Result<Option<InterfaceResponse>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut parsed = InterfaceResponse::default();
    let mut saw_count = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                stack.push(String::from_utf8_lossy(element.name().as_ref()).into_owned());
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) => {
                let text = text.unescape()?.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                let (parent, current) = match stack.as_slice() {
                    [.., parent, current] => (parent.as_str(), current.as_str()),
                    _ => continue,
                };
                match (parent, current) {
                    (_, "ErrCount") => match text.parse() {
                        Ok(count) => {
                            parsed.err_count = count;
                            saw_count = true;
                        }
                        Err(_) => return Ok(None),
                    },
                    ("errors", name) => parsed.errors.push((name.to_string(), text)),
                    ("response", "ResponseNumber") => parsed.response_numbers.push(text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(saw_count.then_some(parsed))
}

fn parse_error_envelope(body: &str) -> Option<Vec<ApiErrorDetail>> {
    parse_interface_response(body)
        .ok()
        .flatten()
        .filter(|parsed| parsed.err_count > 0)
        .map(|parsed| parsed.details())
}
