//! Cloudflare API v4 client.
//!
//! Authenticates with an API token or with the legacy email + global API key
//! pair. Zones and records are offset-paginated.

mod record;
mod types;
mod zone;

pub use record::Record;
pub use types::{
    Direction, ListRecordsQuery, ListZonesQuery, Match, NewRecord, RecordData, RecordPatch,
    ZoneAccount, ZoneData,
};
pub use zone::Zone;

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::session::{auth_headers, present, ClientOptions, Session};
use super::{AddressChange, Credentials, DynamicDnsProvider, UpdateTarget};
use crate::error::{Error, Result};
use crate::pagination::{Page, PageBounds, PageInfo};
use types::Envelope;

pub(crate) const PROVIDER: &str = "cloudflare";
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4/";

pub const ZONES_PAGE_BOUNDS: PageBounds = PageBounds::new(5, 50);
pub const RECORDS_PAGE_BOUNDS: PageBounds = PageBounds::new(5, 100);

/// How the client authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum CloudflareAuth {
    Token(String),
    ApiKey { email: String, key: String },
}

impl std::fmt::Debug for CloudflareAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<REDACTED>)"),
            Self::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("email", email)
                .field("key", &"<REDACTED>")
                .finish(),
        }
    }
}

impl CloudflareAuth {
    /// Prefers the token when both shapes are supplied.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        if let Some(token) = present(credentials.token.as_deref()) {
            return Ok(Self::Token(token.to_string()));
        }
        match (
            present(credentials.auth_email.as_deref()),
            present(credentials.auth_key.as_deref()),
        ) {
            (Some(email), Some(key)) => Ok(Self::ApiKey {
                email: email.to_string(),
                key: key.to_string(),
            }),
            _ => Err(Error::authentication(
                "cloudflare needs either a token or both auth email and auth key",
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudflareClient {
    session: Arc<Session>,
}

impl CloudflareClient {
    pub fn new(credentials: &Credentials, options: &ClientOptions) -> Result<Self> {
        let auth = CloudflareAuth::from_credentials(credentials)?;
        let headers = match &auth {
            CloudflareAuth::Token(token) => {
                auth_headers([("authorization", format!("Bearer {}", token).as_str())])?
            }
            CloudflareAuth::ApiKey { email, key } => {
                auth_headers([("x-auth-email", email.as_str()), ("x-auth-key", key.as_str())])?
            }
        };

        let session = Session::new(
            PROVIDER,
            CLOUDFLARE_API_BASE,
            headers,
            types::parse_error_envelope,
            options,
        )?;

        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// `GET zones`
    pub async fn list_zones(&self, query: &ListZonesQuery) -> Result<Page<Zone>> {
        query.page.validate(ZONES_PAGE_BOUNDS)?;

        let envelope: Envelope<Vec<ZoneData>> =
            self.session.get_json("zones", &query.to_query()).await?;
        let info = envelope.result_info;
        let zones = envelope.into_result()?;

        Ok(Page {
            info: page_info(info, zones.len()),
            items: zones
                .into_iter()
                .map(|data| Zone::new(self.session.clone(), data))
                .collect(),
        })
    }

    /// `GET zones/:id`
    pub async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        let envelope: Envelope<ZoneData> = self
            .session
            .get_json(&format!("zones/{}", zone_id), &[])
            .await?;
        Ok(Zone::new(self.session.clone(), envelope.into_result()?))
    }
}

pub(crate) fn page_info(info: Option<crate::pagination::OffsetInfo>, len: usize) -> PageInfo {
    match info {
        Some(info) => PageInfo::Offset(info),
        None => PageInfo::Unpaged { count: len as u32 },
    }
}

#[async_trait]
impl DynamicDnsProvider for CloudflareClient {
    async fn update_address(&self, target: &UpdateTarget, ip: IpAddr) -> Result<AddressChange> {
        target.check(&ip)?;

        let zone = self.get_zone(&target.zone).await?;
        let record = zone.get_record(&target.record).await?;
        let previous = record.data().content.clone();

        let updated = record
            .update(&RecordPatch {
                record_type: Some(target.record_type),
                content: Some(ip.to_string()),
                ..RecordPatch::default()
            })
            .await?;

        info!(
            zone = zone.name(),
            record = updated.data().name.as_str(),
            "updated cloudflare record"
        );

        Ok(AddressChange {
            previous: Some(previous),
            current: updated.data().content.clone(),
            record_id: Some(updated.id().to_string()),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_prefers_token() {
        let credentials = Credentials {
            token: Some("tok".to_string()),
            auth_email: Some("me@example.com".to_string()),
            auth_key: Some("key".to_string()),
            dyn_dns_password: None,
        };

        assert_eq!(
            CloudflareAuth::from_credentials(&credentials).unwrap(),
            CloudflareAuth::Token("tok".to_string())
        );
    }

    #[test]
    fn test_auth_key_pair() {
        let credentials = Credentials::api_key("me@example.com", "key");
        assert!(matches!(
            CloudflareAuth::from_credentials(&credentials).unwrap(),
            CloudflareAuth::ApiKey { .. }
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let half = Credentials {
            auth_email: Some("me@example.com".to_string()),
            ..Credentials::default()
        };

        for credentials in [Credentials::default(), half, Credentials::token("  ")] {
            let err = CloudflareClient::new(&credentials, &ClientOptions::default()).unwrap_err();
            assert!(matches!(err, Error::Authentication(_)));
        }
    }
}
