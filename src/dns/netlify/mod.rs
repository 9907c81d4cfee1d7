//! Netlify DNS client.
//!
//! Netlify lists are not paginated and records can't be patched, so updates
//! go through [`DnsZone::replace_record`].

mod record;
mod types;
mod zone;

pub use record::Record;
pub use types::{NewRecord, RecordData, ZoneData};
pub use zone::DnsZone;

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;

use super::session::{auth_headers, present, ClientOptions, Session};
use super::{AddressChange, Credentials, DynamicDnsProvider, UpdateTarget};
use crate::error::{Error, Result};
use crate::pagination::Page;

pub(crate) const PROVIDER: &str = "netlify";
const NETLIFY_API_BASE: &str = "https://api.netlify.com/api/v1/";
const NETLIFY_USER_AGENT: &str = concat!("dynamic-dns/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct NetlifyClient {
    session: Arc<Session>,
}

impl NetlifyClient {
    pub fn new(credentials: &Credentials, options: &ClientOptions) -> Result<Self> {
        let token = present(credentials.token.as_deref())
            .ok_or_else(|| Error::authentication("netlify needs a token"))?;
        let headers = auth_headers([("authorization", format!("Bearer {}", token).as_str())])?;

        let mut options = options.clone();
        if options.user_agent.is_none() {
            options.user_agent = Some(NETLIFY_USER_AGENT.to_string());
        }

        let session = Session::new(
            PROVIDER,
            NETLIFY_API_BASE,
            headers,
            types::parse_error_envelope,
            &options,
        )?;
        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// `GET dns_zones`, optionally filtered by account slug.
    pub async fn list_zones(&self, account_slug: Option<&str>) -> Result<Page<DnsZone>> {
        let mut query = Vec::new();
        if let Some(slug) = account_slug {
            query.push(("account_slug", slug.to_string()));
        }

        let zones: Vec<ZoneData> = self.session.get_json("dns_zones", &query).await?;
        Ok(self.wrap_zones(zones))
    }

    /// `GET dns_zones/:id`
    pub async fn get_zone(&self, zone_id: &str) -> Result<DnsZone> {
        let data: ZoneData = self
            .session
            .get_json(&format!("dns_zones/{}", zone_id), &[])
            .await?;
        Ok(DnsZone::new(self.session.clone(), data))
    }

    /// `GET sites/:site_id/dns`
    pub async fn list_zones_for_site(&self, site_id: &str) -> Result<Page<DnsZone>> {
        let zones: Vec<ZoneData> = self
            .session
            .get_json(&format!("sites/{}/dns", site_id), &[])
            .await?;
        Ok(self.wrap_zones(zones))
    }

    fn wrap_zones(&self, zones: Vec<ZoneData>) -> Page<DnsZone> {
        Page::unpaged(
            zones
                .into_iter()
                .map(|data| DnsZone::new(self.session.clone(), data))
                .collect(),
        )
    }
}

#[async_trait]
impl DynamicDnsProvider for NetlifyClient {
    async fn update_address(&self, target: &UpdateTarget, ip: IpAddr) -> Result<AddressChange> {
        target.check(&ip)?;

        let zone = self.get_zone(&target.zone).await?;
        let record = zone.get_record(&target.record).await?;

        let mut replacement = NewRecord::new(
            target.record_type,
            record.data().hostname.clone(),
            ip.to_string(),
        );
        replacement.ttl = record.data().ttl;

        let created = zone.replace_record(&record, &replacement).await?;
        Ok(AddressChange {
            previous: Some(record.data().value.clone()),
            current: created.data().value.clone(),
            record_id: Some(created.id().to_string()),
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
    fn test_requires_token() {
        let err = NetlifyClient::new(&Credentials::default(), &ClientOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));

        let err = NetlifyClient::new(
            &Credentials::dyn_dns_password("secret"),
            &ClientOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
