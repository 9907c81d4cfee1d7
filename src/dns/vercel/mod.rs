//! Vercel domains and DNS records client.
//!
//! Lists use timestamp cursors. A client can be scoped to a team with
//! [`VercelClient::with_team`], which adds `teamId` to every request.

mod domain;
mod record;
mod types;

pub use domain::Domain;
pub use record::Record;
pub use types::{DomainData, NewRecord, RecordData, RecordPatch, SrvData, Team};

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;

use super::session::{auth_headers, present, ClientOptions, Session};
use super::{AddressChange, Credentials, DynamicDnsProvider, UpdateTarget};
use crate::error::{Error, Result};
use crate::pagination::{CursorRequest, Page, PageBounds, PageInfo};
use types::{DomainResponse, DomainsResponse, TeamsResponse};

pub(crate) const PROVIDER: &str = "vercel";
const VERCEL_API_BASE: &str = "https://api.vercel.com/";
const TEAM_QUERY_KEY: &str = "teamId";

pub const LIST_LIMIT_BOUNDS: PageBounds = PageBounds::new(1, 100);
/// Page size used when walking every page looking for one item.
pub(crate) const SCAN_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct VercelClient {
    session: Arc<Session>,
}

impl VercelClient {
    pub fn new(credentials: &Credentials, options: &ClientOptions) -> Result<Self> {
        let token = present(credentials.token.as_deref())
            .ok_or_else(|| Error::authentication("vercel needs a token"))?;
        let headers = auth_headers([("authorization", format!("Bearer {}", token).as_str())])?;

        let session = Session::new(
            PROVIDER,
            VERCEL_API_BASE,
            headers,
            types::parse_error_envelope,
            options,
        )?;
        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// A client acting inside `team_id`. `self` is left unscoped.
    pub fn with_team(&self, team_id: &str) -> VercelClient {
        VercelClient {
            session: Arc::new(self.session.with_query(TEAM_QUERY_KEY, team_id)),
        }
    }

    pub fn as_team(&self, team: &Team) -> VercelClient {
        self.with_team(&team.id)
    }

    pub fn team_id(&self) -> Option<&str> {
        self.session.query_value(TEAM_QUERY_KEY)
    }

    /// `GET v2/teams`
    pub async fn list_teams(&self, request: &CursorRequest) -> Result<Page<Team>> {
        request.validate(LIST_LIMIT_BOUNDS)?;

        let response: TeamsResponse = self
            .session
            .get_json("v2/teams", &request.query())
            .await?;
        Ok(Page {
            items: response.teams,
            info: PageInfo::Cursor(response.pagination),
        })
    }

    /// Walks the team pages until `team_id` shows up.
    pub async fn find_team(&self, team_id: &str) -> Result<Team> {
        let mut request = CursorRequest::with_limit(SCAN_LIMIT);
        loop {
            let page = self.list_teams(&request).await?;
            let next = next_request(&page.info, &request);
            if let Some(team) = page.items.into_iter().find(|t| t.id == team_id) {
                return Ok(team);
            }
            match next {
                Some(next) => request = next,
                None => return Err(Error::NotFound(format!("team {}", team_id))),
            }
        }
    }

    /// `GET v5/domains`
    pub async fn list_domains(&self, request: &CursorRequest) -> Result<Page<Domain>> {
        request.validate(LIST_LIMIT_BOUNDS)?;

        let response: DomainsResponse = self
            .session
            .get_json("v5/domains", &request.query())
            .await?;
        Ok(Page {
            items: response
                .domains
                .into_iter()
                .map(|data| Domain::new(self.session.clone(), data))
                .collect(),
            info: PageInfo::Cursor(response.pagination),
        })
    }

    /// `GET v5/domains/:name`
    pub async fn get_domain(&self, name: &str) -> Result<Domain> {
        let response: DomainResponse = self
            .session
            .get_json(&format!("v5/domains/{}", name), &[])
            .await?;
        Ok(Domain::new(self.session.clone(), response.domain))
    }
}

pub(crate) fn next_request(info: &PageInfo, current: &CursorRequest) -> Option<CursorRequest> {
    match info {
        PageInfo::Cursor(cursor) => cursor.next_request(current),
        _ => None,
    }
}

#[async_trait]
impl DynamicDnsProvider for VercelClient {
    async fn update_address(&self, target: &UpdateTarget, ip: IpAddr) -> Result<AddressChange> {
        target.check(&ip)?;

        let domain = self.get_domain(&target.zone).await?;
        let record = domain.find_record(&target.record).await?;
        if record.data().record_type != target.record_type {
            return Err(Error::validation(format!(
                "record {} is a {} record, not {}",
                record.id(),
                record.data().record_type,
                target.record_type
            )));
        }

        let updated = record
            .update(&RecordPatch {
                value: Some(ip.to_string()),
                ..RecordPatch::default()
            })
            .await?;

        Ok(AddressChange {
            previous: Some(record.data().value.clone()),
            current: updated.data().value.clone(),
            record_id: Some(updated.id().to_string()),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
