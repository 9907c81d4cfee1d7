use std::sync::Arc;

use reqwest::StatusCode;

use super::types::RecordData;
use crate::dns::Session;
use crate::error::Result;

/// A DNS record fetched from a Netlify zone.
#[derive(Debug, Clone)]
pub struct Record {
    session: Arc<Session>,
    data: RecordData,
}

impl Record {
    pub(crate) fn new(session: Arc<Session>, data: RecordData) -> Self {
        Self { session, data }
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// `true` on HTTP 204, the only status Netlify documents for this call.
    pub async fn delete(&self) -> Result<bool> {
        let path = format!(
            "dns_zones/{}/dns_records/{}",
            self.data.dns_zone_id, self.data.id
        );
        let response = self.session.delete(&path).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }
}
