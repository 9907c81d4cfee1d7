use std::sync::Arc;

use reqwest::StatusCode;

use super::types::{PatchBody, RecordData, RecordPatch};
use crate::dns::Session;
use crate::error::Result;

/// A DNS record of a Vercel domain.
#[derive(Debug, Clone)]
pub struct Record {
    session: Arc<Session>,
    domain: String,
    data: RecordData,
}

impl Record {
    pub(crate) fn new(session: Arc<Session>, domain: String, data: RecordData) -> Self {
        Self {
            session,
            domain,
            data,
        }
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `PATCH v1/domains/records/:id`
    pub async fn update(&self, patch: &RecordPatch) -> Result<Record> {
        let body = PatchBody {
            name: patch.name.as_deref().unwrap_or(&self.data.name),
            value: patch.value.as_deref().unwrap_or(&self.data.value),
            ttl: patch.ttl.or(self.data.ttl),
        };

        let updated: RecordData = self
            .session
            .patch_json(&format!("v1/domains/records/{}", self.data.id), &body)
            .await?;
        Ok(Record::new(
            self.session.clone(),
            self.domain.clone(),
            updated,
        ))
    }

    /// `true` on HTTP 200, the only status Vercel documents for this call.
    pub async fn delete(&self) -> Result<bool> {
        let path = format!("v2/domains/{}/records/{}", self.domain, self.data.id);
        let response = self.session.delete(&path).await?;
        Ok(response.status() == StatusCode::OK)
    }
}
