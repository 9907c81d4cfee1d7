use std::sync::Arc;

use tracing::warn;

use super::types::{DeletedRecord, Envelope, RecordData, RecordPatch};
use crate::dns::Session;
use crate::error::Result;

/// A DNS record fetched from a Cloudflare zone.
#[derive(Debug, Clone)]
pub struct Record {
    session: Arc<Session>,
    zone_id: String,
    data: RecordData,
}

impl Record {
    pub(crate) fn new(session: Arc<Session>, zone_id: String, data: RecordData) -> Self {
        Self {
            session,
            zone_id,
            data,
        }
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    fn path(&self) -> String {
        format!("zones/{}/dns_records/{}", self.zone_id, self.data.id)
    }

    /// Sends only the fields set in `patch` and returns the record as the
    /// server now has it.
    pub async fn update(&self, patch: &RecordPatch) -> Result<Record> {
        patch.validate()?;

        let envelope: Envelope<RecordData> = self.session.patch_json(&self.path(), patch).await?;
        Ok(Record::new(
            self.session.clone(),
            self.zone_id.clone(),
            envelope.into_result()?,
        ))
    }

    /// Returns `true` only when Cloudflare echoes back this record's id.
    pub async fn delete(&self) -> Result<bool> {
        let response = self.session.delete(&self.path()).await?;
        let body = response.text().await?;
        let envelope: Envelope<DeletedRecord> = serde_json::from_str(&body)?;
        let deleted = envelope.into_result()?;

        if deleted.id != self.data.id {
            warn!(
                expected = self.data.id.as_str(),
                got = deleted.id.as_str(),
                "cloudflare confirmed deletion of a different record"
            );
            return Ok(false);
        }
        Ok(true)
    }
}
