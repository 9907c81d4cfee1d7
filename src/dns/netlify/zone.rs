use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{info, warn};

use super::types::{NewRecord, RecordData, ZoneData};
use super::{Record, PROVIDER};
use crate::dns::Session;
use crate::error::{Error, Result, Rollback};
use crate::pagination::Page;

/// A DNS zone fetched from Netlify.
#[derive(Debug, Clone)]
pub struct DnsZone {
    session: Arc<Session>,
    data: ZoneData,
}

impl DnsZone {
    pub(crate) fn new(session: Arc<Session>, data: ZoneData) -> Self {
        Self { session, data }
    }

    pub fn data(&self) -> &ZoneData {
        &self.data
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    fn records_path(&self) -> String {
        format!("dns_zones/{}/dns_records", self.data.id)
    }

    /// `GET dns_zones/:id/dns_records`
    pub async fn list_records(&self) -> Result<Page<Record>> {
        let records: Vec<RecordData> = self.session.get_json(&self.records_path(), &[]).await?;
        Ok(Page::unpaged(
            records.into_iter().map(|data| self.wrap(data)).collect(),
        ))
    }

    /// `GET dns_zones/:id/dns_records/:record_id`
    pub async fn get_record(&self, record_id: &str) -> Result<Record> {
        let data: RecordData = self
            .session
            .get_json(&format!("{}/{}", self.records_path(), record_id), &[])
            .await?;
        Ok(self.wrap(data))
    }

    /// `POST dns_zones/:id/dns_records`
    pub async fn create_record(&self, record: &NewRecord) -> Result<Record> {
        record.validate()?;

        let data: RecordData = self.session.post_json(&self.records_path(), record).await?;
        info!(
            zone = self.name(),
            id = data.id.as_str(),
            hostname = data.hostname.as_str(),
            "created netlify record"
        );
        Ok(self.wrap(data))
    }

    /// Replaces `record` with `replacement` by deleting it and creating the
    /// new one.
    ///
    /// If the create fails after the delete went through, the original
    /// record is created again and [`Error::ReplaceFailed`] reports both the
    /// create error and the rollback outcome. Nothing is deleted unless the
    /// original record passes the same checks as a new one. A crash between
    /// the two steps leaves the record deleted.
    pub async fn replace_record(&self, record: &Record, replacement: &NewRecord) -> Result<Record> {
        replacement.validate()?;
        let restore = record.data().to_new_record();
        restore.validate().map_err(|err| {
            Error::validation(format!(
                "record {} can't be re-created if the replacement fails, so it is left untouched: {}",
                record.id(),
                err
            ))
        })?;
        if record.data().dns_zone_id != self.data.id {
            return Err(Error::validation(format!(
                "record {} does not belong to zone {}",
                record.id(),
                self.data.id
            )));
        }

        if !record.delete().await? {
            return Err(Error::DeleteRejected {
                provider: PROVIDER,
                id: record.id().to_string(),
            });
        }

        match self.create_record(replacement).await {
            Ok(created) => Ok(created),
            Err(err) => {
                warn!(id = record.id(), error = %err, "create failed after delete, restoring record");
                let rollback = match self.create_record(&restore).await {
                    Ok(restored) => Rollback::Restored {
                        record_id: restored.id().to_string(),
                    },
                    Err(rollback_err) => Rollback::Failed(Box::new(rollback_err)),
                };
                Err(Error::ReplaceFailed {
                    source: Box::new(err),
                    rollback,
                })
            }
        }
    }

    /// Deletes the whole zone. `true` on HTTP 204.
    pub async fn delete(&self) -> Result<bool> {
        let response = self
            .session
            .delete(&format!("dns_zones/{}", self.data.id))
            .await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    fn wrap(&self, data: RecordData) -> Record {
        Record::new(self.session.clone(), data)
    }
}
