use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::types::{Envelope, ListRecordsQuery, NewRecord, RecordData, ZoneData};
use super::{page_info, Record, RECORDS_PAGE_BOUNDS};
use crate::dns::Session;
use crate::error::Result;
use crate::pagination::Page;

/// A zone fetched from Cloudflare.
#[derive(Debug, Clone)]
pub struct Zone {
    session: Arc<Session>,
    data: ZoneData,
}

impl Zone {
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
        format!("zones/{}/dns_records", self.data.id)
    }

    /// `GET zones/:id/dns_records`
    pub async fn list_records(&self, query: &ListRecordsQuery) -> Result<Page<Record>> {
        query.page.validate(RECORDS_PAGE_BOUNDS)?;

        let envelope: Envelope<Vec<RecordData>> = self
            .session
            .get_json(&self.records_path(), &query.to_query())
            .await?;
        let info = envelope.result_info;
        let records = envelope.into_result()?;

        Ok(Page {
            info: page_info(info, records.len()),
            items: records.into_iter().map(|data| self.wrap(data)).collect(),
        })
    }

    /// `GET zones/:id/dns_records/:record_id`
    pub async fn get_record(&self, record_id: &str) -> Result<Record> {
        let envelope: Envelope<RecordData> = self
            .session
            .get_json(&format!("{}/{}", self.records_path(), record_id), &[])
            .await?;
        Ok(self.wrap(envelope.into_result()?))
    }

    /// `POST zones/:id/dns_records`
    pub async fn create_record(&self, record: &NewRecord) -> Result<Record> {
        record.validate()?;

        let body = NewRecord {
            ttl: Some(record.ttl.unwrap_or(1)),
            ..record.clone()
        };
        let envelope: Envelope<RecordData> =
            self.session.post_json(&self.records_path(), &body).await?;
        let created = self.wrap(envelope.into_result()?);

        info!(
            zone = self.name(),
            id = created.id(),
            record_type = %created.data().record_type,
            "created cloudflare record"
        );
        Ok(created)
    }

    /// Purges every cached file of the zone.
    pub async fn purge_cache(&self) -> Result<bool> {
        #[derive(Deserialize)]
        struct Purged {
            success: bool,
        }

        let purged: Purged = self
            .session
            .post_json(
                &format!("zones/{}/purge_cache", self.data.id),
                &json!({ "purge_everything": true }),
            )
            .await?;
        Ok(purged.success)
    }

    fn wrap(&self, data: RecordData) -> Record {
        Record::new(self.session.clone(), self.data.id.clone(), data)
    }
}
