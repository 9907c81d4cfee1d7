use std::sync::Arc;

use tracing::{info, warn};

use super::types::{CreatedRecord, DomainData, NewRecord, RecordData, RecordsResponse};
use super::{next_request, Record, LIST_LIMIT_BOUNDS, PROVIDER, SCAN_LIMIT};
use crate::dns::Session;
use crate::error::{Error, Result, Rollback};
use crate::pagination::{CursorRequest, Page, PageInfo};

/// A domain fetched from Vercel.
#[derive(Debug, Clone)]
pub struct Domain {
    session: Arc<Session>,
    data: DomainData,
}

impl Domain {
    pub(crate) fn new(session: Arc<Session>, data: DomainData) -> Self {
        Self { session, data }
    }

    pub fn data(&self) -> &DomainData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// `GET v4/domains/:name/records`
    pub async fn list_records(&self, request: &CursorRequest) -> Result<Page<Record>> {
        request.validate(LIST_LIMIT_BOUNDS)?;

        let response: RecordsResponse = self
            .session
            .get_json(
                &format!("v4/domains/{}/records", self.data.name),
                &request.query(),
            )
            .await?;
        Ok(Page {
            items: response
                .records
                .into_iter()
                .map(|data| self.wrap(data))
                .collect(),
            info: PageInfo::Cursor(response.pagination),
        })
    }

    /// Vercel has no single-record endpoint: walks the record pages until
    /// `record_id` shows up, one request per page.
    pub async fn find_record(&self, record_id: &str) -> Result<Record> {
        let mut request = CursorRequest::with_limit(SCAN_LIMIT);
        loop {
            let page = self.list_records(&request).await?;
            let next = next_request(&page.info, &request);
            if let Some(record) = page.items.into_iter().find(|r| r.id() == record_id) {
                return Ok(record);
            }
            match next {
                Some(next) => request = next,
                None => {
                    return Err(Error::NotFound(format!(
                        "record {} in domain {}",
                        record_id, self.data.name
                    )))
                }
            }
        }
    }

    /// `POST v2/domains/:name/records`
    ///
    /// Vercel only answers with the new id, so the returned record carries
    /// the submitted fields plus that id.
    pub async fn create_record(&self, record: &NewRecord) -> Result<Record> {
        record.validate()?;

        let created: CreatedRecord = self
            .session
            .post_json(&format!("v2/domains/{}/records", self.data.name), record)
            .await?;
        info!(
            domain = self.name(),
            id = created.uid.as_str(),
            "created vercel record"
        );

        Ok(self.wrap(RecordData {
            id: created.uid,
            slug: None,
            name: record.name.clone(),
            record_type: record.record_type,
            value: record.value.clone().unwrap_or_default(),
            ttl: record.ttl,
            mx_priority: record.mx_priority,
            priority: record.srv.as_ref().map(|srv| srv.priority),
            creator: None,
            created_at: None,
            updated_at: None,
        }))
    }

    /// Replaces `record` by deleting it and creating `replacement`, for
    /// when a PATCH is not an option.
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
        if record.domain() != self.data.name {
            return Err(Error::validation(format!(
                "record {} does not belong to domain {}",
                record.id(),
                self.data.name
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

    fn wrap(&self, data: RecordData) -> Record {
        Record::new(self.session.clone(), self.data.name.clone(), data)
    }
}
