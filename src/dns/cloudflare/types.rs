use serde::{Deserialize, Serialize};

use crate::dns::RecordType;
use crate::error::{ApiError, ApiErrorDetail, Error, Result, UnrecognizedError};
use crate::pagination::{OffsetInfo, OffsetRequest};

use super::PROVIDER;

/// Standard Cloudflare response wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    pub result: Option<T>,
    pub result_info: Option<OffsetInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorItem {
    pub code: serde_json::Value,
    pub message: String,
}

impl ErrorItem {
    fn detail(&self) -> ApiErrorDetail {
        let code = match &self.code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        ApiErrorDetail::new(code, self.message.clone())
    }
}

impl<T> Envelope<T> {
    /// A 2xx answer can still carry `success: false`.
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(Error::Api(ApiError {
                provider: PROVIDER,
                status: 200,
                errors: self.errors.iter().map(ErrorItem::detail).collect(),
            }));
        }
        self.result.ok_or_else(|| {
            Error::Unrecognized(UnrecognizedError::Status {
                status: 200,
                body: "response is missing the `result` field".to_string(),
            })
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    success: bool,
    errors: Vec<ErrorItem>,
}

/// `{success: false, errors: [{code, message}]}`
pub(crate) fn parse_error_envelope(body: &str) -> Option<Vec<ApiErrorDetail>> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    Some(parsed.errors.iter().map(ErrorItem::detail).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Zone as returned by `GET zones` and `GET zones/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub paused: bool,
    /// `full` or `partial`.
    #[serde(rename = "type", default)]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub name_servers: Vec<String>,
    #[serde(default)]
    pub original_name_servers: Option<Vec<String>>,
    #[serde(default)]
    pub original_registrar: Option<String>,
    #[serde(default)]
    pub account: Option<ZoneAccount>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_on: Option<String>,
    pub modified_on: Option<String>,
    pub activated_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    /// Absent for types that only carry structured `data`.
    #[serde(default)]
    pub content: String,
    /// `1` means automatic.
    pub ttl: u32,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub priority: Option<u16>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
    pub created_on: Option<String>,
    pub modified_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeletedRecord {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    All,
    Any,
}

impl Match {
    fn as_str(&self) -> &'static str {
        match self {
            Match::All => "all",
            Match::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Filters for `GET zones`. Zones pages hold 5 to 50 items.
#[derive(Debug, Clone, Default)]
pub struct ListZonesQuery {
    pub page: OffsetRequest,
    pub name: Option<String>,
    pub status: Option<String>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub match_requirements: Option<Match>,
    /// `name`, `status`, `account.id` or `account.name`.
    pub order: Option<String>,
    pub direction: Option<Direction>,
}

impl ListZonesQuery {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = self.page.query().to_vec();
        query.push((
            "match",
            self.match_requirements.unwrap_or(Match::All).as_str().to_string(),
        ));
        push_opt(&mut query, "name", &self.name);
        push_opt(&mut query, "status", &self.status);
        push_opt(&mut query, "account.id", &self.account_id);
        push_opt(&mut query, "account.name", &self.account_name);
        push_opt(&mut query, "order", &self.order);
        if let Some(direction) = self.direction {
            query.push(("direction", direction.as_str().to_string()));
        }
        query
    }
}

/// Filters for `GET zones/:id/dns_records`. Record pages hold 5 to 100 items.
#[derive(Debug, Clone, Default)]
pub struct ListRecordsQuery {
    pub page: OffsetRequest,
    pub name: Option<String>,
    pub content: Option<String>,
    pub record_type: Option<RecordType>,
    pub proxied: Option<bool>,
    pub match_requirements: Option<Match>,
    /// `type`, `name`, `content`, `ttl` or `proxied`.
    pub order: Option<String>,
    pub direction: Option<Direction>,
}

impl ListRecordsQuery {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = self.page.query().to_vec();
        query.push((
            "match",
            self.match_requirements.unwrap_or(Match::All).as_str().to_string(),
        ));
        push_opt(&mut query, "name", &self.name);
        push_opt(&mut query, "content", &self.content);
        if let Some(record_type) = self.record_type {
            query.push(("type", record_type.to_string()));
        }
        if let Some(proxied) = self.proxied {
            query.push(("proxied", proxied.to_string()));
        }
        push_opt(&mut query, "order", &self.order);
        if let Some(direction) = self.direction {
            query.push(("direction", direction.as_str().to_string()));
        }
        query
    }
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(value) = value {
        query.push((key, value.clone()));
    }
}

/// Body of `POST zones/:id/dns_records`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    /// Defaults to `1` (automatic).
    pub ttl: Option<u32>,
    /// Required for MX, SRV and URI records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

impl NewRecord {
    pub fn new(record_type: RecordType, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: None,
            priority: None,
            proxied: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.content.trim().is_empty() {
            return Err(Error::validation(
                "`type`, `name` and `content` are required to create a record",
            ));
        }
        if self.record_type == RecordType::Other {
            return Err(Error::validation(
                "record type is not one this client can send to cloudflare",
            ));
        }
        if matches!(
            self.record_type,
            RecordType::MX | RecordType::SRV | RecordType::URI
        ) && self.priority.is_none()
        {
            return Err(Error::validation(
                "`priority` is required for MX, SRV and URI records",
            ));
        }
        if let Some(ttl) = self.ttl {
            validate_ttl(ttl)?;
        }
        Ok(())
    }
}

/// Body of `PATCH zones/:zone_id/dns_records/:id`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

impl RecordPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(ttl) = self.ttl {
            validate_ttl(ttl)?;
        }
        Ok(())
    }
}

fn validate_ttl(ttl: u32) -> Result<()> {
    if ttl != 1 && ttl < 60 {
        return Err(Error::validation(
            "TTL can't be under 60s, use 1 for automatic",
        ));
    }
    if ttl > 86400 {
        return Err(Error::validation("TTL can't be more than 86400s"));
    }
    Ok(())
}
