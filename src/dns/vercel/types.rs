use serde::{Deserialize, Serialize};

use crate::dns::RecordType;
use crate::error::{ApiErrorDetail, Error, Result};
use crate::pagination::CursorInfo;

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorItem,
}

#[derive(Deserialize)]
struct ErrorItem {
    code: String,
    message: String,
}

/// `{error: {code, message}}`
pub(crate) fn parse_error_envelope(body: &str) -> Option<Vec<ApiErrorDetail>> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    Some(vec![ApiErrorDetail::new(
        parsed.error.code,
        parsed.error.message,
    )])
}

/// Team as returned by `GET v2/teams`. Tokens without full privileges only
/// see the limited form, so everything but `id` and `slug` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub slug: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub limited: bool,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainData {
    pub id: Option<String>,
    pub name: String,
    pub service_type: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub intended_nameservers: Vec<String>,
    pub created_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub bought_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Empty for the apex.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub value: String,
    pub ttl: Option<u32>,
    pub mx_priority: Option<u16>,
    pub priority: Option<u16>,
    pub creator: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl RecordData {
    /// A create request that reproduces this record.
    ///
    /// SRV records come back with their fields packed into `value`, so they
    /// are unpacked into `srv` here.
    pub fn to_new_record(&self) -> NewRecord {
        let srv = match self.record_type {
            RecordType::SRV => self.srv_from_value(),
            _ => None,
        };
        NewRecord {
            name: self.name.clone(),
            record_type: self.record_type,
            value: if srv.is_some() { None } else { Some(self.value.clone()) },
            ttl: self.ttl,
            mx_priority: self.mx_priority,
            srv,
        }
    }

    /// Reads `priority weight port target`, or `weight port target` when the
    /// priority is reported on its own.
    fn srv_from_value(&self) -> Option<SrvData> {
        let parts: Vec<&str> = self.value.split_whitespace().collect();
        let (priority, rest) = match (parts.as_slice(), self.priority) {
            ([priority, rest @ ..], _) if rest.len() == 3 => (priority.parse().ok()?, rest),
            (rest, Some(priority)) if rest.len() == 3 => (priority, rest),
            _ => return None,
        };
        Some(SrvData {
            priority,
            weight: rest[0].parse().ok()?,
            port: rest[1].parse().ok()?,
            target: rest[2].to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamsResponse {
    pub teams: Vec<Team>,
    pub pagination: CursorInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainsResponse {
    pub domains: Vec<DomainData>,
    pub pagination: CursorInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainResponse {
    pub domain: DomainData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordsResponse {
    pub records: Vec<RecordData>,
    pub pagination: CursorInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedRecord {
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Body of `POST v2/domains/:domain/records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Subdomain, empty for the apex.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx_priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srv: Option<SrvData>,
}

impl NewRecord {
    pub fn new(record_type: RecordType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: Some(value.into()),
            ttl: None,
            mx_priority: None,
            srv: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let has_value = self
            .value
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());

        match self.record_type {
            RecordType::SRV => {
                if self.srv.is_none() {
                    return Err(Error::validation(
                        "SRV records need `srv` with priority, weight, port and target",
                    ));
                }
            }
            RecordType::MX => {
                if !has_value || self.mx_priority.is_none() {
                    return Err(Error::validation(
                        "MX records need a `value` and the `mx_priority` property",
                    ));
                }
            }
            RecordType::A
            | RecordType::AAAA
            | RecordType::ALIAS
            | RecordType::CAA
            | RecordType::CNAME
            | RecordType::TXT
            | RecordType::NS => {
                if !has_value {
                    return Err(Error::validation(format!(
                        "{} records need a `value`",
                        self.record_type
                    )));
                }
            }
            other => {
                return Err(Error::validation(format!(
                    "vercel does not support {} records",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Body of `PATCH v1/domains/records/:id`. Unset fields keep the record's
/// current values.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub value: Option<String>,
    pub ttl: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PatchBody<'a> {
    pub name: &'a str,
    pub value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}
