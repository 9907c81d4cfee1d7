use serde::{Deserialize, Serialize};

use crate::dns::RecordType;
use crate::error::{ApiErrorDetail, Error, Result};

#[derive(Deserialize)]
struct ErrorBody {
    code: serde_json::Value,
    message: String,
}

/// `{code, message}`
pub(crate) fn parse_error_envelope(body: &str) -> Option<Vec<ApiErrorDetail>> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let code = match parsed.code {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    Some(vec![ApiErrorDetail::new(code, parsed.message)])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub supported_record_types: Vec<String>,
    pub user_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub records: Vec<RecordData>,
    #[serde(default)]
    pub dns_servers: Vec<String>,
    pub account_id: Option<String>,
    pub site_id: Option<String>,
    pub account_slug: Option<String>,
    pub account_name: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub ipv6_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    pub id: String,
    pub hostname: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
    pub ttl: Option<u32>,
    pub priority: Option<u16>,
    pub dns_zone_id: String,
    pub site_id: Option<String>,
    pub flag: Option<u8>,
    pub tag: Option<String>,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub weight: Option<u16>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

impl RecordData {
    /// A create request that reproduces this record.
    pub fn to_new_record(&self) -> NewRecord {
        NewRecord {
            record_type: self.record_type,
            hostname: self.hostname.clone(),
            value: self.value.clone(),
            ttl: self.ttl,
            priority: self.priority,
            weight: self.weight,
            port: self.port,
            protocol: self.protocol.clone(),
            service: self.service.clone(),
            flag: self.flag,
            tag: self.tag.clone(),
        }
    }
}

/// Body of `POST dns_zones/:zone_id/dns_records`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub hostname: String,
    pub value: String,
    /// Netlify defaults to 3600.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// MX and SRV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// CAA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl NewRecord {
    pub fn new(record_type: RecordType, hostname: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_type,
            hostname: hostname.into(),
            value: value.into(),
            ttl: None,
            priority: None,
            weight: None,
            port: None,
            protocol: None,
            service: None,
            flag: None,
            tag: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() || self.value.trim().is_empty() {
            return Err(Error::validation(
                "`type`, `hostname` and `value` are required to create a record",
            ));
        }

        match self.record_type {
            RecordType::Other => Err(Error::validation(
                "record type is not one this client can send to netlify",
            )),
            RecordType::MX if self.priority.is_none() => Err(Error::validation(
                "MX records need the `priority` property",
            )),
            RecordType::CAA if self.flag.is_none() || self.tag.is_none() => Err(
                Error::validation("CAA records need the `flag` and `tag` properties"),
            ),
            RecordType::SRV
                if self.port.is_none()
                    || self.priority.is_none()
                    || self.protocol.is_none()
                    || self.service.is_none()
                    || self.weight.is_none() =>
            {
                Err(Error::validation(
                    "SRV records need the `port`, `priority`, `protocol`, `service` and `weight` properties",
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_envelope() {
        let errors = parse_error_envelope(r#"{"code":404,"message":"Not Found"}"#).unwrap();
        assert_eq!(errors, vec![ApiErrorDetail::new("404", "Not Found")]);

        assert!(parse_error_envelope("Not Found").is_none());
    }

    #[test]
    fn test_unknown_type_is_not_recreated() {
        let data: RecordData = serde_json::from_value(serde_json::json!({
            "id": "rec_ptr",
            "hostname": "x.example.com",
            "type": "PTR",
            "value": "host.example.com",
            "ttl": 3600,
            "dns_zone_id": "zone1"
        }))
        .unwrap();

        assert_eq!(data.record_type, RecordType::Other);
        assert!(matches!(
            data.to_new_record().validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_mx_requires_priority() {
        let record = NewRecord::new(RecordType::MX, "example.com", "mx.example.com");
        assert!(matches!(record.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_caa_requires_flag_and_tag() {
        let mut record = NewRecord::new(RecordType::CAA, "example.com", "letsencrypt.org");
        assert!(matches!(record.validate(), Err(Error::Validation(_))));

        record.flag = Some(0);
        assert!(matches!(record.validate(), Err(Error::Validation(_))));

        record.tag = Some("issue".to_string());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_srv_requires_all_fields() {
        let mut record = NewRecord::new(RecordType::SRV, "_sip._tcp.example.com", "sip.example.com");
        record.port = Some(5060);
        record.priority = Some(10);
        record.weight = Some(5);
        record.protocol = Some("_tcp".to_string());
        assert!(record.validate().is_err());

        record.service = Some("_sip".to_string());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_new_record_skips_unset_fields() {
        let record = NewRecord::new(RecordType::A, "home.example.com", "203.0.113.10");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "A",
                "hostname": "home.example.com",
                "value": "203.0.113.10"
            })
        );
    }
}
