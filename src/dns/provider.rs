use std::fmt;
use std::net::IpAddr;

use async_trait::async_trait;

use super::RecordType;
use crate::error::{Error, Result};

/// Credentials as supplied on the command line. Each provider picks the
/// variant it documents and rejects the rest.
#[derive(Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
    pub auth_email: Option<String>,
    pub auth_key: Option<String>,
    pub dyn_dns_password: Option<String>,
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn api_key(auth_email: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            auth_email: Some(auth_email.into()),
            auth_key: Some(auth_key.into()),
            ..Self::default()
        }
    }

    pub fn dyn_dns_password(password: impl Into<String>) -> Self {
        Self {
            dyn_dns_password: Some(password.into()),
            ..Self::default()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<REDACTED>");
        f.debug_struct("Credentials")
            .field("token", &redact(&self.token))
            .field("auth_email", &self.auth_email)
            .field("auth_key", &redact(&self.auth_key))
            .field("dyn_dns_password", &redact(&self.dyn_dns_password))
            .finish()
    }
}

/// Which record to point at a new address.
///
/// `zone` and `record` are provider-specific: a zone id and record id for
/// Cloudflare and Netlify, a domain name and record id for Vercel, a domain
/// name and host for Namecheap.
#[derive(Debug, Clone)]
pub struct UpdateTarget {
    pub zone: String,
    pub record: String,
    pub record_type: RecordType,
}

impl UpdateTarget {
    pub fn new(zone: impl Into<String>, record: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            zone: zone.into(),
            record: record.into(),
            record_type,
        }
    }

    pub(crate) fn check(&self, ip: &IpAddr) -> Result<()> {
        if !self.record_type.is_address() {
            return Err(Error::validation(format!(
                "only A and AAAA records can be updated to an address, got {}",
                self.record_type
            )));
        }
        if !self.record_type.accepts(ip) {
            return Err(Error::validation(format!(
                "{} can't be stored in an {} record",
                ip, self.record_type
            )));
        }
        Ok(())
    }
}

/// Result of a successful address update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressChange {
    /// Value before the update, when the provider exposes it.
    pub previous: Option<String>,
    pub current: String,
    /// Id of the record now holding the value, when the provider has ids.
    pub record_id: Option<String>,
}

#[async_trait]
pub trait DynamicDnsProvider: Send + Sync {
    /// Resolve the target's zone and record, then point the record at `ip`.
    async fn update_address(&self, target: &UpdateTarget, ip: IpAddr) -> Result<AddressChange>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::api_key("me@example.com", "global-key");
        let debug = format!("{:?}", creds);

        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("global-key"));
    }

    #[test]
    fn test_target_rejects_family_mismatch() {
        let target = UpdateTarget::new("zone", "record", RecordType::AAAA);
        let v4: IpAddr = "198.51.100.1".parse().unwrap();

        assert!(matches!(target.check(&v4), Err(Error::Validation(_))));
    }

    #[test]
    fn test_target_rejects_non_address_type() {
        let target = UpdateTarget::new("zone", "record", RecordType::CNAME);
        let v4: IpAddr = "198.51.100.1".parse().unwrap();

        assert!(matches!(target.check(&v4), Err(Error::Validation(_))));
    }
}
