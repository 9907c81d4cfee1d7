use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// DNS record types known to at least one provider.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    NS,
    SRV,
    CAA,
    ALIAS,
    SPF,
    HTTPS,
    LOC,
    CERT,
    DNSKEY,
    DS,
    NAPTR,
    SMIMEA,
    SSHFP,
    SVCB,
    TLSA,
    URI,
    NETLIFY,
    #[serde(rename = "NETLIFYv6")]
    NETLIFYV6,
    /// A type the provider returned that this client does not model.
    #[serde(other)]
    Other,
}

const ALL: &[(RecordType, &str)] = &[
    (RecordType::A, "A"),
    (RecordType::AAAA, "AAAA"),
    (RecordType::CNAME, "CNAME"),
    (RecordType::MX, "MX"),
    (RecordType::TXT, "TXT"),
    (RecordType::NS, "NS"),
    (RecordType::SRV, "SRV"),
    (RecordType::CAA, "CAA"),
    (RecordType::ALIAS, "ALIAS"),
    (RecordType::SPF, "SPF"),
    (RecordType::HTTPS, "HTTPS"),
    (RecordType::LOC, "LOC"),
    (RecordType::CERT, "CERT"),
    (RecordType::DNSKEY, "DNSKEY"),
    (RecordType::DS, "DS"),
    (RecordType::NAPTR, "NAPTR"),
    (RecordType::SMIMEA, "SMIMEA"),
    (RecordType::SSHFP, "SSHFP"),
    (RecordType::SVCB, "SVCB"),
    (RecordType::TLSA, "TLSA"),
    (RecordType::URI, "URI"),
    (RecordType::NETLIFY, "NETLIFY"),
    (RecordType::NETLIFYV6, "NETLIFYv6"),
];

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        ALL.iter()
            .find(|(t, _)| t == self)
            .map(|(_, name)| *name)
            .unwrap_or("OTHER")
    }

    /// Whether an address of this family can be stored in the record.
    pub fn accepts(&self, ip: &IpAddr) -> bool {
        matches!(
            (self, ip),
            (RecordType::A, IpAddr::V4(_)) | (RecordType::AAAA, IpAddr::V6(_))
        )
    }

    /// Record types the `update` command can point at an address.
    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::AAAA)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(t, _)| *t)
            .ok_or_else(|| Error::validation(format!("unknown DNS record type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_type() {
        assert_eq!("aaaa".parse::<RecordType>().unwrap(), RecordType::AAAA);
        assert_eq!("NETLIFYv6".parse::<RecordType>().unwrap(), RecordType::NETLIFYV6);
        assert!("BOGUS".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RecordType::NETLIFYV6).unwrap();
        assert_eq!(json, "\"NETLIFYv6\"");

        let parsed: RecordType = serde_json::from_str("\"PTR\"").unwrap();
        assert_eq!(parsed, RecordType::Other);
    }

    #[test]
    fn test_accepts_matching_family() {
        let v4: IpAddr = "203.0.113.7".parse().unwrap();
        let v6: IpAddr = "2001:db8::7".parse().unwrap();

        assert!(RecordType::A.accepts(&v4));
        assert!(!RecordType::A.accepts(&v6));
        assert!(RecordType::AAAA.accepts(&v6));
        assert!(!RecordType::CNAME.accepts(&v4));
    }
}
