mod external;

pub use external::{get_public_ip, IPV4_SERVICES, IPV6_SERVICES};

use std::fmt;
use std::net::IpAddr;

use crate::dns::RecordType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// The family an address record of this type holds.
    pub fn for_record(record_type: RecordType) -> Option<Self> {
        match record_type {
            RecordType::A => Some(IpFamily::V4),
            RecordType::AAAA => Some(IpFamily::V6),
            _ => None,
        }
    }

    pub fn matches(&self, ip: &IpAddr) -> bool {
        matches!(
            (self, ip),
            (IpFamily::V4, IpAddr::V4(_)) | (IpFamily::V6, IpAddr::V6(_))
        )
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}
