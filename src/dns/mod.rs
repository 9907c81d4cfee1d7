pub mod cloudflare;
pub mod namecheap;
pub mod netlify;
mod provider;
mod record_type;
mod session;
pub mod vercel;

pub use provider::{AddressChange, Credentials, DynamicDnsProvider, UpdateTarget};
pub use record_type::RecordType;
pub use session::{normalize_error, ClientOptions, ErrorEnvelope, Session};

use std::sync::Arc;

use crate::error::{Error, Result};

pub const PROVIDERS: &[&str] = &["cloudflare", "netlify", "vercel", "namecheap"];

pub fn create_provider(
    name: &str,
    credentials: &Credentials,
    options: &ClientOptions,
) -> Result<Arc<dyn DynamicDnsProvider>> {
    match name.to_lowercase().as_str() {
        "cloudflare" => Ok(Arc::new(cloudflare::CloudflareClient::new(credentials, options)?)),
        "netlify" => Ok(Arc::new(netlify::NetlifyClient::new(credentials, options)?)),
        "vercel" => Ok(Arc::new(vercel::VercelClient::new(credentials, options)?)),
        "namecheap" => Ok(Arc::new(namecheap::NamecheapClient::new(credentials, options)?)),
        _ => Err(Error::validation(format!(
            "Unknown DNS provider: {} (expected one of {})",
            name,
            PROVIDERS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_by_name() {
        let options = ClientOptions::default();

        let provider = create_provider("Cloudflare", &Credentials::token("tok"), &options).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");

        let provider =
            create_provider("namecheap", &Credentials::dyn_dns_password("pw"), &options).unwrap();
        assert_eq!(provider.provider_name(), "namecheap");
    }

    #[test]
    fn test_create_provider_rejects_unknown() {
        let err = create_provider("godaddy", &Credentials::token("tok"), &ClientOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_create_provider_checks_credentials() {
        let err = create_provider("vercel", &Credentials::default(), &ClientOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
