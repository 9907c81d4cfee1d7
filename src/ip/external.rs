use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use super::IpFamily;

pub const IPV4_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ipv4.icanhazip.com",
    "https://checkip.amazonaws.com",
    "https://ipinfo.io/ip",
];

pub const IPV6_SERVICES: &[&str] = &[
    "https://api6.ipify.org",
    "https://ipv6.icanhazip.com",
    "https://v6.ident.me",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Asks each service in turn and returns the first answer of the wanted family.
pub async fn get_public_ip(family: IpFamily, services: &[String]) -> Result<IpAddr> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let mut last_error = None;

    for service in services {
        match fetch_ip(&client, service).await {
            Ok(ip) if family.matches(&ip) => return Ok(ip),
            Ok(ip) => {
                tracing::debug!("{} answered {}, which is not {}", service, ip, family);
                last_error = Some(anyhow!("{} answered with a non-{} address", service, family));
            }
            Err(e) => {
                tracing::debug!("Failed to get IP from {}: {}", service, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow!("No IP services configured"))
        .context(format!("Failed to find your public {} address", family)))
}

async fn fetch_ip(client: &Client, url: &str) -> Result<IpAddr> {
    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let ip_str = response.trim();
    let ip: IpAddr = ip_str
        .parse()
        .with_context(|| format!("{} answered with something that is not an IP: {:?}", url, ip_str))?;

    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_falls_back_to_next_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.9\n"))
            .mount(&server)
            .await;

        let services = vec![
            format!("{}/broken", server.uri()),
            format!("{}/ip", server.uri()),
        ];
        let ip = get_public_ip(IpFamily::V4, &services).await.unwrap();
        assert_eq!(ip, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_skips_wrong_family() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.9"))
            .mount(&server)
            .await;

        let services = vec![format!("{}/v4", server.uri())];
        assert!(get_public_ip(IpFamily::V6, &services).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_ip_trims_padding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/padded"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  2001:db8::1 \r\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let client = Client::new();
        let ip = fetch_ip(&client, &format!("{}/padded", server.uri())).await.unwrap();
        assert_eq!(ip, "2001:db8::1".parse::<IpAddr>().unwrap());

        assert!(fetch_ip(&client, &format!("{}/html", server.uri())).await.is_err());
    }
}
