use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dynamic_dns::config::Settings;
use dynamic_dns::dns::cloudflare::{CloudflareClient, ListRecordsQuery, ListZonesQuery};
use dynamic_dns::dns::netlify::NetlifyClient;
use dynamic_dns::dns::vercel::VercelClient;
use dynamic_dns::dns::{
    create_provider, ClientOptions, Credentials, DynamicDnsProvider, RecordType, UpdateTarget,
};
use dynamic_dns::ip::{self, IpFamily};
use dynamic_dns::pagination::{CursorRequest, OffsetRequest, Page};

#[derive(Parser, Debug)]
#[command(name = "dynamic-dns")]
#[command(about = "Dynamic DNS client - points DNS records at your current IP address")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every request sent to the provider
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    provider: Provider,
}

#[derive(Subcommand, Debug)]
enum Provider {
    /// Cloudflare, with an API token or an email and global API key
    Cloudflare {
        #[arg(long)]
        token: Option<String>,
        #[arg(long = "auth-email", alias = "authEmail")]
        auth_email: Option<String>,
        #[arg(long = "auth-key", alias = "authKey")]
        auth_key: Option<String>,
        #[command(subcommand)]
        command: CloudflareCommand,
    },

    /// Netlify DNS, with a personal access token
    Netlify {
        #[arg(long)]
        token: Option<String>,
        #[command(subcommand)]
        command: NetlifyCommand,
    },

    /// Vercel domains, with an access token
    Vercel {
        #[arg(long)]
        token: Option<String>,
        #[command(subcommand)]
        command: VercelCommand,
    },

    /// Namecheap dynamic DNS, with the domain's dynamic DNS password
    Namecheap {
        #[arg(long = "dyn-dns-password", alias = "dynDnsPassword")]
        dyn_dns_password: Option<String>,
        #[command(subcommand)]
        command: NamecheapCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CloudflareCommand {
    /// Point a record at an address
    Update(UpdateArgs),

    /// List zones
    #[command(name = "listZones", alias = "list-zones")]
    ListZones(CloudflareListZones),

    /// List the records of a zone
    #[command(name = "listRecords", alias = "list-records")]
    ListRecords(CloudflareListRecords),
}

#[derive(Subcommand, Debug)]
enum NetlifyCommand {
    /// Point a record at an address
    Update(UpdateArgs),

    /// List DNS zones
    #[command(name = "listZones", alias = "list-zones")]
    ListZones {
        #[arg(long = "account-slug", alias = "accountSlug")]
        account_slug: Option<String>,
    },

    /// List the records of a DNS zone
    #[command(name = "listRecords", alias = "list-records")]
    ListRecords {
        /// Zone id
        zone: String,
    },
}

#[derive(Subcommand, Debug)]
enum VercelCommand {
    /// Point a record at an address
    Update {
        #[command(flatten)]
        update: UpdateArgs,
        #[command(flatten)]
        team: TeamArg,
    },

    /// List domains
    #[command(name = "listDomains", alias = "list-domains")]
    ListDomains {
        #[arg(long)]
        limit: Option<u32>,
        #[command(flatten)]
        team: TeamArg,
    },

    /// List the records of a domain
    #[command(name = "listRecords", alias = "list-records")]
    ListRecords {
        /// Domain name
        domain: String,
        #[arg(long)]
        limit: Option<u32>,
        #[command(flatten)]
        team: TeamArg,
    },

    /// List the teams the token can see
    #[command(name = "listTeams", alias = "list-teams")]
    ListTeams {
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
enum NamecheapCommand {
    /// Point a host at an address
    Update {
        /// Domain, e.g. example.com
        domain: String,
        /// Host, e.g. www, or @ for the root
        host: String,
        /// Address to set, defaults to your public IPv4 address
        #[arg(long)]
        ip: Option<IpAddr>,
    },
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Zone id, or the domain name for Vercel
    zone: String,
    /// Record id
    record: String,
    /// Address to set, defaults to your public address
    #[arg(long)]
    ip: Option<IpAddr>,
    /// Record type, A or AAAA
    #[arg(long = "dns-type", alias = "dnsType", default_value = "A", value_parser = parse_address_type)]
    dns_type: RecordType,
}

#[derive(Args, Debug)]
struct TeamArg {
    /// Act inside this team
    #[arg(long = "team-id", alias = "teamId")]
    team_id: Option<String>,
}

#[derive(Args, Debug)]
struct CloudflareListZones {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long = "per-page", alias = "perPage", default_value_t = 20)]
    per_page: u32,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    status: Option<String>,
}

#[derive(Args, Debug)]
struct CloudflareListRecords {
    /// Zone id
    zone: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long = "per-page", alias = "perPage", default_value_t = 20)]
    per_page: u32,
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "type")]
    record_type: Option<RecordType>,
}

fn parse_address_type(value: &str) -> std::result::Result<RecordType, String> {
    match value.parse::<RecordType>() {
        Ok(record_type) if record_type.is_address() => Ok(record_type),
        _ => Err(format!("expected A or AAAA, got {}", value)),
    }
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    let log_level = if cli.verbose {
        "debug"
    } else {
        settings.log.level.as_str()
    };
    init_logging(log_level);

    let options = settings.client_options();

    match cli.provider {
        Provider::Cloudflare {
            token,
            auth_email,
            auth_key,
            command,
        } => {
            let credentials = Credentials {
                token,
                auth_email,
                auth_key,
                dyn_dns_password: None,
            };
            run_cloudflare(&settings, &options, &credentials, command).await
        }
        Provider::Netlify { token, command } => {
            let credentials = Credentials {
                token,
                ..Credentials::default()
            };
            run_netlify(&settings, &options, &credentials, command).await
        }
        Provider::Vercel { token, command } => {
            let credentials = Credentials {
                token,
                ..Credentials::default()
            };
            run_vercel(&settings, &options, &credentials, command).await
        }
        Provider::Namecheap {
            dyn_dns_password,
            command,
        } => {
            let credentials = Credentials {
                dyn_dns_password,
                ..Credentials::default()
            };
            match command {
                NamecheapCommand::Update { domain, host, ip } => {
                    let provider = create_provider("namecheap", &credentials, &options)?;
                    let target = UpdateTarget::new(domain, host, RecordType::A);
                    update(&settings, provider.as_ref(), &target, ip).await
                }
            }
        }
    }
}

async fn run_cloudflare(
    settings: &Settings,
    options: &ClientOptions,
    credentials: &Credentials,
    command: CloudflareCommand,
) -> Result<()> {
    match command {
        CloudflareCommand::Update(args) => {
            let provider = create_provider("cloudflare", credentials, options)?;
            let target = UpdateTarget::new(args.zone, args.record, args.dns_type);
            update(settings, provider.as_ref(), &target, args.ip).await
        }
        CloudflareCommand::ListZones(args) => {
            let client = CloudflareClient::new(credentials, options)?;
            let zones = client
                .list_zones(&ListZonesQuery {
                    page: OffsetRequest::new(args.page, args.per_page),
                    name: args.name,
                    status: args.status,
                    ..ListZonesQuery::default()
                })
                .await?;
            print_listing("zones", &zones, |zone| {
                (zone.name().to_string(), zone.id().to_string())
            });
            Ok(())
        }
        CloudflareCommand::ListRecords(args) => {
            let client = CloudflareClient::new(credentials, options)?;
            let zone = client.get_zone(&args.zone).await?;
            let records = zone
                .list_records(&ListRecordsQuery {
                    page: OffsetRequest::new(args.page, args.per_page),
                    name: args.name,
                    record_type: args.record_type,
                    ..ListRecordsQuery::default()
                })
                .await?;
            print_listing("records", &records, |record| {
                let data = record.data();
                (
                    format!("{} {} {}", data.name, data.record_type, data.content),
                    record.id().to_string(),
                )
            });
            Ok(())
        }
    }
}

async fn run_netlify(
    settings: &Settings,
    options: &ClientOptions,
    credentials: &Credentials,
    command: NetlifyCommand,
) -> Result<()> {
    match command {
        NetlifyCommand::Update(args) => {
            let provider = create_provider("netlify", credentials, options)?;
            let target = UpdateTarget::new(args.zone, args.record, args.dns_type);
            update(settings, provider.as_ref(), &target, args.ip).await
        }
        NetlifyCommand::ListZones { account_slug } => {
            let client = NetlifyClient::new(credentials, options)?;
            let zones = client.list_zones(account_slug.as_deref()).await?;
            print_listing("zones", &zones, |zone| {
                (zone.name().to_string(), zone.id().to_string())
            });
            Ok(())
        }
        NetlifyCommand::ListRecords { zone } => {
            let client = NetlifyClient::new(credentials, options)?;
            let records = client.get_zone(&zone).await?.list_records().await?;
            print_listing("records", &records, |record| {
                let data = record.data();
                (
                    format!("{} {} {}", data.hostname, data.record_type, data.value),
                    record.id().to_string(),
                )
            });
            Ok(())
        }
    }
}

async fn run_vercel(
    settings: &Settings,
    options: &ClientOptions,
    credentials: &Credentials,
    command: VercelCommand,
) -> Result<()> {
    let client = VercelClient::new(credentials, options)?;

    match command {
        VercelCommand::Update { update: args, team } => {
            let client = scoped(&client, &team).await?;
            let target = UpdateTarget::new(args.zone, args.record, args.dns_type);
            update(settings, &client, &target, args.ip).await
        }
        VercelCommand::ListDomains { limit, team } => {
            let client = scoped(&client, &team).await?;
            let domains = client.list_domains(&cursor(limit)).await?;
            print_listing("domains", &domains, |domain| {
                let id = domain.data().id.clone().unwrap_or_default();
                (domain.name().to_string(), id)
            });
            Ok(())
        }
        VercelCommand::ListRecords {
            domain,
            limit,
            team,
        } => {
            let client = scoped(&client, &team).await?;
            let records = client
                .get_domain(&domain)
                .await?
                .list_records(&cursor(limit))
                .await?;
            print_listing("records", &records, |record| {
                let data = record.data();
                let name = if data.name.is_empty() { "@" } else { data.name.as_str() };
                (
                    format!("{} {} {}", name, data.record_type, data.value),
                    record.id().to_string(),
                )
            });
            Ok(())
        }
        VercelCommand::ListTeams { limit } => {
            let teams = client.list_teams(&cursor(limit)).await?;
            print_listing("teams", &teams, |team| (team.slug.clone(), team.id.clone()));
            Ok(())
        }
    }
}

/// Resolves the team first so that an unknown id fails before anything else.
async fn scoped(client: &VercelClient, team: &TeamArg) -> Result<VercelClient> {
    match &team.team_id {
        Some(team_id) => {
            let team = client.find_team(team_id).await?;
            Ok(client.as_team(&team))
        }
        None => Ok(client.clone()),
    }
}

fn cursor(limit: Option<u32>) -> CursorRequest {
    CursorRequest {
        limit,
        ..CursorRequest::default()
    }
}

async fn update(
    settings: &Settings,
    provider: &dyn DynamicDnsProvider,
    target: &UpdateTarget,
    ip: Option<IpAddr>,
) -> Result<()> {
    let ip = match ip {
        Some(ip) => ip,
        None => {
            let family = IpFamily::for_record(target.record_type)
                .context("Only A and AAAA records can be updated")?;
            ip::get_public_ip(family, settings.ip.services(family)).await?
        }
    };

    let change = provider
        .update_address(target, ip)
        .await
        .with_context(|| format!("Failed to update {} record {}", provider.provider_name(), target.record))?;

    match change.previous {
        Some(previous) => println!("Update from {} to {} succeed", previous, change.current),
        None => println!("Update to {} succeed", change.current),
    }
    Ok(())
}

fn print_listing<T>(what: &str, page: &Page<T>, describe: impl Fn(&T) -> (String, String)) {
    println!("Listing {} {}.", page.info.display_count(), what);
    for item in page.iter() {
        let (name, id) = describe(item);
        println!("* {} ({})", name, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cloudflare_update() {
        let cli = Cli::try_parse_from([
            "dynamic-dns",
            "cloudflare",
            "--authEmail",
            "me@example.com",
            "--auth-key",
            "key",
            "update",
            "zone1",
            "rec1",
            "--dns-type",
            "aaaa",
            "--ip",
            "2001:db8::1",
        ])
        .unwrap();

        match cli.provider {
            Provider::Cloudflare {
                auth_email,
                auth_key,
                token,
                command: CloudflareCommand::Update(args),
            } => {
                assert_eq!(auth_email.as_deref(), Some("me@example.com"));
                assert_eq!(auth_key.as_deref(), Some("key"));
                assert!(token.is_none());
                assert_eq!(args.dns_type, RecordType::AAAA);
                assert_eq!(args.ip, Some("2001:db8::1".parse().unwrap()));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_camel_case_commands() {
        let cli = Cli::try_parse_from([
            "dynamic-dns",
            "cloudflare",
            "--token",
            "tok",
            "listZones",
            "--per-page",
            "50",
            "--page",
            "3",
        ])
        .unwrap();
        match cli.provider {
            Provider::Cloudflare {
                command: CloudflareCommand::ListZones(args),
                ..
            } => {
                assert_eq!(args.page, 3);
                assert_eq!(args.per_page, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "dynamic-dns",
            "vercel",
            "--token",
            "tok",
            "listRecords",
            "example.com",
            "--team-id",
            "team_1",
        ])
        .unwrap();
        match cli.provider {
            Provider::Vercel {
                command: VercelCommand::ListRecords { domain, team, .. },
                ..
            } => {
                assert_eq!(domain, "example.com");
                assert_eq!(team.team_id.as_deref(), Some("team_1"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_update_defaults_to_a_record() {
        let cli = Cli::try_parse_from([
            "dynamic-dns", "netlify", "--token", "tok", "update", "zone1", "rec1",
        ])
        .unwrap();
        match cli.provider {
            Provider::Netlify {
                command: NetlifyCommand::Update(args),
                ..
            } => {
                assert_eq!(args.dns_type, RecordType::A);
                assert!(args.ip.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_address_type_and_bad_numbers() {
        assert!(Cli::try_parse_from([
            "dynamic-dns", "netlify", "--token", "tok", "update", "z", "r", "--dns-type", "MX",
        ])
        .is_err());

        assert!(Cli::try_parse_from([
            "dynamic-dns", "vercel", "--token", "tok", "listTeams", "--limit", "many",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_namecheap_password_alias() {
        let cli = Cli::try_parse_from([
            "dynamic-dns",
            "namecheap",
            "--dynDnsPassword",
            "pw",
            "update",
            "example.com",
            "@",
        ])
        .unwrap();
        match cli.provider {
            Provider::Namecheap {
                dyn_dns_password,
                command: NamecheapCommand::Update { domain, host, ip },
            } => {
                assert_eq!(dyn_dns_password.as_deref(), Some("pw"));
                assert_eq!(domain, "example.com");
                assert_eq!(host, "@");
                assert!(ip.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
