//! `worksite` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`          — start the API server.
//! - `migrate`        — run pending database migrations.
//! - `seed`           — create a demo organization, site and system admin.
//! - `payroll`        — freeze a month of payroll for every profile that worked.
//! - `export-payroll` — write a month's payroll snapshots as CSV.

mod config;

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use api::auth::JwtKeys;
use api::feed::ChangeFeed;
use api::{ApiError, AppState};
use db::models::{NewOrganization, NewProfile, NewSite, SiteFilter, WorkRecordFilter};
use db::repository::profiles;
use db::{DbError, DbPool, PgStore, Store};
use domain::{payroll, validation, Role, SiteStatus};

use crate::config::Config;

const DEFAULT_ADMIN_EMAIL: &str = "admin@worksite.local";

#[derive(Parser)]
#[command(
    name = "worksite",
    about = "Construction-site workforce, document and payroll backend",
    version
)]
struct Cli {
    /// Overrides `database_url` from the configuration.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run pending database migrations.
    Migrate,
    /// Create demo data; existing rows with the same names are reused.
    Seed {
        #[arg(long, default_value = "데모건설")]
        organization: String,
        #[arg(long, default_value = "본사 신축공사")]
        site: String,
        #[arg(long, default_value = DEFAULT_ADMIN_EMAIL)]
        admin_email: String,
    },
    /// Compute and freeze payroll for one month.
    Payroll {
        #[arg(long)]
        year: i32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Only profiles with work records in this organization.
        #[arg(long)]
        organization: Option<Uuid>,
        /// Admin recorded as the snapshots' creator.
        #[arg(long, default_value = DEFAULT_ADMIN_EMAIL)]
        actor: String,
        /// Print the computed pay without writing snapshots.
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a month's payroll snapshots as CSV.
    ExportPayroll {
        #[arg(long)]
        year: i32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        #[arg(long)]
        organization: Option<Uuid>,
        /// Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            serve(config).await
        }
        Command::Migrate => {
            let pool = connect(&config).await?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
            Ok(())
        }
        Command::Seed { organization, site, admin_email } => {
            seed(&config, &organization, &site, &admin_email).await
        }
        Command::Payroll { year, month, organization, actor, dry_run } => {
            run_payroll(&config, year, month, organization, &actor, dry_run).await
        }
        Command::ExportPayroll { year, month, organization, output } => {
            export_payroll(&config, year, month, organization, output).await
        }
    }
}

async fn connect(config: &Config) -> anyhow::Result<DbPool> {
    db::pool::create_pool(&config.pool_settings())
        .await
        .context("failed to connect to database")
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let secret = config.jwt_secret()?;
    let pool = connect(&config).await?;
    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        JwtKeys::from_secret(secret.as_bytes()),
        ChangeFeed::new(config.feed_capacity),
    );
    info!(bind = %config.bind, "Starting API server");
    api::serve(&config.bind, state, &config.cors_origins).await?;
    Ok(())
}

async fn seed(
    config: &Config,
    organization: &str,
    site: &str,
    admin_email: &str,
) -> anyhow::Result<()> {
    let organization = validation::required_text(organization, "조직명")?;
    let site = validation::required_text(site, "현장명")?;
    let store = PgStore::new(connect(config).await?);

    let org = match store
        .list_organizations(None)
        .await?
        .into_iter()
        .find(|o| o.name == organization)
    {
        Some(org) => org,
        None => {
            store
                .create_organization(&NewOrganization { name: organization, business_number: None })
                .await?
        }
    };

    let site_row = match store
        .list_sites(&SiteFilter { organization_id: Some(org.id), site_id: None })
        .await?
        .into_iter()
        .find(|s| s.name == site)
    {
        Some(s) => s,
        None => {
            store
                .create_site(&NewSite {
                    organization_id: org.id,
                    name: site,
                    address: String::new(),
                    status: SiteStatus::Active.to_string(),
                    start_date: chrono::Utc::now().date_naive(),
                    end_date: None,
                })
                .await?
        }
    };

    let admin = match profiles::get_profile_by_email(store.pool(), admin_email).await {
        Ok(p) => p,
        Err(DbError::NotFound) => {
            store
                .create_profile(&NewProfile {
                    id: Uuid::new_v4(),
                    email: admin_email.to_string(),
                    full_name: "시스템 관리자".to_string(),
                    role: Role::SystemAdmin.to_string(),
                    organization_id: Some(org.id),
                    site_id: None,
                    restricted: false,
                })
                .await?
        }
        Err(e) => return Err(e.into()),
    };

    info!(organization_id = %org.id, site_id = %site_row.id, admin_id = %admin.id, "Seed complete");
    println!("organization_id = {}", org.id);
    println!("site_id         = {}", site_row.id);
    println!("admin_id        = {}", admin.id);

    if let Ok(secret) = config.jwt_secret() {
        let token = JwtKeys::from_secret(secret.as_bytes()).issue(admin.id, 24 * 60 * 60)?;
        println!("admin_token     = {token}");
    }
    Ok(())
}

async fn run_payroll(
    config: &Config,
    year: i32,
    month: u32,
    organization: Option<Uuid>,
    actor_email: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let (from, to) = payroll::month_bounds(year, month)?;
    let store = PgStore::new(connect(config).await?);

    let actor = profiles::get_profile_by_email(store.pool(), actor_email)
        .await
        .with_context(|| format!("actor {actor_email} not found"))?;
    let role: Role = actor.role.parse().map_err(anyhow::Error::msg)?;
    if !role.is_admin() {
        bail!("actor {actor_email} is not an admin");
    }

    let records = store
        .list_work_records(&WorkRecordFilter {
            organization_id: organization,
            from: Some(from),
            to: Some(to),
            ..Default::default()
        })
        .await?;
    let profile_ids: BTreeSet<Uuid> = records.iter().map(|r| r.profile_id).collect();
    info!(year, month, profiles = profile_ids.len(), dry_run, "Running payroll");

    let (mut written, mut skipped) = (0usize, 0usize);
    for profile_id in profile_ids {
        let profile = store.get_profile(profile_id).await?;

        if dry_run {
            match api::payroll::preview(&store, &profile, year, month).await {
                Ok(p) => println!(
                    "{}\t{}\t{:.1}h\tgross {}\ttax {}\tnet {}",
                    p.profile_id,
                    p.full_name,
                    p.breakdown.total_hours,
                    p.breakdown.gross_pay,
                    p.breakdown.tax_amount,
                    p.breakdown.net_pay
                ),
                Err(ApiError::NotFound(msg)) => {
                    warn!(%profile_id, "{msg}");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
            continue;
        }

        match api::payroll::snapshot(&store, &profile, year, month, actor.id).await {
            Ok(_) => written += 1,
            Err(ApiError::Conflict(msg)) | Err(ApiError::NotFound(msg)) => {
                warn!(%profile_id, full_name = %profile.full_name, "skipped: {msg}");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(written, skipped, "Payroll finished");
    Ok(())
}

async fn export_payroll(
    config: &Config,
    year: i32,
    month: u32,
    organization: Option<Uuid>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = PgStore::new(connect(config).await?);
    let csv = api::payroll::export_month(&store, organization, year, month).await?;

    match output {
        Some(path) => {
            std::fs::write(&path, csv.as_bytes())
                .with_context(|| format!("cannot write {}", path.display()))?;
            info!(path = %path.display(), "Payroll exported");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(csv.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
