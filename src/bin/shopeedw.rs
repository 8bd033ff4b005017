use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shopeedw", about = "Shopee order warehouse CLI")]
struct Cli {
    /// Database path (default: ~/.shopeedw/shopeedw.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Page size for order listing requests (default: API maximum of 100)
    #[arg(long)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

/// Progress reporter that writes to stderr.
struct StderrProgress;

impl shopeedw::SyncProgress for StderrProgress {
    fn on_run_start(&self, label: &str) {
        eprintln!("Starting {label}...");
    }

    fn on_window_listed(&self, window: &str, count: usize) {
        eprintln!("  {window}: {count} orders");
    }

    fn on_orders_found(&self, total: usize) {
        eprintln!("Found {total} orders");
    }

    fn on_batch_fetched(&self, completed: u32, total: u32, records: usize) {
        eprintln!("  Batch {completed}/{total}: {records} records");
    }

    fn on_run_complete(&self, report: &shopeedw::SyncReport) {
        eprintln!(
            "  Done: {} new, {} updated, {} status changes",
            report.orders_new, report.orders_updated, report.status_changes
        );
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror historical orders into the local warehouse
    Backfill {
        /// Days of history to cover
        #[arg(long, default_value = "730")]
        days: u32,
    },
    /// Mirror orders updated in the recent window
    Refresh {
        /// Hours of recent activity to cover
        #[arg(long, default_value = "24")]
        hours: u32,
    },
    /// Refresh continuously on a fixed interval
    Watch {
        /// Hours of recent activity each tick covers
        #[arg(long, default_value = "24")]
        hours: u32,
        /// Seconds between ticks
        #[arg(long, default_value = "300")]
        interval: u64,
    },
    /// Show warehouse status
    Status,
    /// Show one mirrored order as JSON
    Show {
        /// Order serial number
        order_sn: String,
    },
    /// Shop authorization helpers
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Print the URL the shop owner visits to authorize this partner
    Url,
    /// Exchange an authorization code for an access/refresh token pair
    Token {
        /// Code from the authorization redirect
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => shopeedw::Database::open_at(path).await?,
        None => shopeedw::Database::open().await?,
    };

    match cli.command {
        Commands::Backfill { days } => {
            let dw = open_warehouse(db, cli.page_size)?;
            let options = shopeedw::SyncOptions {
                backfill_days: days,
                ..Default::default()
            };
            let report = dw.backfill(&options, &StderrProgress).await?;
            print_sync_report(&report);
        }
        Commands::Refresh { hours } => {
            let dw = open_warehouse(db, cli.page_size)?;
            let options = shopeedw::SyncOptions {
                refresh_hours: hours,
                ..Default::default()
            };
            let report = dw.refresh(&options, &StderrProgress).await?;
            print_sync_report(&report);
        }
        Commands::Watch { hours, interval } => {
            let dw = open_warehouse(db, cli.page_size)?;
            let options = shopeedw::SyncOptions {
                refresh_hours: hours,
                poll_interval: std::time::Duration::from_secs(interval.max(1)),
                ..Default::default()
            };
            dw.watch(&options, &StderrProgress).await?;
        }
        Commands::Status => {
            print_status(&db).await?;
        }
        Commands::Show { order_sn } => {
            print_order(&db, &order_sn).await?;
        }
        Commands::Auth { action } => {
            let config = shopeedw::Config::from_env()?;
            handle_auth(&config, action).await?;
        }
    }

    Ok(())
}

fn open_warehouse(
    db: shopeedw::Database,
    page_size: Option<u32>,
) -> anyhow::Result<shopeedw::ShopeeDW> {
    let config = shopeedw::Config::from_env()?;
    let mut client = shopeedw::api::Client::new(&config)?;
    if let Some(ps) = page_size {
        client = client.with_page_size(ps);
    }
    Ok(shopeedw::ShopeeDW::new(db, client))
}

fn print_sync_report(report: &shopeedw::SyncReport) {
    println!("Sync: {}", report.label);
    println!("  Status:  {:?}", report.status);
    println!("  Found:   {} orders", report.orders_found);
    println!("  Fetched: {} orders", report.orders_fetched);
    println!("  New:     {}", report.orders_new);
    println!("  Updated: {}", report.orders_updated);
    println!("  Status changes: {}", report.status_changes);
    println!("  Failed:  {}", report.orders_failed);
    println!(
        "  Batches: {}/{}",
        report.batches_completed, report.batches_total
    );
    if let Some(ref err) = report.error {
        println!("  Error:   {err}");
    }
}

async fn print_status(db: &shopeedw::Database) -> anyhow::Result<()> {
    let stats = db
        .reader()
        .call(|conn| shopeedw::storage::repository::mirror_stats(conn))
        .await?;

    println!("Warehouse Status");
    println!("  Orders:    {}", stats.orders);
    println!(
        "  Last sync: {}",
        stats.last_synced_at.map(format_ts).unwrap_or_else(|| "never".to_string())
    );
    if !stats.by_status.is_empty() {
        println!("  By status:");
        for (status, count) in &stats.by_status {
            println!("    {status}: {count}");
        }
    }
    Ok(())
}

async fn print_order(db: &shopeedw::Database, order_sn: &str) -> anyhow::Result<()> {
    let order = db
        .reader()
        .call({
            let order_sn = order_sn.to_string();
            move |conn| shopeedw::storage::repository::get_order(conn, &order_sn)
        })
        .await?;

    match order {
        Some(order) => println!("{}", serde_json::to_string_pretty(&order)?),
        None => anyhow::bail!("order {order_sn} is not in the mirror"),
    }
    Ok(())
}

async fn handle_auth(config: &shopeedw::Config, action: AuthAction) -> anyhow::Result<()> {
    match action {
        AuthAction::Url => {
            println!("{}", shopeedw::api::auth::authorization_url(config)?);
        }
        AuthAction::Token { code } => {
            let token = shopeedw::api::auth::exchange_code(config, &code).await?;
            println!("access_token:  {}", token.access_token);
            println!("refresh_token: {}", token.refresh_token);
            println!("expires_in:    {}s", token.expire_in);
        }
    }
    Ok(())
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
