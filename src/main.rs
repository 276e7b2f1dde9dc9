//! Polymarket alert tracker entry point.

use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polymarket_alerts::alerts::{build_notification, RunReport};
use polymarket_alerts::config::Config;
use polymarket_alerts::market::{select_candidates, MarketDataClient};
use polymarket_alerts::metrics;
use polymarket_alerts::notify::{Notifier, SmtpNotifier};
use polymarket_alerts::pipeline::{run_once, RunParams};
use polymarket_alerts::pricing::{format_mid, format_probability};

/// Polymarket event probability tracker.
#[derive(Parser, Debug)]
#[command(name = "polymarket-alerts")]
#[command(about = "Track outcome probabilities of a Polymarket event and alert on thresholds")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, price, evaluate rules and notify (default).
    Run {
        /// Override EVENT_ID.
        #[arg(long)]
        event_id: Option<u64>,

        /// Override TOP_N.
        #[arg(long)]
        top_n: Option<usize>,

        /// Print alerts without sending the notification.
        #[arg(long)]
        no_email: bool,
    },

    /// Check configuration validity.
    CheckConfig,

    /// List candidate markets of an event with their outcome tokens.
    ShowEvent {
        /// Override EVENT_ID.
        #[arg(long)]
        event_id: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    init_logging(&args, &config);
    metrics::init_metrics();

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::ShowEvent { event_id }) => cmd_show_event(&config, event_id).await,
        Some(Command::Run {
            event_id,
            top_n,
            no_email,
        }) => cmd_run(&config, event_id, top_n, no_email).await,
        None => cmd_run(&config, None, None, false).await,
    }
}

fn init_logging(args: &Args, config: &Config) {
    let filter = if args.verbose {
        EnvFilter::new("polymarket_alerts=debug,info")
    } else {
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    let rules = config.alert_rules()?;
    let smtp = config.smtp();

    println!("======================================================================");
    println!("POLYMARKET ALERTS - CONFIGURATION CHECK");
    println!("======================================================================");
    println!("  Event ID: {}", config.event_id);
    println!("  Top N: {}", config.top_n);
    println!("  Gamma API: {}", config.gamma_api_url);
    println!("  CLOB API: {}", config.clob_api_url);
    println!("  Timeout: {}ms", config.http_timeout_ms);
    println!(
        "  Retries: {} (backoff {}ms base, {}ms jitter, {}ms cap)",
        config.max_retries, config.backoff_base_ms, config.backoff_jitter_ms, config.backoff_max_ms
    );
    println!("  Quote Policy: {}", config.quote_policy);
    println!("  Rules:");
    for rule in &rules {
        println!("    - {} {} {}", rule.name, rule.kind, rule.threshold);
    }
    println!(
        "  Email: {}",
        if smtp.is_configured() {
            "Enabled"
        } else {
            "Disabled (SMTP not configured)"
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// List candidate markets without pricing them.
async fn cmd_show_event(config: &Config, event_id: Option<u64>) -> anyhow::Result<()> {
    let client = MarketDataClient::from_config(config);
    let event = client
        .fetch_event(event_id.unwrap_or(config.event_id))
        .await?;

    println!("=== {} - slug: {} ===\n", event.title(), event.slug());
    for market in select_candidates(&event.markets, config.top_n) {
        println!("[{}] liquidity={}", market.display_title(), market.liquidity());
        for pair in market.pair_outcomes() {
            println!("  - {:6} | {}", pair.label, pair.token_id);
        }
        println!();
    }

    Ok(())
}

/// Run one fetch/evaluate/notify cycle.
async fn cmd_run(
    config: &Config,
    event_id: Option<u64>,
    top_n: Option<usize>,
    no_email: bool,
) -> anyhow::Result<()> {
    let client = MarketDataClient::from_config(config);
    let params = RunParams {
        event_id: event_id.unwrap_or(config.event_id),
        top_n: top_n.unwrap_or(config.top_n),
        rules: config.alert_rules()?,
        quote_policy: config.quote_policy,
    };

    let report = run_once(&client, &params).await?;
    print_report(&report);

    let Some(notification) =
        build_notification(&report.event_title, &report.alerts, OffsetDateTime::now_utc())
    else {
        println!("\nNo alert triggered.");
        return Ok(());
    };

    if no_email {
        println!("\n[ALERT: {}] (email disabled)", notification.subject);
        println!("{}", notification.text);
        return Ok(());
    }

    let notifier = SmtpNotifier::new(config.smtp());
    let sent = notifier
        .send(
            &notification.subject,
            &notification.text,
            notification.html.as_deref(),
        )
        .await?;

    if sent {
        info!(subject = %notification.subject, "Alert email sent");
        println!("\n[EMAIL SENT: {}]", notification.subject);
    } else {
        println!("\n[ALERT: {}] (email skipped)", notification.subject);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("=== {} - slug: {} ===\n", report.event_title, report.event_slug);
    for market in &report.markets {
        println!("[{}]", market.title);
        for outcome in &market.outcomes {
            println!(
                "  - {:6} | MID={} | Prob≈{}",
                outcome.label,
                format_mid(outcome.mid),
                format_probability(outcome.mid)
            );
        }
        println!();
    }
}
