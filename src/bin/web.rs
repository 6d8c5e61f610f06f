use anyhow::{Context, Result};
use clap::Parser;
use edgefinder::config::{AppConfig, BookmakerSet};
use edgefinder::server::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "edgefinder-web", about = "Moneyline edge finder operator panel")]
struct Args {
    /// Address the panel listens on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    static_dir: String,

    /// Comma-separated bookmaker keys, overrides ODDS_BOOKMAKERS
    #[arg(long)]
    bookmakers: Option<String>,

    /// Odds API region, overrides ODDS_REGION
    #[arg(long)]
    region: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(bookmakers) = args.bookmakers.as_deref() {
        config.odds_api.bookmakers = BookmakerSet::parse_non_empty(bookmakers, "--bookmakers")
            .context("Invalid --bookmakers")?;
    }
    if let Some(region) = args.region {
        config.odds_api.region = region;
    }

    println!("Moneyline Edge Finder");
    println!(
        "  - Bookmakers: {}",
        config.odds_api.bookmakers.query_value()
    );
    println!("  - Region: {}", config.odds_api.region);
    if config.default_api_key.is_none() {
        println!("  - No ODDS_API_KEY set, paste a key into the panel");
    }

    let app = router(AppState::new(config), &args.static_dir);

    println!("\nStarting web server at http://{}", args.bind);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
