mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brandintel_dashboard::ApiClient;

#[derive(Debug, Parser)]
#[command(name = "brandintel-dashboard")]
#[command(about = "Terminal dashboard for the Brand Intelligence API")]
struct Cli {
    /// Base URL of the Brand Intelligence API.
    #[arg(
        long,
        env = "API_URL",
        default_value = "http://localhost:8001",
        global = true
    )]
    api_url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// API health and headline counts (default).
    Overview,
    /// Search and filter brands.
    Brands {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        tier: Option<String>,
        #[arg(long)]
        aesthetic: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Intelligence signals feed.
    Signals {
        #[arg(long)]
        signal_type: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        /// ISO-8601 date or timestamp lower bound.
        #[arg(long)]
        since: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Content feed for one brand.
    Content {
        brand_id: String,
        #[arg(long, value_parser = ["instagram", "tiktok", "twitter"])]
        platform: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Create a brand.
    CreateBrand {
        #[arg(long)]
        name: String,
        #[arg(long)]
        logo_url: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        tier: Option<String>,
        /// Aesthetic tag; repeat for several.
        #[arg(long = "aesthetic")]
        aesthetic: Vec<String>,
    },
    /// Create a signal detected now.
    CreateSignal {
        #[arg(long)]
        brand_id: String,
        #[arg(long)]
        signal_type: String,
        #[arg(long, default_value_t = 0.5)]
        confidence: f64,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url, cli.timeout_secs)?;

    match cli.command.unwrap_or(Commands::Overview) {
        Commands::Overview => commands::run_overview(&client).await?,
        Commands::Brands {
            search,
            industry,
            market,
            tier,
            aesthetic,
            limit,
            offset,
        } => {
            let filters = brandintel_dashboard::BrandFilters {
                search,
                industry,
                market,
                tier,
                aesthetic,
                limit,
                offset,
            };
            commands::run_brands(&client, &filters).await?;
        }
        Commands::Signals {
            signal_type,
            brand,
            since,
            limit,
            offset,
        } => {
            let filters = brandintel_dashboard::SignalFilters {
                signal_type,
                brand_id: brand,
                since,
                limit,
                offset,
            };
            commands::run_signals(&client, &filters).await?;
        }
        Commands::Content {
            brand_id,
            platform,
            content_type,
            limit,
            offset,
        } => {
            let filters = brandintel_dashboard::ContentFilters {
                platform,
                content_type,
                limit,
                offset,
            };
            commands::run_content(&client, &brand_id, &filters).await?;
        }
        Commands::CreateBrand {
            name,
            logo_url,
            industry,
            market,
            tier,
            aesthetic,
        } => {
            let brand = brandintel_core::NewBrand {
                name,
                logo_url,
                industry,
                market,
                tier,
                aesthetic: (!aesthetic.is_empty()).then_some(aesthetic),
                metadata: None,
            };
            commands::run_create_brand(&client, &brand).await?;
        }
        Commands::CreateSignal {
            brand_id,
            signal_type,
            confidence,
            reason,
        } => {
            let signal = brandintel_core::NewSignal {
                brand_id,
                signal_type,
                confidence,
                reason: reason.filter(|r| !r.trim().is_empty()),
                detected_at: chrono::Utc::now(),
                content_ids: Vec::new(),
            };
            commands::run_create_signal(&client, &signal).await?;
        }
    }

    Ok(())
}
