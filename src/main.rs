use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::Serialize;
use skyref::{
    aircraft,
    airlines::{AirlineDescriptor, AirlineMatch},
    api::{BoundingBox, FlightProvider, SerpApiClient},
    app::App,
    brands::{BrandFields, LogoTable},
    config::Config,
    events::{Event, EventHandler},
    hotels, itineraries, location, logging,
    registry::AircraftRegistry,
    states::StateEnricher,
    store::AirlineStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "skyref")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Normalizes flight and hotel feeds against curated reference data", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = skyref::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll OpenSky and print one enriched JSON snapshot per poll
    Watch,

    /// Search Google Hotels and print enriched properties
    Hotels {
        /// Destination or free-text query
        query: String,

        /// Check-in date (YYYY-MM-DD)
        #[arg(long)]
        check_in: String,

        /// Check-out date (YYYY-MM-DD)
        #[arg(long)]
        check_out: String,

        /// Drop properties rated below this
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
    },

    /// Search Google Flights (one-way) and print itinerary summaries
    Flights {
        /// Departure airport(s) or shortcut (home, nyc, mia)
        from: String,

        /// Arrival airport(s) or shortcut
        to: String,

        /// Outbound date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Cabin: economy, premium, business, first
        #[arg(long, default_value = "economy")]
        cabin: String,
    },

    /// Run a single lookup against the configured tables
    Resolve {
        #[command(subcommand)]
        target: ResolveTarget,
    },
}

#[derive(Subcommand)]
enum ResolveTarget {
    /// Callsign → airline
    Callsign { callsign: String },

    /// Hotel brand fields → logo
    Logo {
        /// Property display name
        name: String,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        chain: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        subtype: Option<String>,
    },

    /// Aircraft description → model code
    Aircraft { description: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Instrumentation and safety
    let _log_guard = logging::initialize_logging(&cli.log_dir);
    color_eyre::install()?;

    let config = Config::load_from(&cli.config);

    match cli.command {
        Commands::Watch => watch(config).await,
        Commands::Hotels {
            query,
            check_in,
            check_out,
            min_rating,
        } => {
            let client = serpapi(&config)?;
            let response = client.hotels(&query, &check_in, &check_out).await?;
            let out = hotels::enrich_properties(
                &response.properties,
                &LogoTable::default(),
                &config.reference.logo_base_url,
                min_rating,
            );
            info!("{} of {} hotels kept", out.len(), response.properties.len());
            print_json(&out)
        }
        Commands::Flights {
            from,
            to,
            date,
            cabin,
        } => {
            let client = serpapi(&config)?;
            let response = client.flights(&from, &to, &date, &cabin).await?;
            let store = AirlineStore::open(&config.reference.airlines_path);
            let out = itineraries::summarize_all(&response, &store.snapshot());
            print_json(&out)
        }
        Commands::Resolve { target } => resolve(&config, target),
    }
}

fn serpapi(config: &Config) -> Result<SerpApiClient> {
    let key = config
        .api
        .serpapi_key
        .clone()
        .ok_or_else(|| eyre!("no SerpAPI key: set SERPAPI_KEY or api.serpapi_key"))?;
    SerpApiClient::new(key)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).wrap_err("serializing output")?;
    println!("{}", text);
    Ok(())
}

fn resolve(config: &Config, target: ResolveTarget) -> Result<()> {
    match target {
        ResolveTarget::Callsign { callsign } => {
            let store = AirlineStore::open(&config.reference.airlines_path);
            let index = store.snapshot();
            let found = match index.resolve_callsign(&callsign) {
                Some(record) => AirlineMatch::Resolved(AirlineDescriptor::from_record(
                    record,
                    &config.reference.asset_base_url,
                )),
                None => AirlineMatch::Unresolved,
            };
            print_json(&found)
        }
        ResolveTarget::Logo {
            name,
            brand,
            chain,
            kind,
            subtype,
        } => {
            let fields = BrandFields {
                brand: brand.as_deref(),
                chain: chain.as_deref(),
                kind: kind.as_deref(),
                subtype: subtype.as_deref(),
                name: &name,
            };
            let asset = LogoTable::default().resolve(&fields).to_string();
            print_json(&serde_json::json!({
                "asset": asset,
                "url": LogoTable::url_for(&config.reference.logo_base_url, &asset),
            }))
        }
        ResolveTarget::Aircraft { description } => {
            print_json(&serde_json::json!({ "code": aircraft::canonicalize(&description) }))
        }
    }
}

async fn watch(config: Config) -> Result<()> {
    let store = Arc::new(AirlineStore::open(&config.reference.airlines_path));
    let registry = Arc::new(AircraftRegistry::load_or_empty(&config.reference.aircraft_csv));
    let enricher = Arc::new(StateEnricher::new(
        store,
        registry,
        config.reference.asset_base_url.clone(),
    ));

    let (lat, lon) = location::resolve_center(&config.location).await;
    let bbox = BoundingBox::around(lat, lon, config.location.detection_radius);
    info!("Watching {:?}", bbox);

    let provider = FlightProvider::new(&config.api.opensky_root, config.opensky_credentials())?;
    let mut events = EventHandler::new(Duration::from_secs(1));
    let mut app = App::new(
        enricher.clone(),
        config.reference.reload_check_seconds as usize,
    );

    // Background API Poller
    let api_tx = events.tx.clone();
    let poll_every = Duration::from_secs(config.api.poll_interval_seconds.max(1));
    tokio::spawn(async move {
        loop {
            let snapshot = match provider.fetch_states(&bbox).await {
                Ok((time, flights)) => Some(enricher.enrich(time, flights)),
                Err(e) => {
                    error!("OpenSky poll failed: {:#}", e);
                    None
                }
            };
            let update = Event::StatesUpdate {
                snapshot,
                timestamp: Instant::now(),
            };
            if api_tx.send(update).is_err() {
                break;
            }
            tokio::time::sleep(poll_every).await;
        }
    });

    // Main loop
    while !app.should_quit {
        let Some(event) = events.next().await else {
            break;
        };
        if let Some(line) = app.handle(event) {
            println!("{}", line);
        }
    }

    info!("Stopped after {} ticks", app.tick_count);
    Ok(())
}
