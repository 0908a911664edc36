use std::net::SocketAddr;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farechain::chain::ProviderChain;
use farechain::config::{Endpoints, ProviderConfig};
use farechain::error::FlightError;
use farechain::fetch::FetchOptions;
use farechain::model::SearchResponse;
use farechain::query::SearchRequest;
use farechain::table;

#[derive(Parser)]
#[command(
    name = "farechain",
    about = "Search flight prices across several providers, with demo data as a fallback",
    version,
    after_help = "\
Examples:
  farechain search -f LHR -t JFK -d 2026-06-01
  farechain search -f LHR -t DAC -d 2026-06-01 --return-date 2026-06-20 --passengers 2
  farechain search -f LHR -t JFK -d 2026-06-01 --json --pretty
  farechain serve --bind 0.0.0.0:3000

Providers are enabled by their credentials (flags or environment):
  TRAVELPAYOUTS_TOKEN, AVIATIONSTACK_KEY, RAPIDAPI_KEY, TEQUILA_API_KEY"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search for flights",
        long_about = "Search for flights between two airports.\n\
            Providers are tried in order (Travelpayouts, Aviationstack, AeroDataBox, Tequila); \
            the first with results wins. Without any usable provider, demo data is shown.",
        after_help = "\
Examples:
  One-way:      farechain search -f LHR -t JFK -d 2026-06-01
  Return:       farechain search -f LHR -t JFK -d 2026-06-01 --return-date 2026-06-15
  Business:     farechain search -f LHR -t JFK -d 2026-06-01 --cabin business
  JSON output:  farechain search -f LHR -t JFK -d 2026-06-01 --json --pretty
  Cheapest 3:   farechain search -f LHR -t JFK -d 2026-06-01 --compact --top 3
  Nonstop only: farechain search -f LHR -t JFK -d 2026-06-01 --max-stops 0 --sort duration"
    )]
    Search(SearchArgs),
    #[command(about = "Serve the search endpoint over HTTP (POST /api/flights)")]
    Serve(ServeArgs),
    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp(ProviderArgs),
}

#[derive(clap::Args)]
struct ProviderArgs {
    #[arg(long, env = "TRAVELPAYOUTS_TOKEN", hide_env_values = true, value_name = "TOKEN",
        help = "Travelpayouts API token")]
    travelpayouts_token: Option<String>,

    #[arg(long, env = "TRAVELPAYOUTS_MARKER", hide_env_values = true, value_name = "MARKER",
        help = "Travelpayouts affiliate marker for booking links")]
    travelpayouts_marker: Option<String>,

    #[arg(long, env = "AVIATIONSTACK_KEY", hide_env_values = true, value_name = "KEY",
        help = "Aviationstack access key")]
    aviationstack_key: Option<String>,

    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true, value_name = "KEY",
        help = "RapidAPI key for AeroDataBox")]
    rapidapi_key: Option<String>,

    #[arg(long, env = "TEQUILA_API_KEY", hide_env_values = true, value_name = "KEY",
        help = "Kiwi.com Tequila API key")]
    tequila_key: Option<String>,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy for provider requests")]
    proxy: Option<String>,

    #[arg(long, default_value = "30", value_name = "SECS", help = "HTTP request timeout")]
    timeout: u64,

    #[arg(long, default_value = "15", value_name = "SECS",
        help = "Give up on a provider call after this long")]
    call_timeout: u64,

    #[arg(long, value_name = "N", help = "Seed the demo-data generator for repeatable output")]
    seed: Option<u64>,
}

impl ProviderArgs {
    fn to_config(&self) -> ProviderConfig {
        ProviderConfig {
            travelpayouts_token: self.travelpayouts_token.clone(),
            travelpayouts_marker: self.travelpayouts_marker.clone(),
            aviationstack_key: self.aviationstack_key.clone(),
            rapidapi_key: self.rapidapi_key.clone(),
            tequila_key: self.tequila_key.clone(),
            endpoints: Endpoints::default(),
            fetch: FetchOptions {
                proxy: self.proxy.clone(),
                timeout: self.timeout,
            },
            call_timeout: Duration::from_secs(self.call_timeout),
            mock_seed: self.seed,
        }
    }
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(short, long, value_name = "IATA", help = "Departure airport code",
        long_help = "Departure airport IATA code (3 letters, e.g. LHR, JFK).")]
    from: Option<String>,

    #[arg(short, long, value_name = "IATA", help = "Arrival airport code",
        long_help = "Arrival airport IATA code (3 letters, e.g. JFK, DAC).")]
    to: Option<String>,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Departure date")]
    date: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Return date (makes it a return trip)")]
    return_date: Option<String>,

    #[arg(long, value_name = "TYPE", help = "Trip type [oneway, return, multi-city]")]
    trip: Option<String>,

    #[arg(long, default_value = "economy", value_name = "CLASS",
        help = "Cabin class [economy, premium_economy, business, first]")]
    cabin: String,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of passengers (1-9)")]
    passengers: u32,

    #[arg(long, default_value = "USD", value_name = "CODE", help = "Currency code (e.g. USD, EUR, GBP)")]
    currency: String,

    #[arg(long, value_name = "N", help = "Only show flights with at most N stops")]
    max_stops: Option<u32>,

    #[arg(long, value_name = "ORDER", help = "Sort results [price, duration, stops]")]
    sort: Option<String>,

    #[arg(long, value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
        help = "Show only the N cheapest results")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-flight output (recommended for scripts and AI agents)")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(long, help = "Open the cheapest result's booking page")]
    open: bool,

    #[command(flatten)]
    providers: ProviderArgs,
}

#[derive(clap::Args)]
struct ServeArgs {
    #[arg(long, env = "FARECHAIN_BIND", default_value = "127.0.0.1:3000", value_name = "ADDR",
        help = "Address to listen on")]
    bind: SocketAddr,

    #[command(flatten)]
    providers: ProviderArgs,
}

fn is_json(args: &SearchArgs) -> bool {
    args.json || args.pretty
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn error_code(err: &FlightError) -> i32 {
    match err {
        FlightError::MissingFields(_)
        | FlightError::InvalidAirport(_)
        | FlightError::InvalidDate(_)
        | FlightError::Validation(_) => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_) => 3,
        FlightError::RateLimited | FlightError::HttpStatus(_) | FlightError::Decode(_) => 4,
        FlightError::Internal(_) => 1,
    }
}

fn error_kind(err: &FlightError) -> &'static str {
    match err {
        FlightError::MissingFields(_) => "missing_fields",
        FlightError::InvalidAirport(_) => "invalid_airport",
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Validation(_) => "validation_error",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::RateLimited => "rate_limited",
        FlightError::HttpStatus(_) => "http_error",
        FlightError::Decode(_) => "decode_error",
        FlightError::Internal(_) => "internal_error",
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn build_request(args: &SearchArgs) -> SearchRequest {
    SearchRequest {
        from: args.from.clone(),
        to: args.to.clone(),
        depart_date: args.date.clone(),
        return_date: args.return_date.clone(),
        passengers: Some(args.passengers),
        cabin_class: Some(args.cabin.clone()),
        trip_type: args.trip.clone(),
        currency: Some(args.currency.clone()),
        max_stops: args.max_stops,
        sort: args.sort.clone(),
    }
}

fn print_result(response: &SearchResponse, args: &SearchArgs) {
    if is_json(args) {
        let output = if args.pretty {
            serde_json::to_string_pretty(response)
        } else {
            serde_json::to_string(response)
        };
        match output {
            Ok(out) => println!("{out}"),
            Err(e) => die(&FlightError::Internal(e.to_string()), true),
        }
    } else if args.compact {
        println!("{}", table::render_compact(response));
    } else {
        println!("{}", table::render(response));
    }
}

fn open_cheapest(response: &SearchResponse, json_mode: bool) {
    let Some(cheapest) = response
        .flights
        .iter()
        .min_by(|a, b| a.price.total_cmp(&b.price))
    else {
        return;
    };
    if !json_mode {
        println!("Opening: {}", cheapest.booking_url);
    }
    if let Err(e) = open::that(&cheapest.booking_url) {
        die(
            &FlightError::Validation(format!("failed to open browser: {e}")),
            json_mode,
        );
    }
}

async fn run_search(args: SearchArgs) {
    let json_mode = is_json(&args);

    let chain = match ProviderChain::from_config(&args.providers.to_config()) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    match chain.resolve(build_request(&args)).await {
        Ok(mut response) => {
            if let Some(n) = args.top {
                response.keep_cheapest(n);
            }
            print_result(&response, &args);
            if args.open {
                open_cheapest(&response, json_mode);
            }
        }
        Err(e) => die(&e, json_mode),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            init_tracing("farechain=warn");
            run_search(args).await;
        }
        Commands::Serve(args) => {
            init_tracing("farechain=info,tower_http=info");
            let result = match ProviderChain::from_config(&args.providers.to_config()) {
                Ok(chain) => farechain::server::serve(chain, args.bind).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                die(&e, false);
            }
        }
        Commands::Mcp(providers) => {
            init_tracing("farechain=info");
            let result = match ProviderChain::from_config(&providers.to_config()) {
                Ok(chain) => farechain::mcp::run(chain).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                die(&e, false);
            }
        }
    }
}
