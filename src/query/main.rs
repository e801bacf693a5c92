//! Zone lookup server.
//!
//! Provides an HTTP API that geocodes an address and reports its operational
//! zone, subregion and region, plus a one-shot `lookup` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use zonas::config::Config;
use zonas::geocoder::NominatimClient;
use zonas::models::ZoneLayer;
use zonas::pip::{load_zone_layer, ZoneSource};
use zonas::search::{
    AddressQuery, SearchError, SearchOutcome, SearchResult, SearchService, ZoneCatalog, ZoneReport,
};
use zonas::Point;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Address to zone lookup")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "zonas.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "0.0.0.0:3000")]
        listen: String,
    },
    /// Look up a single address and print the result as JSON
    Lookup {
        /// Free-text address, e.g. "Av. Corrientes 348"
        address: String,
    },
}

/// Application state shared across handlers
struct AppState {
    service: SearchService<NominatimClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = if args.config.exists() {
        info!("Loading config from {}", args.config.display());
        Config::load_from_file(&args.config)?
    } else {
        warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
        Config::default()
    };

    let service = build_service(&config)?;

    match args.command {
        Command::Serve { listen } => serve(service, &listen).await,
        Command::Lookup { address } => {
            let outcome = service
                .search(&AddressQuery::Free(address))
                .await
                .context("Search failed")?;
            let body = match outcome {
                SearchOutcome::Found(result) => {
                    serde_json::to_string_pretty(&SearchResponse::from(result))?
                }
                SearchOutcome::NotFound { address } => {
                    serde_json::to_string_pretty(&NotFoundResponse::new(address))?
                }
            };
            println!("{}", body);
            Ok(())
        }
    }
}

fn build_service(config: &Config) -> Result<SearchService<NominatimClient>> {
    let zones = ZoneCatalog {
        operational: load_layer("operational", &config.zones.operational),
        subregions: load_layer("subregion", &config.zones.subregions),
    };

    Ok(SearchService::new(
        config.geocoder_client()?,
        config.normalizer(),
        config.region_classifier()?,
        zones,
        config.geocoder.city_qualifier.clone(),
    )
    .with_border_threshold(config.search.border_threshold_m))
}

/// Load a zone layer; a failure leaves the layer absent instead of aborting
fn load_layer(kind: &str, source: &ZoneSource) -> Option<ZoneLayer> {
    let Some(path) = source.path.as_deref() else {
        warn!("No {} zone file configured", kind);
        return None;
    };

    match load_zone_layer(path, source) {
        Ok(layer) => {
            info!("Loaded {} {} zones", layer.len(), kind);
            Some(layer)
        }
        Err(e) => {
            error!("Failed to load {} zones: {}", kind, e);
            None
        }
    }
}

async fn serve(service: SearchService<NominatimClient>, listen: &str) -> Result<()> {
    let app = build_router(service);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(service: SearchService<NominatimClient>) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/search", get(search_handler))
        .route("/v1/locate", get(locate_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let zones = state.service.zones();
    let operational_zones = zones.operational.as_ref().map(ZoneLayer::len);
    let subregions = zones.subregions.as_ref().map(ZoneLayer::len);

    Json(HealthResponse {
        status: if operational_zones.is_some() && subregions.is_some() {
            "ok"
        } else {
            "degraded"
        },
        operational_zones,
        subregions,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    operational_zones: Option<usize>,
    subregions: Option<usize>,
}

/// Geocode an address and classify it
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = params.into_query().ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Provide either 'address' or 'street' and 'number'",
        )
    })?;

    match state.service.search(&query).await {
        Ok(SearchOutcome::Found(result)) => Ok(Json(SearchResponse::from(result))),
        Ok(SearchOutcome::NotFound { address }) => Err(error_response(
            StatusCode::NOT_FOUND,
            &NotFoundResponse::new(address).message,
        )),
        Err(SearchError::Geocoder(e)) => {
            error!("Search failed: {}", e);
            Err(error_response(
                StatusCode::BAD_GATEWAY,
                "Could not reach the geocoding service, please try again",
            ))
        }
        Err(e) => Err(error_response(StatusCode::BAD_REQUEST, &e.to_string())),
    }
}

/// Classify a coordinate without geocoding
async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQueryParams>,
) -> Result<Json<ZoneResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !params.lon.is_finite() || !params.lat.is_finite() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Coordinates must be finite numbers",
        ));
    }

    let report = state
        .service
        .classify_point(&Point::new(params.lon, params.lat));
    Ok(Json(ZoneResponse::from(report)))
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

#[derive(Deserialize)]
struct SearchQueryParams {
    /// Free-text address
    address: Option<String>,
    /// Street name, used together with `number`
    street: Option<String>,
    /// House number
    number: Option<String>,
}

impl SearchQueryParams {
    fn into_query(self) -> Option<AddressQuery> {
        match (self.street, self.number, self.address) {
            (Some(street), Some(number), _) => Some(AddressQuery::StreetNumber { street, number }),
            (_, _, Some(address)) => Some(AddressQuery::Free(address)),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct LocateQueryParams {
    lon: f64,
    lat: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct NotFoundResponse {
    address: String,
    message: String,
}

impl NotFoundResponse {
    fn new(address: String) -> Self {
        let message = format!(
            "No location found for '{}'. Try another format or check the address.",
            address
        );
        Self { address, message }
    }
}

#[derive(Serialize)]
struct ZoneResponse {
    operational_zone: String,
    /// Operational zone was picked by nearest centroid
    approximate: bool,
    subregion: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_distance_m: Option<f64>,
}

impl From<ZoneReport> for ZoneResponse {
    fn from(report: ZoneReport) -> Self {
        Self {
            operational_zone: report.operational_zone.label(),
            approximate: report.operational_zone.is_approximate(),
            subregion: report.subregion.label(),
            region: report.region,
            border_distance_m: report.border_distance_m.map(f64::round),
        }
    }
}

#[derive(Serialize)]
struct SearchResponse {
    address: String,
    display_address: String,
    lon: f64,
    lat: f64,
    #[serde(flatten)]
    zones: ZoneResponse,
}

impl From<SearchResult> for SearchResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            address: result.address,
            display_address: result.display_address,
            lon: result.point.x(),
            lat: result.point.y(),
            zones: ZoneResponse::from(result.zones),
        }
    }
}
