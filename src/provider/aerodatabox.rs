use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;

use super::{decode, FlightProvider};
use crate::config::{credential, endpoint_url, ProviderConfig};
use crate::error::FlightError;
use crate::fetch::HttpClient;
use crate::model::{
    google_flights_url, round_cents, time_of_day, FlightResult, DEFAULT_ARRIVAL_TIME,
    DEFAULT_DEPARTURE_TIME, DEFAULT_DURATION,
};
use crate::query::LegQuery;

const HOST: &str = "aerodatabox.p.rapidapi.com";
const LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct DeparturesResponse {
    #[serde(default)]
    departures: Vec<Movement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Movement {
    airline: Option<Airline>,
    departure: Option<Endpoint>,
    arrival: Option<Endpoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Airline {
    iata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Endpoint {
    airport: Option<Airport>,
    scheduled_time: Option<LocalTime>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Airport {
    iata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalTime {
    local: Option<String>,
}

/// AeroDataBox airport departure boards via RapidAPI. Schedules only; prices
/// are estimates.
pub struct AeroDataBox {
    api_key: Option<String>,
    base_url: String,
    http: HttpClient,
}

impl AeroDataBox {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            api_key: credential(&config.rapidapi_key),
            base_url: config.endpoints.aerodatabox.clone(),
            http,
        }
    }
}

fn local_time(endpoint: &Option<Endpoint>, fallback: &str) -> String {
    endpoint
        .as_ref()
        .and_then(|e| e.scheduled_time.as_ref())
        .and_then(|t| t.local.as_deref())
        .and_then(time_of_day)
        .unwrap_or_else(|| fallback.to_string())
}

fn arrives_at(movement: &Movement, destination: &str) -> bool {
    movement
        .arrival
        .as_ref()
        .and_then(|a| a.airport.as_ref())
        .and_then(|a| a.iata.as_deref())
        .is_some_and(|iata| iata.eq_ignore_ascii_case(destination))
}

/// Maps a departure board onto results for `leg`, keeping only flights that
/// land at the leg's destination.
pub fn parse<R: Rng + ?Sized>(
    body: &str,
    leg: &LegQuery,
    rng: &mut R,
) -> Result<Vec<FlightResult>, FlightError> {
    let response: DeparturesResponse = decode(body)?;

    let flights = response
        .departures
        .iter()
        .filter(|m| arrives_at(m, &leg.destination))
        .take(LIMIT)
        .enumerate()
        .map(|(i, movement)| {
            let estimate = rng.gen_range(250.0..850.0) * f64::from(leg.passengers);
            FlightResult {
                id: leg.result_id("ADB", i),
                airline: movement
                    .airline
                    .as_ref()
                    .and_then(|a| a.iata.clone())
                    .unwrap_or_else(|| "XX".to_string()),
                from: leg.origin.clone(),
                to: leg.destination.clone(),
                date: leg.date.clone(),
                price: round_cents(estimate),
                currency: leg.currency.clone(),
                duration: DEFAULT_DURATION.to_string(),
                stops: 0,
                departure_time: local_time(&movement.departure, DEFAULT_DEPARTURE_TIME),
                arrival_time: local_time(&movement.arrival, DEFAULT_ARRIVAL_TIME),
                booking_url: google_flights_url(&leg.origin, &leg.destination, &leg.date),
                price_estimated: true,
            }
        })
        .collect();

    Ok(flights)
}

#[async_trait]
impl FlightProvider for AeroDataBox {
    fn name(&self) -> &str {
        "AeroDataBox"
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| FlightError::Internal("RapidAPI key not configured".into()))?;

        let path = format!(
            "/flights/airports/iata/{origin}/{date}T00:00/{date}T23:59",
            origin = leg.origin,
            date = leg.date,
        );
        let url = endpoint_url(&self.base_url, &path);
        let params = [
            ("withLocation", "false".to_string()),
            ("direction", "Departure".to_string()),
        ];
        let headers = [
            ("X-RapidAPI-Key", api_key),
            ("X-RapidAPI-Host", HOST.to_string()),
        ];

        let body = self.http.get_text(&url, &params, &headers).await?;
        parse(&body, leg, &mut rand::thread_rng())
    }
}
