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

const PATH: &str = "/v1/flights";
const LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct FlightsResponse {
    #[serde(default)]
    data: Vec<Flight>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Flight {
    airline: Option<Carrier>,
    flight: Option<Carrier>,
    departure: Option<Schedule>,
    arrival: Option<Schedule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Carrier {
    iata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Schedule {
    scheduled: Option<String>,
}

/// Aviationstack flight schedules. It carries no fares, so prices are
/// estimates.
pub struct Aviationstack {
    access_key: Option<String>,
    base_url: String,
    http: HttpClient,
}

impl Aviationstack {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            access_key: credential(&config.aviationstack_key),
            base_url: config.endpoints.aviationstack.clone(),
            http,
        }
    }
}

fn airline_code(flight: &Flight) -> String {
    flight
        .airline
        .as_ref()
        .and_then(|a| a.iata.clone())
        .filter(|c| !c.is_empty())
        .or_else(|| {
            flight
                .flight
                .as_ref()
                .and_then(|f| f.iata.as_deref())
                .and_then(|f| f.get(..2))
                .map(String::from)
        })
        .unwrap_or_else(|| "XX".to_string())
}

fn scheduled_time(schedule: &Option<Schedule>, fallback: &str) -> String {
    schedule
        .as_ref()
        .and_then(|s| s.scheduled.as_deref())
        .and_then(time_of_day)
        .unwrap_or_else(|| fallback.to_string())
}

/// Maps a `/v1/flights` body onto results for `leg`, drawing estimated prices
/// from `rng`.
pub fn parse<R: Rng + ?Sized>(
    body: &str,
    leg: &LegQuery,
    rng: &mut R,
) -> Result<Vec<FlightResult>, FlightError> {
    let response: FlightsResponse = decode(body)?;

    let flights = response
        .data
        .iter()
        .take(LIMIT)
        .enumerate()
        .map(|(i, flight)| {
            let estimate = rng.gen_range(300.0..800.0) * f64::from(leg.passengers);
            FlightResult {
                id: leg.result_id("AS", i),
                airline: airline_code(flight),
                from: leg.origin.clone(),
                to: leg.destination.clone(),
                date: leg.date.clone(),
                price: round_cents(estimate),
                currency: leg.currency.clone(),
                duration: DEFAULT_DURATION.to_string(),
                stops: 0,
                departure_time: scheduled_time(&flight.departure, DEFAULT_DEPARTURE_TIME),
                arrival_time: scheduled_time(&flight.arrival, DEFAULT_ARRIVAL_TIME),
                booking_url: google_flights_url(&leg.origin, &leg.destination, &leg.date),
                price_estimated: true,
            }
        })
        .collect();

    Ok(flights)
}

#[async_trait]
impl FlightProvider for Aviationstack {
    fn name(&self) -> &str {
        "Aviationstack"
    }

    fn is_enabled(&self) -> bool {
        self.access_key.is_some()
    }

    async fn fetch(&self, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError> {
        let access_key = self
            .access_key
            .clone()
            .ok_or_else(|| FlightError::Internal("Aviationstack key not configured".into()))?;

        let params = [
            ("access_key", access_key),
            ("dep_iata", leg.origin.clone()),
            ("arr_iata", leg.destination.clone()),
            ("limit", LIMIT.to_string()),
        ];

        let body = self.http.get_text(&endpoint_url(&self.base_url, PATH), &params, &[]).await?;
        parse(&body, leg, &mut rand::thread_rng())
    }
}
