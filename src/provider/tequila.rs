use async_trait::async_trait;
use serde::Deserialize;

use super::{decode, FlightProvider};
use crate::config::{credential, endpoint_url, ProviderConfig};
use crate::error::FlightError;
use crate::fetch::HttpClient;
use crate::model::{
    format_duration, google_flights_url, round_cents, time_of_day, FlightResult,
    DEFAULT_ARRIVAL_TIME, DEFAULT_DEPARTURE_TIME, DEFAULT_DURATION,
};
use crate::query::LegQuery;

const PATH: &str = "/v2/search";
const LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    currency: Option<String>,
    #[serde(default)]
    data: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    price: Option<f64>,
    duration: Option<ItineraryDuration>,
    #[serde(default)]
    route: Vec<RouteSegment>,
    deep_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItineraryDuration {
    /// Seconds.
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RouteSegment {
    airline: Option<String>,
    local_departure: Option<String>,
    local_arrival: Option<String>,
}

/// Kiwi.com Tequila search. Fares are totals for all passengers.
pub struct Tequila {
    api_key: Option<String>,
    base_url: String,
    http: HttpClient,
}

impl Tequila {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            api_key: credential(&config.tequila_key),
            base_url: config.endpoints.tequila.clone(),
            http,
        }
    }
}

/// `2026-03-01` -> `01/03/2026`, the date format Tequila expects.
fn tequila_date(date: &str) -> String {
    match date.split('-').collect::<Vec<_>>().as_slice() {
        [yyyy, mm, dd] => format!("{dd}/{mm}/{yyyy}"),
        _ => date.to_string(),
    }
}

/// Maps a `/v2/search` body onto results for `leg`.
pub fn parse(body: &str, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError> {
    let response: SearchResponse = decode(body)?;
    let currency = response
        .currency
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| leg.currency.clone());

    let flights = response
        .data
        .into_iter()
        .filter(|it| it.price.is_some_and(|p| p >= 0.0) && !it.route.is_empty())
        .take(LIMIT)
        .enumerate()
        .map(|(i, it)| {
            let first = it.route.first();
            let last = it.route.last();
            FlightResult {
                id: leg.result_id("KW", i),
                airline: first
                    .and_then(|s| s.airline.clone())
                    .unwrap_or_else(|| "XX".to_string()),
                from: leg.origin.clone(),
                to: leg.destination.clone(),
                date: leg.date.clone(),
                price: round_cents(it.price.unwrap_or(0.0)),
                currency: currency.clone(),
                duration: it
                    .duration
                    .and_then(|d| d.total)
                    .filter(|secs| *secs > 0)
                    .map(|secs| format_duration(secs / 60))
                    .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
                stops: (it.route.len() as u32).saturating_sub(1),
                departure_time: first
                    .and_then(|s| s.local_departure.as_deref())
                    .and_then(time_of_day)
                    .unwrap_or_else(|| DEFAULT_DEPARTURE_TIME.to_string()),
                arrival_time: last
                    .and_then(|s| s.local_arrival.as_deref())
                    .and_then(time_of_day)
                    .unwrap_or_else(|| DEFAULT_ARRIVAL_TIME.to_string()),
                booking_url: it
                    .deep_link
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| {
                        google_flights_url(&leg.origin, &leg.destination, &leg.date)
                    }),
                price_estimated: false,
            }
        })
        .collect();

    Ok(flights)
}

#[async_trait]
impl FlightProvider for Tequila {
    fn name(&self) -> &str {
        "Tequila"
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| FlightError::Internal("Tequila key not configured".into()))?;

        let date = tequila_date(&leg.date);
        let mut params = vec![
            ("fly_from", leg.origin.clone()),
            ("fly_to", leg.destination.clone()),
            ("date_from", date.clone()),
            ("date_to", date),
            ("adults", leg.passengers.to_string()),
            ("selected_cabins", leg.cabin.code().to_string()),
            ("curr", leg.currency.clone()),
            ("sort", "price".to_string()),
            ("limit", LIMIT.to_string()),
        ];
        if let Some(max) = leg.max_stops {
            params.push(("max_stopovers", max.to_string()));
        }

        let body = self
            .http
            .get_text(&endpoint_url(&self.base_url, PATH), &params, &[("apikey", api_key)])
            .await?;
        parse(&body, leg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_iso_date() {
        assert_eq!(tequila_date("2026-03-01"), "01/03/2026");
        assert_eq!(tequila_date("garbage"), "garbage");
    }
}
