use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{decode, FlightProvider};
use crate::config::{credential, endpoint_url, ProviderConfig};
use crate::error::FlightError;
use crate::fetch::HttpClient;
use crate::model::{
    format_duration, round_cents, FlightResult, DEFAULT_ARRIVAL_TIME, DEFAULT_DEPARTURE_TIME,
    DEFAULT_DURATION,
};
use crate::query::LegQuery;

const PATH: &str = "/v2/prices/latest";
const LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<Price>,
}

#[derive(Debug, Deserialize)]
struct Price {
    airline: Option<String>,
    depart_date: Option<String>,
    value: Option<f64>,
    /// Minutes.
    duration: Option<u32>,
    number_of_changes: Option<u32>,
    gate: Option<String>,
}

/// Cached cheapest-fare data from Travelpayouts (Aviasales).
pub struct Travelpayouts {
    token: Option<String>,
    marker: Option<String>,
    base_url: String,
    http: HttpClient,
}

impl Travelpayouts {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            token: credential(&config.travelpayouts_token),
            marker: credential(&config.travelpayouts_marker),
            base_url: config.endpoints.travelpayouts.clone(),
            http,
        }
    }
}

fn aviasales_url(leg: &LegQuery, marker: Option<&str>) -> String {
    // Aviasales search path: ORIGIN + DDMM + DESTINATION + passengers.
    let ddmm = match leg.date.split('-').collect::<Vec<_>>().as_slice() {
        [_, mm, dd] => format!("{dd}{mm}"),
        _ => String::new(),
    };
    let mut url = format!(
        "https://www.aviasales.com/search/{}{ddmm}{}{}",
        leg.origin, leg.destination, leg.passengers
    );
    if let Some(marker) = marker {
        url.push_str("?marker=");
        url.push_str(marker);
    }
    url
}

/// Maps a `/v2/prices/latest` body onto results for `leg`.
pub fn parse(body: &str, leg: &LegQuery, marker: Option<&str>) -> Result<Vec<FlightResult>, FlightError> {
    let response: PricesResponse = decode(body)?;
    if !response.success {
        return Ok(Vec::new());
    }

    let flights = response
        .data
        .into_iter()
        .filter(|p| p.value.is_some_and(|v| v >= 0.0))
        .take(LIMIT)
        .enumerate()
        .map(|(i, p)| {
            let booking_url = p
                .gate
                .filter(|g| g.starts_with("http"))
                .unwrap_or_else(|| aviasales_url(leg, marker));
            FlightResult {
                id: leg.result_id("TP", i),
                airline: p.airline.unwrap_or_else(|| "Unknown".to_string()),
                from: leg.origin.clone(),
                to: leg.destination.clone(),
                date: p.depart_date.unwrap_or_else(|| leg.date.clone()),
                price: round_cents(p.value.unwrap_or(0.0) * f64::from(leg.passengers)),
                currency: leg.currency.clone(),
                duration: p
                    .duration
                    .filter(|d| *d > 0)
                    .map(format_duration)
                    .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
                stops: p.number_of_changes.unwrap_or(0),
                departure_time: DEFAULT_DEPARTURE_TIME.to_string(),
                arrival_time: DEFAULT_ARRIVAL_TIME.to_string(),
                booking_url,
                price_estimated: false,
            }
        })
        .collect();

    Ok(flights)
}

#[async_trait]
impl FlightProvider for Travelpayouts {
    fn name(&self) -> &str {
        "Travelpayouts"
    }

    fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    async fn fetch(&self, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError> {
        let token = self
            .token
            .clone()
            .ok_or_else(|| FlightError::Internal("Travelpayouts token not configured".into()))?;

        let params = [
            ("origin", leg.origin.clone()),
            ("destination", leg.destination.clone()),
            ("depart_date", leg.date.clone()),
            ("currency", leg.currency.to_lowercase()),
            ("token", token),
            ("limit", LIMIT.to_string()),
        ];

        let body = self.http.get_text(&endpoint_url(&self.base_url, PATH), &params, &[]).await?;
        debug!(bytes = body.len(), "travelpayouts response");
        parse(&body, leg, self.marker.as_deref())
    }
}
