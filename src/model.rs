use serde::{Deserialize, Serialize};

use crate::query::{SortOrder, TripType};

pub const DEFAULT_DURATION: &str = "8h 30m";
pub const DEFAULT_DEPARTURE_TIME: &str = "08:00";
pub const DEFAULT_ARRIVAL_TIME: &str = "16:30";

/// One bookable option for a single leg, in the shape every source is
/// normalized to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightResult {
    pub id: String,
    pub airline: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub price: f64,
    pub currency: String,
    pub duration: String,
    pub stops: u32,
    pub departure_time: String,
    pub arrival_time: String,
    pub booking_url: String,
    /// Set when the source had no fare and `price` is a synthetic estimate.
    #[serde(default)]
    pub price_estimated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub count: usize,
    pub currency: String,
    pub trip_type: TripType,
    pub api_used: String,
    #[serde(default)]
    pub return_leg_missing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Highlights>,
}

/// Result ids worth pointing out in a response summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    /// The cheapest result.
    pub best_value: String,
    /// Shortest flight, when it is not also the best value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastest: Option<String>,
    /// Cheapest nonstop flight, when it is not also the best value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheapest_direct: Option<String>,
}

impl Highlights {
    pub fn from_flights(flights: &[FlightResult]) -> Option<Self> {
        let cheapest = flights.iter().min_by(|a, b| a.price.total_cmp(&b.price))?;
        let fastest = flights
            .iter()
            .filter_map(|f| duration_minutes(&f.duration).map(|m| (m, f)))
            .min_by_key(|(m, _)| *m)
            .map(|(_, f)| f);
        let direct = flights
            .iter()
            .filter(|f| f.stops == 0)
            .min_by(|a, b| a.price.total_cmp(&b.price));

        let other = |f: Option<&FlightResult>| {
            f.filter(|f| f.id != cheapest.id).map(|f| f.id.clone())
        };
        Some(Self {
            best_value: cheapest.id.clone(),
            fastest: other(fastest),
            cheapest_direct: other(direct),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub flights: Vec<FlightResult>,
    pub meta: SearchMeta,
}

impl SearchResponse {
    /// Keeps only the `n` cheapest flights.
    pub fn keep_cheapest(&mut self, n: usize) {
        self.flights.sort_by(|a, b| a.price.total_cmp(&b.price));
        self.flights.truncate(n);
        self.meta.count = self.flights.len();
        self.meta.highlights = Highlights::from_flights(&self.flights);
    }

    pub fn find(&self, id: &str) -> Option<&FlightResult> {
        self.flights.iter().find(|f| f.id == id)
    }
}

/// Stable sort, so ties keep the source's order.
pub fn sort_flights(flights: &mut [FlightResult], order: SortOrder) {
    match order {
        SortOrder::Price => flights.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::Duration => {
            flights.sort_by_key(|f| duration_minutes(&f.duration).unwrap_or(u32::MAX))
        }
        SortOrder::Stops => flights.sort_by_key(|f| f.stops),
    }
}

pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Inverse of [`format_duration`]; also accepts a bare `"9h"`.
pub fn duration_minutes(duration: &str) -> Option<u32> {
    let (hours, rest) = duration.split_once('h')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes = rest.trim().trim_end_matches('m').trim();
    let minutes: u32 = if minutes.is_empty() {
        0
    } else {
        minutes.parse().ok()?
    };
    Some(hours * 60 + minutes)
}

/// Extracts `HH:MM` from timestamps like `2026-03-01T08:15:00+00:00` or
/// `2026-03-01 08:15+01:00`.
pub fn time_of_day(timestamp: &str) -> Option<String> {
    let (_, time) = timestamp.split_once(['T', ' '])?;
    let hhmm = time.get(..5)?;
    let bytes = hhmm.as_bytes();
    let well_formed = bytes[2] == b':'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);
    well_formed.then(|| hhmm.to_string())
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn google_flights_url(from: &str, to: &str, date: &str) -> String {
    format!("https://www.google.com/travel/flights?q=flights+from+{from}+to+{to}+on+{date}")
}
