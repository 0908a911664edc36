use serde::{Deserialize, Serialize};

use crate::error::FlightError;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const MAX_PASSENGERS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.trim().to_lowercase().as_str() {
            "economy" => Ok(Self::Economy),
            "premium_economy" | "premium-economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(FlightError::Validation(format!("invalid cabin class: {s}"))),
        }
    }

    /// Single-letter cabin code used by Kiwi-style APIs.
    pub fn code(self) -> &'static str {
        match self {
            Self::Economy => "M",
            Self::PremiumEconomy => "W",
            Self::Business => "C",
            Self::First => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "oneway")]
    OneWay,
    #[serde(rename = "return")]
    Return,
    #[serde(rename = "multi-city")]
    MultiCity,
}

impl TripType {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.trim().to_lowercase().as_str() {
            "oneway" | "one-way" => Ok(Self::OneWay),
            "return" | "round-trip" | "roundtrip" => Ok(Self::Return),
            "multi-city" | "multicity" => Ok(Self::MultiCity),
            _ => Err(FlightError::Validation(format!("invalid trip type: {s}"))),
        }
    }
}

/// Result ordering requested by the client. Without one, a source's own order
/// is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Price,
    Duration,
    Stops,
}

impl SortOrder {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.trim().to_lowercase().as_str() {
            "price" | "cheapest" => Ok(Self::Price),
            "duration" | "fastest" => Ok(Self::Duration),
            "stops" => Ok(Self::Stops),
            _ => Err(FlightError::Validation(format!(
                "invalid sort order: {s} (expected price, duration or stops)"
            ))),
        }
    }
}

/// Search form as posted by the client. Every field is optional on the wire so
/// that missing required fields surface as one validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub depart_date: Option<String>,
    pub return_date: Option<String>,
    pub passengers: Option<u32>,
    pub cabin_class: Option<String>,
    pub trip_type: Option<String>,
    pub currency: Option<String>,
    pub max_stops: Option<u32>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Return,
}

impl Direction {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Outbound => "OUT",
            Self::Return => "RET",
        }
    }
}

/// One directional leg handed to a provider.
#[derive(Debug, Clone)]
pub struct LegQuery {
    pub direction: Direction,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub passengers: u32,
    pub cabin: CabinClass,
    pub currency: String,
    pub max_stops: Option<u32>,
}

impl LegQuery {
    /// Provider-prefixed result id, e.g. `TP-OUT-3` for the third result.
    pub fn result_id(&self, prefix: &str, index: usize) -> String {
        format!("{prefix}-{}-{}", self.direction.tag(), index + 1)
    }
}

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
    pub return_date: Option<String>,
    pub passengers: u32,
    pub cabin: CabinClass,
    pub trip: TripType,
    pub currency: String,
    /// Upper bound on stops per result, if any.
    pub max_stops: Option<u32>,
    pub sort: Option<SortOrder>,
}

impl SearchParams {
    pub fn outbound(&self) -> LegQuery {
        LegQuery {
            direction: Direction::Outbound,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            date: self.depart_date.clone(),
            passengers: self.passengers,
            cabin: self.cabin,
            currency: self.currency.clone(),
            max_stops: self.max_stops,
        }
    }

    pub fn return_leg(&self) -> Option<LegQuery> {
        self.return_date.as_ref().map(|date| LegQuery {
            direction: Direction::Return,
            origin: self.destination.clone(),
            destination: self.origin.clone(),
            date: date.clone(),
            passengers: self.passengers,
            cabin: self.cabin,
            currency: self.currency.clone(),
            max_stops: self.max_stops,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate_airport(code: &str) -> Result<(), FlightError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FlightError::InvalidAirport(code.to_string()));
    }
    Ok(())
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub fn validate_date(date: &str) -> Result<(), FlightError> {
    let invalid = || FlightError::InvalidDate(date.to_string());
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 || parts[1].len() != 2 || parts[2].len() != 2 {
        return Err(invalid());
    }
    let year: u32 = parts[0].parse().map_err(|_| invalid())?;
    let month: u32 = parts[1].parse().map_err(|_| invalid())?;
    let day: u32 = parts[2].parse().map_err(|_| invalid())?;

    if year < 2000 || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    if day < 1 || day > days_in_month(year, month) {
        return Err(invalid());
    }

    Ok(())
}

impl SearchRequest {
    pub fn validate(&self) -> Result<SearchParams, FlightError> {
        let from = present(&self.from);
        let to = present(&self.to);
        let depart = present(&self.depart_date);

        let missing: Vec<&'static str> = [("from", from), ("to", to), ("departDate", depart)]
            .into_iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| name)
            .collect();

        let (Some(from), Some(to), Some(depart)) = (from, to, depart) else {
            return Err(FlightError::MissingFields(missing));
        };

        let origin = from.to_uppercase();
        let destination = to.to_uppercase();
        validate_airport(&origin)?;
        validate_airport(&destination)?;
        if origin == destination {
            return Err(FlightError::Validation(
                "origin and destination must differ".into(),
            ));
        }

        validate_date(depart)?;

        let passengers = match self.passengers {
            None | Some(0) => 1,
            Some(n) => n,
        };
        if passengers > MAX_PASSENGERS {
            return Err(FlightError::Validation(format!(
                "total passengers ({passengers}) exceeds maximum of {MAX_PASSENGERS}"
            )));
        }

        let cabin = present(&self.cabin_class)
            .map(CabinClass::from_str_loose)
            .transpose()?
            .unwrap_or(CabinClass::Economy);

        let requested_return = present(&self.return_date);
        let trip = match present(&self.trip_type) {
            Some(t) => TripType::from_str_loose(t)?,
            None if requested_return.is_some() => TripType::Return,
            None => TripType::OneWay,
        };

        // Only a return trip has a second leg; any other trip type drops the
        // return date.
        let return_date = match (trip, requested_return) {
            (TripType::Return, Some(ret)) => {
                validate_date(ret)?;
                // ISO dates compare correctly as strings.
                if ret < depart {
                    return Err(FlightError::Validation(
                        "return date cannot be before departure date".into(),
                    ));
                }
                Some(ret.to_string())
            }
            (TripType::Return, None) => {
                return Err(FlightError::Validation(
                    "return date is required for a return trip".into(),
                ));
            }
            _ => None,
        };

        let sort = present(&self.sort)
            .map(SortOrder::from_str_loose)
            .transpose()?;

        let currency = present(&self.currency)
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(SearchParams {
            origin,
            destination,
            depart_date: depart.to_string(),
            return_date,
            passengers,
            cabin,
            trip,
            currency,
            max_stops: self.max_stops,
            sort,
        })
    }
}
