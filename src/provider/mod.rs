pub mod aerodatabox;
pub mod aviationstack;
pub mod tequila;
pub mod travelpayouts;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::FlightError;
use crate::fetch::HttpClient;
use crate::model::FlightResult;
use crate::query::LegQuery;

pub use aerodatabox::AeroDataBox;
pub use aviationstack::Aviationstack;
pub use tequila::Tequila;
pub use travelpayouts::Travelpayouts;

/// A wrapper around one external flight-price API.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Name reported in `meta.apiUsed` when this provider serves a response.
    fn name(&self) -> &str;

    /// Whether the provider has what it needs (usually a credential) to be
    /// queried at all.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Fetches results for a single leg. An empty list means the provider
    /// answered but had nothing for this route.
    async fn fetch(&self, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError>;
}

/// Builds the provider list in priority order.
pub fn from_config(config: &ProviderConfig) -> Result<Vec<Box<dyn FlightProvider>>, FlightError> {
    let http = HttpClient::new(&config.fetch)?;
    Ok(vec![
        Box::new(Travelpayouts::new(config, http.clone())),
        Box::new(Aviationstack::new(config, http.clone())),
        Box::new(AeroDataBox::new(config, http.clone())),
        Box::new(Tequila::new(config, http)),
    ])
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, FlightError> {
    serde_json::from_str(body).map_err(|e| FlightError::Decode(e.to_string()))
}
