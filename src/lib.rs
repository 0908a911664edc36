pub mod chain;
pub mod config;
pub mod error;
pub mod fetch;
pub mod mcp;
pub mod mock;
pub mod model;
pub mod provider;
pub mod query;
pub mod server;
pub mod table;

use chain::ProviderChain;
use config::ProviderConfig;
use error::FlightError;
use model::SearchResponse;
use query::SearchRequest;

/// One-shot search: builds the provider chain from `config` and resolves
/// `request` against it.
pub async fn search(
    request: SearchRequest,
    config: &ProviderConfig,
) -> Result<SearchResponse, FlightError> {
    let chain = ProviderChain::from_config(config)?;
    chain.resolve(request).await
}
