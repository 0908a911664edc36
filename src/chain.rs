use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::FlightError;
use crate::mock::{self, MOCK_SOURCE};
use crate::model::{sort_flights, FlightResult, Highlights, SearchMeta, SearchResponse};
use crate::provider::{self, FlightProvider};
use crate::query::{LegQuery, SearchParams, SearchRequest};

/// What one provider managed to produce for a search.
enum Attempt {
    /// Every requested leg has results.
    Complete(Vec<FlightResult>),
    /// Round trip where only the outbound leg has results.
    OutboundOnly(Vec<FlightResult>),
    Unavailable,
}

/// Ordered fallback over flight providers, ending in mock data.
///
/// Providers are tried one at a time in the order given. The first one with
/// results for every leg wins. A round trip with only outbound results is kept
/// as a fallback below any complete result and above mock data.
pub struct ProviderChain {
    providers: Vec<Box<dyn FlightProvider>>,
    call_timeout: Duration,
    mock_seed: Option<u64>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn FlightProvider>>) -> Self {
        Self {
            providers,
            call_timeout: ProviderConfig::default().call_timeout,
            mock_seed: None,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, FlightError> {
        let chain = Self::new(provider::from_config(config)?).with_call_timeout(config.call_timeout);
        Ok(match config.mock_seed {
            Some(seed) => chain.with_mock_seed(seed),
            None => chain,
        })
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_mock_seed(mut self, seed: u64) -> Self {
        self.mock_seed = Some(seed);
        self
    }

    /// Names of providers that have the configuration they need.
    pub fn enabled_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_enabled())
            .map(|p| p.name())
            .collect()
    }

    /// Validates `request` and resolves it. Fails only on invalid input.
    pub async fn resolve(&self, request: SearchRequest) -> Result<SearchResponse, FlightError> {
        let params = request.validate()?;
        Ok(self.resolve_params(&params).await)
    }

    /// Resolves already validated parameters. Always yields at least one
    /// result.
    pub async fn resolve_params(&self, params: &SearchParams) -> SearchResponse {
        info!(
            from = %params.origin,
            to = %params.destination,
            depart = %params.depart_date,
            return_date = ?params.return_date,
            currency = %params.currency,
            "flight search"
        );

        let mut partial: Option<(&str, Vec<FlightResult>)> = None;

        for provider in &self.providers {
            if !provider.is_enabled() {
                debug!(provider = provider.name(), "provider not configured, skipping");
                continue;
            }

            match self.attempt(provider.as_ref(), params).await {
                Attempt::Complete(flights) => {
                    info!(provider = provider.name(), results = flights.len(), "using provider");
                    return respond(params, flights, provider.name(), false);
                }
                Attempt::OutboundOnly(flights) => {
                    info!(
                        provider = provider.name(),
                        results = flights.len(),
                        "return leg empty, keeping outbound results as fallback"
                    );
                    if partial.is_none() {
                        partial = Some((provider.name(), flights));
                    }
                }
                Attempt::Unavailable => {}
            }
        }

        if let Some((source, flights)) = partial {
            info!(provider = source, "using outbound-only results");
            return respond(params, flights, source, true);
        }

        info!("no provider returned results, using mock data");
        let mut rng = match self.mock_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let flights = mock::generate(params, &mut rng);
        respond(params, flights, MOCK_SOURCE, false)
    }

    async fn attempt(&self, provider: &dyn FlightProvider, params: &SearchParams) -> Attempt {
        let outbound = params.outbound();

        match params.return_leg() {
            None => match self.fetch_leg(provider, &outbound).await {
                Some(flights) => Attempt::Complete(flights),
                None => Attempt::Unavailable,
            },
            Some(inbound) => {
                let (out, back) = tokio::join!(
                    self.fetch_leg(provider, &outbound),
                    self.fetch_leg(provider, &inbound)
                );
                match (out, back) {
                    (Some(mut out), Some(back)) => {
                        out.extend(back);
                        Attempt::Complete(out)
                    }
                    (Some(out), None) => Attempt::OutboundOnly(out),
                    (None, _) => Attempt::Unavailable,
                }
            }
        }
    }

    /// Fetches one leg, absorbing every failure. `None` means nothing usable.
    async fn fetch_leg(&self, provider: &dyn FlightProvider, leg: &LegQuery) -> Option<Vec<FlightResult>> {
        let leg_tag = leg.direction.tag();
        let result = match tokio::time::timeout(self.call_timeout, provider.fetch(leg)).await {
            Ok(result) => result,
            Err(_) => Err(FlightError::Timeout),
        };

        match result {
            Ok(mut flights) => {
                if let Some(max) = leg.max_stops {
                    flights.retain(|f| f.stops <= max);
                }
                if flights.is_empty() {
                    debug!(provider = provider.name(), leg = leg_tag, "no results");
                    None
                } else {
                    Some(flights)
                }
            }
            Err(e) => {
                warn!(provider = provider.name(), leg = leg_tag, error = %e, "provider unavailable");
                None
            }
        }
    }
}

fn respond(
    params: &SearchParams,
    mut flights: Vec<FlightResult>,
    source: &str,
    return_leg_missing: bool,
) -> SearchResponse {
    if let Some(order) = params.sort {
        sort_flights(&mut flights, order);
    }
    SearchResponse {
        success: true,
        meta: SearchMeta {
            count: flights.len(),
            currency: params.currency.clone(),
            trip_type: params.trip,
            api_used: source.to_string(),
            return_leg_missing,
            highlights: Highlights::from_flights(&flights),
        },
        flights,
    }
}
