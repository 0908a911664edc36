use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;

use crate::chain::ProviderChain;
use crate::error::FlightError;
use crate::query::SearchRequest;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    #[schemars(description = "Departure airport IATA code, 3 letters. Example: LHR, JFK")]
    from: String,
    #[schemars(description = "Arrival airport IATA code, 3 letters. Example: JFK, DAC")]
    to: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format. Example: 2026-03-01")]
    date: String,
    #[schemars(description = "Return date in YYYY-MM-DD for a return trip")]
    return_date: Option<String>,
    #[schemars(description = "Number of passengers, 1-9. Default: 1")]
    passengers: Option<u32>,
    #[schemars(description = "One of: economy, premium_economy, business, first. Default: economy")]
    cabin_class: Option<String>,
    #[schemars(description = "Currency code. Examples: USD, EUR, GBP. Default: USD")]
    currency: Option<String>,
    #[schemars(description = "One of: oneway, return, multi-city. Default: return when return_date is set, else oneway")]
    trip_type: Option<String>,
    #[schemars(description = "Only include flights with at most this many stops. 0 = nonstop only")]
    max_stops: Option<u32>,
    #[schemars(description = "Sort results by: price, duration or stops. Default: source order")]
    sort: Option<String>,
    #[schemars(description = "Return only the N cheapest results, N >= 1")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct OpenUrlArgs {
    #[schemars(description = "URL to open. Must start with http:// or https://")]
    url: String,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

fn to_request(args: SearchArgs) -> SearchRequest {
    SearchRequest {
        from: Some(args.from),
        to: Some(args.to),
        depart_date: Some(args.date),
        return_date: args.return_date,
        passengers: args.passengers,
        cabin_class: args.cabin_class,
        trip_type: args.trip_type,
        currency: args.currency,
        max_stops: args.max_stops,
        sort: args.sort,
    }
}

#[derive(Clone)]
struct FarechainMcp {
    chain: Arc<ProviderChain>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FarechainMcp {
    fn new(chain: Arc<ProviderChain>) -> Self {
        Self {
            chain,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search for flights and return results as JSON. Tries the configured flight-price providers in priority order and falls back to demo data when none answers; meta.apiUsed names the source and priceEstimated marks synthetic prices. Each result has a bookingUrl that can be passed to open_url."
    )]
    async fn farechain_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let top = args.top;
        if top == Some(0) {
            return tool_error("top must be at least 1");
        }
        match self.chain.resolve(to_request(args)).await {
            Ok(mut response) => {
                if let Some(n) = top {
                    response.keep_cheapest(n);
                }
                match serde_json::to_string_pretty(&response) {
                    Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
                    Err(e) => tool_error(format!("failed to encode results: {e}")),
                }
            }
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(description = "Open a URL, such as a flight's bookingUrl, in the default web browser.")]
    async fn open_url(
        &self,
        Parameters(args): Parameters<OpenUrlArgs>,
    ) -> Result<CallToolResult, McpError> {
        if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
            return tool_error("URL must start with http:// or https://");
        }

        match open::that(&args.url) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Opened: {}",
                args.url
            ))])),
            Err(e) => tool_error(format!("failed to open browser: {e}")),
        }
    }
}

#[tool_handler]
impl ServerHandler for FarechainMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "farechain".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Flight price search. Call farechain_search with from, to and date; add return_date for a return trip. Results flagged priceEstimated are not real fares. To book, pass a result's bookingUrl to open_url.".into(),
            ),
        }
    }
}

pub async fn run(chain: ProviderChain) -> Result<(), FlightError> {
    let service = FarechainMcp::new(Arc::new(chain))
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| FlightError::Internal(format!("failed to start MCP server: {e}")))?;
    service
        .waiting()
        .await
        .map_err(|e| FlightError::Internal(format!("MCP server error: {e}")))?;
    Ok(())
}
