use std::time::Duration;

use crate::fetch::FetchOptions;

/// Base URLs of the provider APIs, without a trailing path.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub travelpayouts: String,
    pub aviationstack: String,
    pub aerodatabox: String,
    pub tequila: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            travelpayouts: "https://api.travelpayouts.com".into(),
            aviationstack: "http://api.aviationstack.com".into(),
            aerodatabox: "https://aerodatabox.p.rapidapi.com".into(),
            tequila: "https://tequila-api.kiwi.com".into(),
        }
    }
}

impl Endpoints {
    /// Points every provider at the same host, e.g. a local stub or relay.
    pub fn all(base: &str) -> Self {
        Self {
            travelpayouts: base.to_string(),
            aviationstack: base.to_string(),
            aerodatabox: base.to_string(),
            tequila: base.to_string(),
        }
    }
}

/// Everything the provider chain needs to know about its environment.
///
/// Credentials are plain optional strings; an absent or blank credential
/// disables the matching provider and nothing else.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub travelpayouts_token: Option<String>,
    pub travelpayouts_marker: Option<String>,
    pub aviationstack_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub tequila_key: Option<String>,
    pub endpoints: Endpoints,
    pub fetch: FetchOptions,
    pub call_timeout: Duration,
    pub mock_seed: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            travelpayouts_token: None,
            travelpayouts_marker: None,
            aviationstack_key: None,
            rapidapi_key: None,
            tequila_key: None,
            endpoints: Endpoints::default(),
            fetch: FetchOptions::default(),
            call_timeout: Duration::from_secs(15),
            mock_seed: None,
        }
    }
}

/// Joins a base URL and an absolute path, tolerating a trailing slash.
pub fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

/// Returns the credential only if it holds something other than whitespace.
pub fn credential(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
