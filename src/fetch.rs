use std::time::Duration;

use wreq::Client;

use crate::error::{self, FlightError};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
        }
    }
}

/// Shared outbound HTTP client. Cheap to clone; every provider holds one.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(options: &FetchOptions) -> Result<Self, FlightError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;
        Ok(Self { client })
    }

    /// GETs `url` and returns the body of a 2xx response.
    pub async fn get_text(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&'static str, String)],
    ) -> Result<String, FlightError> {
        let mut request = self.client.get(url).query(params);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await.map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            429 => return Err(FlightError::RateLimited),
            _ => return Err(FlightError::HttpStatus(status)),
        }

        response.text().await.map_err(error::from_http_error)
    }
}
