use std::fmt;

#[derive(Debug)]
pub enum FlightError {
    MissingFields(Vec<&'static str>),
    InvalidAirport(String),
    InvalidDate(String),
    Validation(String),
    Timeout,
    ConnectionFailed(String),
    DnsResolution(String),
    ProxyError(String),
    TlsError(String),
    RateLimited,
    HttpStatus(u16),
    Decode(String),
    Internal(String),
}

impl FlightError {
    /// True for errors caused by the caller's input rather than by a provider
    /// or by the service itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields(_)
                | Self::InvalidAirport(_)
                | Self::InvalidDate(_)
                | Self::Validation(_)
        )
    }
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            Self::InvalidAirport(code) => write!(
                f,
                "invalid airport code \"{code}\" — must be exactly 3 letters or digits (e.g. JFK, LHR)"
            ),
            Self::InvalidDate(date) => write!(
                f,
                "invalid date \"{date}\" — must be YYYY-MM-DD format (e.g. 2026-03-01)"
            ),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Timeout => write!(f, "provider request timed out"),
            Self::ConnectionFailed(detail) => {
                write!(f, "connection to provider failed ({detail})")
            }
            Self::DnsResolution(host) => write!(f, "DNS resolution failed for {host}"),
            Self::ProxyError(detail) => write!(
                f,
                "proxy error — check your --proxy URL is correct ({detail})"
            ),
            Self::TlsError(detail) => write!(f, "TLS/SSL error talking to provider ({detail})"),
            Self::RateLimited => write!(f, "rate limited by provider (HTTP 429)"),
            Self::HttpStatus(status) => write!(f, "unexpected HTTP status {status} from provider"),
            Self::Decode(detail) => write!(f, "failed to decode provider response — {detail}"),
            Self::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for FlightError {}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    if lower.contains("builder error") && lower.contains("uri") {
        return FlightError::ProxyError(msg);
    }

    FlightError::ConnectionFailed(msg)
}
