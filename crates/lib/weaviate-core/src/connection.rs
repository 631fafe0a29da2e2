//! Resolved connection settings for a Weaviate instance.

use std::{error::Error, fmt, str::FromStr, time::Duration};

use reqwest::Url;
use weaviate_store::schema::DEFAULT_HOST;

pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum ConnectionError {
    InvalidScheme(String),
    InvalidHost(String),
    InvalidCredential,
    Client(reqwest::Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScheme(scheme) => {
                write!(f, "unsupported scheme: {scheme} (expected http or https)")
            }
            Self::InvalidHost(host) => write!(f, "invalid weaviate host: {host}"),
            Self::InvalidCredential => write!(f, "api key is not a valid header value"),
            Self::Client(err) => write!(f, "connect to weaviate: {err}"),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Client(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client(err)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ConnectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(ConnectionError::InvalidScheme(value.to_string())),
        }
    }
}

/// Host, scheme, and credential for the backend, plus client timeouts.
///
/// Built once at startup by the configuration provider and never mutated
/// after being handed to the bridge.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    host: String,
    scheme: Scheme,
    credential: Option<String>,
    startup_timeout: Duration,
    request_timeout: Duration,
}

impl ConnectionDescriptor {
    /// Creates a descriptor, falling back to `localhost:8080` for a missing or blank host.
    #[must_use]
    pub fn new(host: Option<String>, scheme: Scheme) -> Self {
        let host = non_blank(host).unwrap_or_else(|| DEFAULT_HOST.to_string());
        Self {
            host,
            scheme,
            credential: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Attaches an API key. Blank keys mean anonymous access.
    #[must_use]
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = non_blank(credential);
        self
    }

    #[must_use]
    pub const fn with_startup_timeout(mut self, startup_timeout: Duration) -> Self {
        self.startup_timeout = startup_timeout;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns `scheme://host/`, the root every API path is joined onto.
    ///
    /// # Errors
    /// Returns `ConnectionError::InvalidHost` if the host does not form a valid URL.
    pub fn base_url(&self) -> Result<Url, ConnectionError> {
        let raw = format!("{}://{}/", self.scheme, self.host.trim_end_matches('/'));
        let url = Url::parse(&raw).map_err(|_| ConnectionError::InvalidHost(self.host.clone()))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ConnectionError::InvalidHost(self.host.clone()));
        }
        Ok(url)
    }
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self::new(None, Scheme::default())
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("scheme", &self.scheme)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("startup_timeout", &self.startup_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
