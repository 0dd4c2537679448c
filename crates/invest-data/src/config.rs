//! Runtime configuration, built once at startup

use crate::error::{DataError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Alpha Vantage's public demo key; only a handful of symbols work with it
pub const DEMO_API_KEY: &str = "demo";

/// Provider for daily price history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceProvider {
    /// Alpha Vantage `TIME_SERIES_DAILY`
    #[default]
    AlphaVantage,
    /// Yahoo Finance (no API key required)
    Yahoo,
}

impl FromStr for PriceProvider {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha_vantage" | "alphavantage" | "alpha-vantage" => Ok(Self::AlphaVantage),
            "yahoo" | "yahoo_finance" => Ok(Self::Yahoo),
            other => Err(DataError::Config(format!(
                "unknown price provider '{other}' (expected alpha_vantage or yahoo)"
            ))),
        }
    }
}

impl fmt::Display for PriceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlphaVantage => "alpha_vantage",
            Self::Yahoo => "yahoo",
        })
    }
}

/// Vertex AI Search data store holding the research library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSearchConfig {
    pub project_id: String,
    /// Multi-region of the data store (`us`, `eu` or `global`)
    pub location: String,
    pub data_store_id: String,
    /// OAuth bearer token for the Discovery Engine API
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Results requested per query
    pub page_size: u32,
}

impl VertexSearchConfig {
    pub fn new(project_id: impl Into<String>, data_store_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: "us".to_string(),
            data_store_id: data_store_id.into(),
            access_token: None,
            page_size: 5,
        }
    }

    /// Regional API host, e.g. `us-discoveryengine.googleapis.com`
    pub fn api_endpoint(&self) -> String {
        format!("{}-discoveryengine.googleapis.com", self.location)
    }

    /// Full URL of the `default_search` serving config's `:search` method
    pub fn search_url(&self) -> String {
        format!(
            "https://{}/v1beta/projects/{}/locations/{}/collections/default_collection/dataStores/{}/servingConfigs/default_search:search",
            self.api_endpoint(),
            self.project_id,
            self.location,
            self.data_store_id
        )
    }
}

/// Configuration for the data layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestConfig {
    /// Alpha Vantage API key; falls back to the demo key
    #[serde(skip_serializing)]
    pub alpha_vantage_api_key: String,

    /// Alpha Vantage requests per minute (5 on the free tier)
    pub alpha_vantage_rate_limit: u32,

    /// Source of daily price history
    pub price_provider: PriceProvider,

    /// Research search; `None` when the data store is not configured
    pub vertex: Option<VertexSearchConfig>,

    /// Cache TTL for daily price series
    pub cache_ttl_realtime: Duration,

    /// Cache TTL for company overviews and financial statements
    pub cache_ttl_fundamental: Duration,

    /// Cache TTL for research search results
    pub cache_ttl_search: Duration,

    /// Retries per upstream call after the first attempt fails
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,
}

impl Default for InvestConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: DEMO_API_KEY.to_string(),
            alpha_vantage_rate_limit: 5,
            price_provider: PriceProvider::AlphaVantage,
            vertex: None,
            cache_ttl_realtime: Duration::from_secs(60),
            cache_ttl_fundamental: Duration::from_secs(3600),
            cache_ttl_search: Duration::from_secs(300),
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl InvestConfig {
    /// Create a new configuration builder
    pub fn builder() -> InvestConfigBuilder {
        InvestConfigBuilder::default()
    }

    /// Read the process environment (after loading `.env`)
    pub fn from_env() -> Result<Self> {
        invest_utils::load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    ///
    /// Recognized keys: `ALPHA_VANTAGE_API_KEY`, `ALPHA_VANTAGE_RATE_LIMIT`,
    /// `PRICE_PROVIDER`, `GCP_PROJECT_ID`, `VERTEX_LOCATION`,
    /// `VERTEX_DATA_STORE_ID`, `VERTEX_ACCESS_TOKEN`, `REQUEST_TIMEOUT_SECS`,
    /// `MAX_RETRIES`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::builder();

        if let Some(key) = get("ALPHA_VANTAGE_API_KEY") {
            builder = builder.alpha_vantage_api_key(key);
        }
        if let Some(limit) = get("ALPHA_VANTAGE_RATE_LIMIT") {
            let limit = parse_number("ALPHA_VANTAGE_RATE_LIMIT", &limit)?;
            builder = builder.alpha_vantage_rate_limit(limit);
        }
        if let Some(provider) = get("PRICE_PROVIDER") {
            builder = builder.price_provider(provider.parse()?);
        }
        if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
            builder = builder.request_timeout(Duration::from_secs(parse_number(
                "REQUEST_TIMEOUT_SECS",
                &secs,
            )?));
        }
        if let Some(retries) = get("MAX_RETRIES") {
            builder = builder.max_retries(parse_number("MAX_RETRIES", &retries)?);
        }

        match (get("GCP_PROJECT_ID"), get("VERTEX_DATA_STORE_ID")) {
            (Some(project), Some(data_store)) => {
                let mut vertex = VertexSearchConfig::new(project, data_store);
                if let Some(location) = get("VERTEX_LOCATION") {
                    vertex.location = location;
                }
                vertex.access_token = get("VERTEX_ACCESS_TOKEN");
                builder = builder.vertex(vertex);
            }
            (None, None) => {}
            _ => tracing::warn!(
                "Vertex AI Search needs both GCP_PROJECT_ID and VERTEX_DATA_STORE_ID; research search disabled"
            ),
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_api_key.trim().is_empty() {
            return Err(DataError::Config(
                "Alpha Vantage API key must not be empty".to_string(),
            ));
        }

        if self.alpha_vantage_rate_limit == 0 {
            return Err(DataError::Config(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(DataError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(DataError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(vertex) = &self.vertex {
            if vertex.project_id.is_empty() || vertex.data_store_id.is_empty() {
                return Err(DataError::Config(
                    "Vertex AI Search needs a project id and a data store id".to_string(),
                ));
            }
            if vertex.page_size == 0 {
                return Err(DataError::Config(
                    "Vertex AI Search page_size must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn uses_demo_key(&self) -> bool {
        self.alpha_vantage_api_key == DEMO_API_KEY
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.pow(attempt)
    }

    /// Retry policy for upstream calls: one attempt plus `max_retries` retries
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries.saturating_add(1), self.retry_backoff_base)
            .with_max_delay(self.retry_backoff(self.max_retries))
            .with_rate_limit(self.alpha_vantage_rate_limit)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| DataError::Config(format!("{key} must be a whole number, got '{raw}'")))
}

/// Builder for InvestConfig
#[derive(Debug, Default)]
pub struct InvestConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    price_provider: Option<PriceProvider>,
    vertex: Option<VertexSearchConfig>,
    cache_ttl_realtime: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    cache_ttl_search: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl InvestConfigBuilder {
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    pub fn price_provider(mut self, provider: PriceProvider) -> Self {
        self.price_provider = Some(provider);
        self
    }

    pub fn vertex(mut self, vertex: VertexSearchConfig) -> Self {
        self.vertex = Some(vertex);
        self
    }

    pub fn cache_ttl_realtime(mut self, duration: Duration) -> Self {
        self.cache_ttl_realtime = Some(duration);
        self
    }

    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    pub fn cache_ttl_search(mut self, duration: Duration) -> Self {
        self.cache_ttl_search = Some(duration);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<InvestConfig> {
        let defaults = InvestConfig::default();

        let config = InvestConfig {
            alpha_vantage_api_key: self
                .alpha_vantage_api_key
                .unwrap_or(defaults.alpha_vantage_api_key),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            price_provider: self.price_provider.unwrap_or(defaults.price_provider),
            vertex: self.vertex,
            cache_ttl_realtime: self.cache_ttl_realtime.unwrap_or(defaults.cache_ttl_realtime),
            cache_ttl_fundamental: self
                .cache_ttl_fundamental
                .unwrap_or(defaults.cache_ttl_fundamental),
            cache_ttl_search: self.cache_ttl_search.unwrap_or(defaults.cache_ttl_search),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
