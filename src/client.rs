//! HTTP client for the analyze endpoint.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::ServiceConfig,
    error::{Error, Result},
    request::AnalyzeRequest,
    results::{AnalysisResult, ErrorBody},
};

/// First released version of the analyze API.
pub const VERSION_DATE_2017_02_27: &str = "2017-02-27";

/// Public endpoint of the hosted service.
pub const DEFAULT_ENDPOINT: &str =
    "https://gateway.watsonplatform.net/natural-language-understanding/api";

/// Per-call timeout used unless [`AnalyzeClient::with_timeout`] overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials sent in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP basic auth.
    Basic { username: String, password: String },
    /// Bearer token.
    Bearer(String),
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Basic { username, password } => {
                if username.trim().is_empty() {
                    return Err(Error::InvalidConfig("username cannot be empty".into()));
                }
                if password.is_empty() {
                    return Err(Error::InvalidConfig("password cannot be empty".into()));
                }
                Ok(())
            }
            Self::Bearer(token) if token.trim().is_empty() => {
                Err(Error::InvalidConfig("token cannot be empty".into()))
            }
            Self::Bearer(_) => Ok(()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Client for `POST {endpoint}/v1/analyze`.
///
/// Configuration is fixed once built, so a single client can be cloned and
/// shared between tasks; clones share one connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use nlu_analyze::{AnalyzeClient, AnalyzeRequest, Credentials, FeatureKind, FeatureSet, FeatureToggle};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AnalyzeClient::configure(
///     "https://gateway.watsonplatform.net/natural-language-understanding/api",
///     Some(Credentials::basic("user", "secret")),
///     nlu_analyze::VERSION_DATE_2017_02_27,
/// )?;
///
/// let features = FeatureSet::new().with(FeatureToggle::default_for(FeatureKind::Relations))?;
/// let result = client.execute(&AnalyzeRequest::text("Elliot Turner founded AlchemyAPI.", features)?).await?;
/// println!("{:?}", result.relations);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnalyzeClient {
    endpoint: Url,
    analyze_url: Url,
    credentials: Credentials,
    version_date: String,
    timeout: Duration,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl std::fmt::Debug for AnalyzeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzeClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials)
            .field("version_date", &self.version_date)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AnalyzeClient {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Service base URL, without the `/v1/analyze` suffix
    /// * `credentials` - Required; `None` is rejected
    /// * `version_date` - API version date, e.g. [`VERSION_DATE_2017_02_27`]
    pub fn configure(
        endpoint: impl AsRef<str>,
        credentials: Option<Credentials>,
        version_date: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint.as_ref())?;

        let credentials =
            credentials.ok_or_else(|| Error::InvalidConfig("credentials are required".into()))?;
        credentials.validate()?;

        let version_date = version_date.into();
        if version_date.trim().is_empty() {
            return Err(Error::InvalidConfig("version date cannot be empty".into()));
        }

        let analyze_url = build_analyze_url(&endpoint, &version_date)?;

        Ok(Self {
            endpoint,
            analyze_url,
            credentials,
            version_date,
            timeout: DEFAULT_TIMEOUT,
            headers: HeaderMap::new(),
            http: reqwest::Client::new(),
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = Self::configure(
            &config.service.url,
            config.credentials.to_credentials(),
            &config.service.version,
        )?;
        if config.service.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "service.timeout_secs must be a positive integer".into(),
            ));
        }
        let mut client = client.with_timeout(Duration::from_secs(config.service.timeout_secs));
        for (name, value) in &config.service.headers {
            client = client.with_default_header(name, value)?;
        }
        Ok(client)
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every call (e.g. `X-Watson-Learning-Opt-Out`).
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidConfig(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidConfig(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replace the underlying reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full URL of the analyze call, including the `version` query parameter.
    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }

    pub fn version_date(&self) -> &str {
        &self.version_date
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one analysis.
    ///
    /// The SDK does not retry; [`Error::is_retryable`] tells the caller
    /// whether trying again makes sense.
    pub async fn execute(&self, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        let started = Instant::now();
        let features: Vec<&'static str> = request.features().kinds().map(|k| k.as_str()).collect();

        debug!(
            name: "nlu.analyze.request",
            url = %self.analyze_url,
            source = request.source().field_name(),
            features = ?features,
            "Sending analyze request"
        );

        let builder = self
            .http
            .post(self.analyze_url.clone())
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .json(request);
        let builder = match &self.credentials {
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            Credentials::Bearer(token) => builder.bearer_auth(token),
        };

        let outcome = match builder.send().await {
            Ok(response) => Self::handle_response(response).await,
            Err(e) => Err(Error::from(e)),
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            Ok(result) => info!(
                name: "nlu.analyze.completed",
                elapsed_ms,
                language = result.language.as_deref().unwrap_or("unknown"),
                "Analyze request completed"
            ),
            Err(e) => warn!(
                name: "nlu.analyze.failed",
                elapsed_ms,
                retryable = e.is_retryable(),
                error = %e,
                "Analyze request failed"
            ),
        }

        outcome
    }

    /// Run one analysis, aborting when `cancel` fires.
    ///
    /// On cancellation the in-flight request is dropped, which closes its
    /// connection, and [`Error::Cancelled`] is returned.
    pub async fn execute_with_cancel(
        &self,
        request: &AnalyzeRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(name: "nlu.analyze.cancelled", "Analyze request cancelled");
                Err(Error::Cancelled)
            }
            outcome = self.execute(request) => outcome,
        }
    }

    async fn handle_response(response: reqwest::Response) -> Result<AnalysisResult> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let error_body = serde_json::from_slice::<ErrorBody>(&body).ok();

        if status.is_client_error() {
            let (code, message) = match error_body {
                Some(err) => (err.code.unwrap_or(status.as_u16()), err.error),
                None => (status.as_u16(), String::from_utf8_lossy(&body).into_owned()),
            };
            return Err(Error::ClientError { code, message });
        }

        let detail = error_body
            .map(|err| err.error)
            .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
        Err(Error::ServiceUnavailable(format!(
            "service returned {status}: {detail}"
        )))
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| Error::InvalidConfig(format!("invalid endpoint {endpoint:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::InvalidConfig(format!(
            "endpoint must be an http(s) URL with a host: {endpoint}"
        )));
    }
    Ok(url)
}

fn build_analyze_url(endpoint: &Url, version_date: &str) -> Result<Url> {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| Error::InvalidConfig(format!("endpoint cannot be a base URL: {endpoint}")))?
        .pop_if_empty()
        .extend(["v1", "analyze"]);
    url.query_pairs_mut().append_pair("version", version_date);
    Ok(url)
}
