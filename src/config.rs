use crate::client::{Credentials, DEFAULT_ENDPOINT, VERSION_DATE_2017_02_27};
use crate::error::Result;
use crate::features::{
    ConceptsOptions, EntitiesOptions, FeatureKind, FeatureSet, FeatureToggle, KeywordsOptions,
    SemanticRolesOptions,
};
use crate::request::{AnalyzeOptions, AnalyzeRequest};
use clap::{Args, Parser};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "nlu.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "NLU_CONFIG_FILE")]
    pub config: Option<String>,

    /// Service endpoint (without /v1/analyze)
    #[arg(long, env = "NLU_URL")]
    pub url: Option<String>,

    /// API version date, e.g. 2017-02-27
    #[arg(long)]
    pub version_date: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

/// What to analyze and how.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Plain text to analyze
    #[arg(long)]
    pub text: Option<String>,

    /// Web page to analyze
    #[arg(long)]
    pub source_url: Option<String>,

    /// HTML document to analyze
    #[arg(long)]
    pub html: Option<String>,

    /// Feature to run (repeatable): keywords, relations, semantic_roles, entities,
    /// sentiment, emotion, concepts, categories
    #[arg(short, long = "feature")]
    pub features: Vec<FeatureKind>,

    /// Result limit for features that support one
    #[arg(long)]
    pub limit: Option<u32>,

    /// Echo the analyzed text in the result
    #[arg(long)]
    pub return_analyzed_text: bool,

    /// Language override (ISO 639-1)
    #[arg(long)]
    pub language: Option<String>,

    /// Keep page boilerplate instead of cleaning it
    #[arg(long)]
    pub no_clean: bool,
}

impl AnalyzeArgs {
    /// Turn the command line into a validated request.
    pub fn to_request(&self) -> Result<AnalyzeRequest> {
        let limit = self.limit;
        let toggles = self.features.iter().map(|kind| match kind {
            FeatureKind::Keywords => FeatureToggle::keywords(KeywordsOptions {
                limit,
                ..Default::default()
            }),
            FeatureKind::SemanticRoles => FeatureToggle::semantic_roles(SemanticRolesOptions {
                limit,
                ..Default::default()
            }),
            FeatureKind::Entities => FeatureToggle::entities(EntitiesOptions {
                limit,
                ..Default::default()
            }),
            FeatureKind::Concepts => FeatureToggle::concepts(ConceptsOptions { limit }),
            other => Ok(FeatureToggle::default_for(*other)),
        });
        let features = FeatureSet::from_toggles(toggles.collect::<Result<Vec<_>>>()?)?;

        AnalyzeRequest::new(AnalyzeOptions {
            text: self.text.clone(),
            url: self.source_url.clone(),
            html: self.html.clone(),
            features,
            return_analyzed_text: self.return_analyzed_text,
            language: self.language.clone(),
            clean: !self.no_clean,
            ..Default::default()
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub service: ServiceSettings,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceSettings {
    pub url: String,
    pub version: String,
    pub timeout_secs: u64,
    /// Extra headers sent with every call.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialsConfig {
    /// A token wins over username/password. `None` when neither is complete.
    pub fn to_credentials(&self) -> Option<Credentials> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        if let Some(token) = non_empty(&self.token) {
            return Some(Credentials::Bearer(token));
        }
        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Some(Credentials::Basic { username, password }),
            _ => None,
        }
    }
}

impl ServiceConfig {
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> std::result::Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Layering: defaults < config file < `NLU_` environment < CLI flags.
    pub fn from_cli(cli: &Cli) -> std::result::Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("service.url", DEFAULT_ENDPOINT)?
            .set_default("service.version", VERSION_DATE_2017_02_27)?
            .set_default("service.timeout_secs", 60)?;

        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::from(Path::new(path)).required(true));
            }
            None => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
        }

        // E.g. NLU_SERVICE__URL, NLU_CREDENTIALS__USERNAME
        builder = builder.add_source(
            Environment::with_prefix("NLU")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &cli.url {
            builder = builder.set_override("service.url", url.as_str())?;
        }
        if let Some(version) = &cli.version_date {
            builder = builder.set_override("service.version", version.as_str())?;
        }
        if let Some(timeout) = cli.timeout_secs {
            let timeout = i64::try_from(timeout).unwrap_or(i64::MAX);
            builder = builder.set_override("service.timeout_secs", timeout)?;
        }

        builder.build()?.try_deserialize()
    }
}
