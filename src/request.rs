//! Analyze request construction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeatureSet;

/// The content to analyze. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Plain text.
    Text(String),
    /// A public web page the service fetches itself.
    Url(String),
    /// Raw HTML.
    Html(String),
}

impl InputSource {
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Url(_) => "url",
            Self::Html(_) => "html",
        }
    }
}

/// Every recognized request option, validated together by [`AnalyzeRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    pub text: Option<String>,
    pub url: Option<String>,
    pub html: Option<String>,
    pub features: FeatureSet,
    /// Ask the service to echo the text it analyzed.
    pub return_analyzed_text: bool,
    /// ISO 639-1 code overriding language detection.
    pub language: Option<String>,
    /// Strip boilerplate (ads, navigation) from web pages. On by default.
    pub clean: bool,
    /// XPath query selecting the part of a web page to analyze.
    pub xpath: Option<String>,
    /// Fall back to the raw page when `clean` or `xpath` leave nothing.
    pub fallback_to_raw: Option<bool>,
    /// Truncate the input to this many characters before analysis.
    pub limit_text_characters: Option<u32>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            text: None,
            url: None,
            html: None,
            features: FeatureSet::default(),
            return_analyzed_text: false,
            language: None,
            clean: true,
            xpath: None,
            fallback_to_raw: None,
            limit_text_characters: None,
        }
    }
}

/// A validated analysis request, ready to hand to
/// [`AnalyzeClient::execute`](crate::client::AnalyzeClient::execute).
///
/// Serializes to the JSON body of `POST /v1/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AnalyzeOptions")]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    source: InputSource,
    features: FeatureSet,
    return_analyzed_text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    clean: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    xpath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_to_raw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_text_characters: Option<u32>,
}

impl AnalyzeRequest {
    /// Validate `options` and build the request.
    ///
    /// Fails with [`Error::MissingInput`] or [`Error::ConflictingInput`] unless
    /// exactly one of `text`, `url` and `html` is set, and with
    /// [`Error::MissingFeatures`] when the feature set is empty.
    pub fn new(options: AnalyzeOptions) -> Result<Self> {
        let AnalyzeOptions {
            text,
            url,
            html,
            features,
            return_analyzed_text,
            language,
            clean,
            xpath,
            fallback_to_raw,
            limit_text_characters,
        } = options;

        let mut sources: Vec<InputSource> = [
            text.map(InputSource::Text),
            url.map(InputSource::Url),
            html.map(InputSource::Html),
        ]
        .into_iter()
        .flatten()
        .collect();

        let source = match sources.len() {
            0 => return Err(Error::MissingInput),
            1 => sources.remove(0),
            _ => {
                return Err(Error::ConflictingInput(
                    sources.iter().map(InputSource::field_name).collect(),
                ));
            }
        };

        if features.is_empty() {
            return Err(Error::MissingFeatures);
        }

        if limit_text_characters == Some(0) {
            return Err(Error::InvalidArgument(
                "limit_text_characters must be a positive integer".into(),
            ));
        }

        Ok(Self {
            source,
            features,
            return_analyzed_text,
            language,
            clean,
            xpath,
            fallback_to_raw,
            limit_text_characters,
        })
    }

    /// Request analysis of plain text with default output options.
    pub fn text(text: impl Into<String>, features: FeatureSet) -> Result<Self> {
        Self::new(AnalyzeOptions {
            text: Some(text.into()),
            features,
            ..Default::default()
        })
    }

    /// Request analysis of a web page with default output options.
    pub fn url(url: impl Into<String>, features: FeatureSet) -> Result<Self> {
        Self::new(AnalyzeOptions {
            url: Some(url.into()),
            features,
            ..Default::default()
        })
    }

    /// Request analysis of an HTML document with default output options.
    pub fn html(html: impl Into<String>, features: FeatureSet) -> Result<Self> {
        Self::new(AnalyzeOptions {
            html: Some(html.into()),
            features,
            ..Default::default()
        })
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn return_analyzed_text(&self) -> bool {
        self.return_analyzed_text
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn clean(&self) -> bool {
        self.clean
    }

    pub fn xpath(&self) -> Option<&str> {
        self.xpath.as_deref()
    }

    pub fn fallback_to_raw(&self) -> Option<bool> {
        self.fallback_to_raw
    }

    pub fn limit_text_characters(&self) -> Option<u32> {
        self.limit_text_characters
    }
}

impl TryFrom<AnalyzeOptions> for AnalyzeRequest {
    type Error = Error;

    fn try_from(options: AnalyzeOptions) -> Result<Self> {
        Self::new(options)
    }
}
