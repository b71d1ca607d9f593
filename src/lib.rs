//! Client SDK for a hosted natural-language-understanding service.
//!
//! A call is assembled from the bottom up: per-feature options become
//! [`FeatureToggle`]s, toggles form a [`FeatureSet`], the set and one input
//! source form an [`AnalyzeRequest`], and an [`AnalyzeClient`] sends it and
//! decodes the [`AnalysisResult`].
//!
//! ```rust,no_run
//! use nlu_analyze::{
//!     AnalyzeClient, AnalyzeOptions, AnalyzeRequest, Credentials, FeatureSet, Features,
//!     KeywordsOptions, RelationsOptions, VERSION_DATE_2017_02_27,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnalyzeClient::configure(
//!         "https://gateway.watsonplatform.net/natural-language-understanding/api",
//!         Some(Credentials::basic("username", "password")),
//!         VERSION_DATE_2017_02_27,
//!     )?;
//!
//!     let features = FeatureSet::try_from(Features {
//!         keywords: Some(KeywordsOptions {
//!             sentiment: Some(true),
//!             emotion: Some(true),
//!             limit: Some(3),
//!         }),
//!         relations: Some(RelationsOptions::default()),
//!         ..Default::default()
//!     })?;
//!
//!     let request = AnalyzeRequest::new(AnalyzeOptions {
//!         text: Some("In 2009, Elliot Turner launched AlchemyAPI.".into()),
//!         features,
//!         return_analyzed_text: true,
//!         ..Default::default()
//!     })?;
//!
//!     let result = client.execute(&request).await?;
//!     for keyword in result.keywords.unwrap_or_default() {
//!         println!("{:?} {:?}", keyword.text, keyword.relevance);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`features`]: feature kinds, per-feature options and [`FeatureSet`]
//! - [`request`]: [`AnalyzeRequest`] validation and wire encoding
//! - [`results`]: typed response decoding
//! - [`client`]: [`AnalyzeClient`] transport and auth
//! - [`config`]: layered configuration and command-line arguments
//! - [`error`]: the [`Error`] taxonomy

pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod request;
pub mod results;

// Re-exports
pub use client::{AnalyzeClient, Credentials, DEFAULT_ENDPOINT, VERSION_DATE_2017_02_27};
pub use error::{Error, Result};
pub use features::*;
pub use request::{AnalyzeOptions, AnalyzeRequest, InputSource};
pub use results::*;
