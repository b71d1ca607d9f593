//! Typed decoding of analysis responses.
//!
//! Every per-feature collection is an `Option`: `None` means the key was
//! absent (or `null`), i.e. the feature was not requested; `Some(vec![])` means
//! the feature ran and found nothing. A key holding the wrong JSON shape fails
//! decoding instead of being dropped.

use serde::{Deserialize, Serialize};

use crate::features::FeatureKind;

/// Results of a successful analyze call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The text that was analyzed, when `return_analyzed_text` was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_text: Option<String>,
    /// Detected or requested language of the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Final URL after redirects, for `url` input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<KeywordsResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelationsResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_roles: Option<Vec<SemanticRolesResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<EntitiesResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<ConceptsResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoriesResult>>,
}

impl AnalysisResult {
    /// Whether the response carried a result for `kind`, empty or not.
    #[must_use]
    pub fn has(&self, kind: FeatureKind) -> bool {
        match kind {
            FeatureKind::Keywords => self.keywords.is_some(),
            FeatureKind::Relations => self.relations.is_some(),
            FeatureKind::SemanticRoles => self.semantic_roles.is_some(),
            FeatureKind::Entities => self.entities.is_some(),
            FeatureKind::Sentiment => self.sentiment.is_some(),
            FeatureKind::Emotion => self.emotion.is_some(),
            FeatureKind::Concepts => self.concepts.is_some(),
            FeatureKind::Categories => self.categories.is_some(),
        }
    }

    /// Kinds present in the response.
    pub fn present_features(&self) -> impl Iterator<Item = FeatureKind> + '_ {
        FeatureKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }
}

/// Billing units consumed by the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub features: Option<u32>,
    pub text_characters: Option<u64>,
    pub text_units: Option<u32>,
}

// =============================================================================
// Shared score types
// =============================================================================

/// Emotion scores, each in `0.0..=1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    pub anger: Option<f64>,
    pub disgust: Option<f64>,
    pub fear: Option<f64>,
    pub joy: Option<f64>,
    pub sadness: Option<f64>,
}

/// Sentiment score in `-1.0..=1.0` attached to a keyword or entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSentiment {
    pub score: Option<f64>,
}

// =============================================================================
// Keywords
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordsResult {
    pub text: Option<String>,
    pub relevance: Option<f64>,
    pub sentiment: Option<FeatureSentiment>,
    pub emotion: Option<EmotionScores>,
}

// =============================================================================
// Relations
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationsResult {
    pub score: Option<f64>,
    pub sentence: Option<String>,
    /// Relation type, e.g. `founderOf`.
    #[serde(rename = "type")]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub arguments: Vec<RelationArgument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationArgument {
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<RelationEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntity {
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

// =============================================================================
// Semantic roles
// =============================================================================

/// Subject/action/object decomposition of one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesResult {
    /// The sentence the roles were extracted from.
    pub sentence: Option<String>,
    pub subject: Option<SemanticRolesSubject>,
    pub action: Option<SemanticRolesAction>,
    pub object: Option<SemanticRolesObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesSubject {
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<SemanticRolesEntity>,
    #[serde(default)]
    pub keywords: Vec<SemanticRolesKeyword>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesAction {
    pub text: Option<String>,
    pub normalized: Option<String>,
    pub verb: Option<SemanticRolesVerb>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesVerb {
    pub text: Option<String>,
    pub tense: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesObject {
    pub text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<SemanticRolesKeyword>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesEntity {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesKeyword {
    pub text: Option<String>,
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesResult {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub text: Option<String>,
    pub relevance: Option<f64>,
    pub count: Option<u32>,
    pub sentiment: Option<FeatureSentiment>,
    pub emotion: Option<EmotionScores>,
    pub disambiguation: Option<Disambiguation>,
}

/// Link from an entity to a knowledge-base resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disambiguation {
    pub name: Option<String>,
    pub dbpedia_resource: Option<String>,
    #[serde(default)]
    pub subtype: Vec<String>,
}

// =============================================================================
// Sentiment and emotion
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub document: Option<DocumentSentiment>,
    pub targets: Option<Vec<TargetedSentiment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSentiment {
    /// `positive`, `neutral` or `negative`.
    pub label: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetedSentiment {
    pub text: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub document: Option<DocumentEmotion>,
    pub targets: Option<Vec<TargetedEmotion>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentEmotion {
    pub emotion: Option<EmotionScores>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetedEmotion {
    pub text: Option<String>,
    pub emotion: Option<EmotionScores>,
}

// =============================================================================
// Concepts and categories
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptsResult {
    pub text: Option<String>,
    pub relevance: Option<f64>,
    pub dbpedia_resource: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoriesResult {
    /// Hierarchical label, e.g. `/technology and computing/software`.
    pub label: Option<String>,
    pub score: Option<f64>,
}

// =============================================================================
// Error body
// =============================================================================

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: Option<u16>,
    pub error: String,
}
