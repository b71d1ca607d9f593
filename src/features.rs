//! Analysis features and their options.
//!
//! Each feature the service offers is a [`FeatureToggle`] variant carrying its
//! own options struct. A [`FeatureSet`] holds at most one toggle per
//! [`FeatureKind`] and serializes to the `features` object of the wire request.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// Feature kinds
// =============================================================================

/// Tag identifying an analysis feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Keywords,
    Relations,
    SemanticRoles,
    Entities,
    Sentiment,
    Emotion,
    Concepts,
    Categories,
}

impl FeatureKind {
    /// Every feature kind, in wire order.
    pub const ALL: [Self; 8] = [
        Self::Keywords,
        Self::Relations,
        Self::SemanticRoles,
        Self::Entities,
        Self::Sentiment,
        Self::Emotion,
        Self::Concepts,
        Self::Categories,
    ];

    /// The key used for this feature in request and response bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Relations => "relations",
            Self::SemanticRoles => "semantic_roles",
            Self::Entities => "entities",
            Self::Sentiment => "sentiment",
            Self::Emotion => "emotion",
            Self::Concepts => "concepts",
            Self::Categories => "categories",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown feature: {s}")))
    }
}

// =============================================================================
// Per-feature options
// =============================================================================

/// Options for keyword extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsOptions {
    /// Return sentiment for each keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<bool>,
    /// Return emotion scores for each keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<bool>,
    /// Maximum number of keywords to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Options for relation extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationsOptions {
    /// Custom model ID to use instead of the default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Options for semantic-role labeling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRolesOptions {
    /// Maximum number of semantic roles to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return keywords found in each subject and object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<bool>,
    /// Return entities found in each subject and object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<bool>,
}

/// Options for entity extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitiesOptions {
    /// Maximum number of entities to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Custom model ID to use instead of the default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Return sentiment for each entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<bool>,
    /// Return emotion scores for each entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<bool>,
}

/// Options for document and targeted sentiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentOptions {
    /// Return document-level sentiment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<bool>,
    /// Phrases to score individually.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

/// Options for document and targeted emotion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionOptions {
    /// Return document-level emotion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<bool>,
    /// Phrases to score individually.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

/// Options for concept tagging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptsOptions {
    /// Maximum number of concepts to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Categories take no options; the service sends back its default hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriesOptions {}

fn check_limit(feature: FeatureKind, limit: Option<u32>) -> Result<()> {
    match limit {
        Some(0) => Err(Error::InvalidArgument(format!(
            "{feature}.limit must be a positive integer"
        ))),
        _ => Ok(()),
    }
}

fn check_model(feature: FeatureKind, model: Option<&str>) -> Result<()> {
    match model {
        Some(m) if m.trim().is_empty() => Err(Error::InvalidArgument(format!(
            "{feature}.model cannot be empty"
        ))),
        _ => Ok(()),
    }
}

fn check_targets(feature: FeatureKind, targets: Option<&[String]>) -> Result<()> {
    if targets.is_some_and(|t| t.iter().any(|s| s.trim().is_empty())) {
        return Err(Error::InvalidArgument(format!(
            "{feature}.targets cannot contain empty strings"
        )));
    }
    Ok(())
}

// =============================================================================
// FeatureToggle
// =============================================================================

/// A single requested analysis feature with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureToggle {
    Keywords(KeywordsOptions),
    Relations(RelationsOptions),
    SemanticRoles(SemanticRolesOptions),
    Entities(EntitiesOptions),
    Sentiment(SentimentOptions),
    Emotion(EmotionOptions),
    Concepts(ConceptsOptions),
    Categories(CategoriesOptions),
}

impl FeatureToggle {
    pub fn keywords(options: KeywordsOptions) -> Result<Self> {
        Self::Keywords(options).validated()
    }

    pub fn relations(options: RelationsOptions) -> Result<Self> {
        Self::Relations(options).validated()
    }

    pub fn semantic_roles(options: SemanticRolesOptions) -> Result<Self> {
        Self::SemanticRoles(options).validated()
    }

    pub fn entities(options: EntitiesOptions) -> Result<Self> {
        Self::Entities(options).validated()
    }

    pub fn sentiment(options: SentimentOptions) -> Result<Self> {
        Self::Sentiment(options).validated()
    }

    pub fn emotion(options: EmotionOptions) -> Result<Self> {
        Self::Emotion(options).validated()
    }

    pub fn concepts(options: ConceptsOptions) -> Result<Self> {
        Self::Concepts(options).validated()
    }

    #[must_use]
    pub fn categories() -> Self {
        Self::Categories(CategoriesOptions {})
    }

    /// Toggle for `kind` with every option left to the service default.
    #[must_use]
    pub fn default_for(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Keywords => Self::Keywords(KeywordsOptions::default()),
            FeatureKind::Relations => Self::Relations(RelationsOptions::default()),
            FeatureKind::SemanticRoles => Self::SemanticRoles(SemanticRolesOptions::default()),
            FeatureKind::Entities => Self::Entities(EntitiesOptions::default()),
            FeatureKind::Sentiment => Self::Sentiment(SentimentOptions::default()),
            FeatureKind::Emotion => Self::Emotion(EmotionOptions::default()),
            FeatureKind::Concepts => Self::Concepts(ConceptsOptions::default()),
            FeatureKind::Categories => Self::Categories(CategoriesOptions::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Keywords(_) => FeatureKind::Keywords,
            Self::Relations(_) => FeatureKind::Relations,
            Self::SemanticRoles(_) => FeatureKind::SemanticRoles,
            Self::Entities(_) => FeatureKind::Entities,
            Self::Sentiment(_) => FeatureKind::Sentiment,
            Self::Emotion(_) => FeatureKind::Emotion,
            Self::Concepts(_) => FeatureKind::Concepts,
            Self::Categories(_) => FeatureKind::Categories,
        }
    }

    /// Check the option values of this toggle.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            Self::Keywords(o) => check_limit(kind, o.limit),
            Self::Relations(o) => check_model(kind, o.model.as_deref()),
            Self::SemanticRoles(o) => check_limit(kind, o.limit),
            Self::Entities(o) => {
                check_limit(kind, o.limit)?;
                check_model(kind, o.model.as_deref())
            }
            Self::Sentiment(o) => check_targets(kind, o.targets.as_deref()),
            Self::Emotion(o) => check_targets(kind, o.targets.as_deref()),
            Self::Concepts(o) => check_limit(kind, o.limit),
            Self::Categories(_) => Ok(()),
        }
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

// =============================================================================
// Features (configuration struct)
// =============================================================================

/// Every recognized feature as an optional field.
///
/// This is the shape of the `features` object on the wire, and the most
/// direct way to describe a feature set in one expression:
///
/// ```rust
/// use nlu_analyze::{FeatureSet, Features, KeywordsOptions, RelationsOptions};
///
/// let features = FeatureSet::try_from(Features {
///     keywords: Some(KeywordsOptions { limit: Some(3), ..Default::default() }),
///     relations: Some(RelationsOptions::default()),
///     ..Default::default()
/// })?;
/// assert_eq!(features.len(), 2);
/// # Ok::<(), nlu_analyze::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Features {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<RelationsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_roles: Option<SemanticRolesOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<EntitiesOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepts: Option<ConceptsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoriesOptions>,
}

// =============================================================================
// FeatureSet
// =============================================================================

/// The features requested for one analysis call.
///
/// Holds at most one toggle per [`FeatureKind`]; inserting a kind that is
/// already present replaces the previous toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Features", try_from = "Features")]
pub struct FeatureSet {
    toggles: BTreeMap<FeatureKind, FeatureToggle>,
}

impl FeatureSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from toggles. Later toggles of the same kind win.
    pub fn from_toggles(toggles: impl IntoIterator<Item = FeatureToggle>) -> Result<Self> {
        let mut set = Self::new();
        for toggle in toggles {
            set.insert(toggle)?;
        }
        Ok(set)
    }

    /// Insert a toggle, returning the one it replaced.
    pub fn insert(&mut self, toggle: FeatureToggle) -> Result<Option<FeatureToggle>> {
        toggle.validate()?;
        Ok(self.toggles.insert(toggle.kind(), toggle))
    }

    /// Chainable form of [`FeatureSet::insert`].
    pub fn with(mut self, toggle: FeatureToggle) -> Result<Self> {
        self.insert(toggle)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, kind: FeatureKind) -> Option<&FeatureToggle> {
        self.toggles.get(&kind)
    }

    #[must_use]
    pub fn contains(&self, kind: FeatureKind) -> bool {
        self.toggles.contains_key(&kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = FeatureKind> + '_ {
        self.toggles.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureToggle> {
        self.toggles.values()
    }
}

impl TryFrom<Features> for FeatureSet {
    type Error = Error;

    fn try_from(features: Features) -> Result<Self> {
        let Features {
            keywords,
            relations,
            semantic_roles,
            entities,
            sentiment,
            emotion,
            concepts,
            categories,
        } = features;

        let toggles = [
            keywords.map(FeatureToggle::Keywords),
            relations.map(FeatureToggle::Relations),
            semantic_roles.map(FeatureToggle::SemanticRoles),
            entities.map(FeatureToggle::Entities),
            sentiment.map(FeatureToggle::Sentiment),
            emotion.map(FeatureToggle::Emotion),
            concepts.map(FeatureToggle::Concepts),
            categories.map(FeatureToggle::Categories),
        ];

        Self::from_toggles(toggles.into_iter().flatten())
    }
}

impl From<FeatureSet> for Features {
    fn from(set: FeatureSet) -> Self {
        let mut features = Features::default();
        for toggle in set.toggles.into_values() {
            match toggle {
                FeatureToggle::Keywords(o) => features.keywords = Some(o),
                FeatureToggle::Relations(o) => features.relations = Some(o),
                FeatureToggle::SemanticRoles(o) => features.semantic_roles = Some(o),
                FeatureToggle::Entities(o) => features.entities = Some(o),
                FeatureToggle::Sentiment(o) => features.sentiment = Some(o),
                FeatureToggle::Emotion(o) => features.emotion = Some(o),
                FeatureToggle::Concepts(o) => features.concepts = Some(o),
                FeatureToggle::Categories(o) => features.categories = Some(o),
            }
        }
        features
    }
}

// =============================================================================
// Tests
// =============================================================================
