//! Summary transforms
//!
//! How a summary field's value is produced at fetch time. The set is closed;
//! every capability comes from one exhaustive table so a new transform kind
//! cannot be added without deciding its capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTransform {
    #[default]
    None,
    /// Read from the in-memory attribute store
    Attribute,
    /// Rebuild a complex value from its struct field attributes
    AttributeCombiner,
    MatchedElementsFilter,
    MatchedAttributeElementsFilter,
    /// Distance from the query position
    Distance,
    /// Position rendered as text
    Positions,
    GeoPos,
    Bolded,
    DynamicBolded,
    DynamicTeaser,
    TextExtractor,
    Copy,
    DocumentId,
    RankFeatures,
    SummaryFeatures,
    Tokens,
}

/// Fixed per-transform properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub name: &'static str,
    /// Output depends on the query (bolding, snippets)
    pub dynamic: bool,
}

const fn caps(name: &'static str, dynamic: bool) -> Capabilities {
    Capabilities { name, dynamic }
}

impl SummaryTransform {
    pub const ALL: [SummaryTransform; 17] = [
        Self::None,
        Self::Attribute,
        Self::AttributeCombiner,
        Self::MatchedElementsFilter,
        Self::MatchedAttributeElementsFilter,
        Self::Distance,
        Self::Positions,
        Self::GeoPos,
        Self::Bolded,
        Self::DynamicBolded,
        Self::DynamicTeaser,
        Self::TextExtractor,
        Self::Copy,
        Self::DocumentId,
        Self::RankFeatures,
        Self::SummaryFeatures,
        Self::Tokens,
    ];

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::None => caps("none", false),
            Self::Attribute => caps("attribute", false),
            Self::AttributeCombiner => caps("attributecombiner", false),
            Self::MatchedElementsFilter => caps("matchedelementsfilter", false),
            Self::MatchedAttributeElementsFilter => caps("matchedattributeelementsfilter", false),
            Self::Distance => caps("distance", false),
            Self::Positions => caps("positions", false),
            Self::GeoPos => caps("geopos", false),
            Self::Bolded => caps("bolded", true),
            Self::DynamicBolded => caps("dynamicbolded", true),
            Self::DynamicTeaser => caps("dynamicteaser", true),
            Self::TextExtractor => caps("textextractor", false),
            Self::Copy => caps("copy", false),
            Self::DocumentId => caps("documentid", false),
            Self::RankFeatures => caps("rankfeatures", false),
            Self::SummaryFeatures => caps("summaryfeatures", false),
            Self::Tokens => caps("tokens", false),
        }
    }

    pub const fn name(self) -> &'static str {
        self.capabilities().name
    }

    pub const fn is_dynamic(self) -> bool {
        self.capabilities().dynamic
    }

    /// Transforms that take exactly one attribute as source
    pub fn is_position_derived(self) -> bool {
        matches!(self, Self::Distance | Self::Positions)
    }
}

impl fmt::Display for SummaryTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SummaryTransform {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| CompileError::UnknownTransform(s.to_string()))
    }
}
