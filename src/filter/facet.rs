use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Facet categories understood by the content API.
///
/// Each maps to the list field the backend filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacetCategory {
  /// Event custom tags (e.g. "NOI Community")
  CustomTagging,
  /// Event technology sectors (e.g. "Alpine")
  TechnologyFields,
  /// News tag ids
  TagIds,
}

impl FacetCategory {
  /// Field name as used inside the raw filter.
  pub fn field(&self) -> &'static str {
    match self {
      FacetCategory::CustomTagging => "CustomTagging",
      FacetCategory::TechnologyFields => "TechnologyFields",
      FacetCategory::TagIds => "TagIds",
    }
  }

  pub fn all_variants() -> &'static [Self] {
    &[
      FacetCategory::CustomTagging,
      FacetCategory::TechnologyFields,
      FacetCategory::TagIds,
    ]
  }
}

impl fmt::Display for FacetCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.field())
  }
}

/// A single selectable filter value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FilterFacet {
  pub category: FacetCategory,
  pub key: String,
}

impl FilterFacet {
  pub fn new(category: FacetCategory, key: impl Into<String>) -> Self {
    Self {
      category,
      key: key.into(),
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFacetError {
  #[error("expected <Category>=<key>, got {0:?}")]
  Syntax(String),
  #[error("unknown facet category {0:?}")]
  UnknownCategory(String),
}

impl FromStr for FacetCategory {
  type Err = ParseFacetError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    FacetCategory::all_variants()
      .iter()
      .find(|c| c.field().eq_ignore_ascii_case(s.trim()))
      .copied()
      .ok_or_else(|| ParseFacetError::UnknownCategory(s.to_string()))
  }
}

/// Parses `Category=key`, e.g. `CustomTagging=NOI Community`.
impl FromStr for FilterFacet {
  type Err = ParseFacetError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (category, key) = s
      .split_once('=')
      .ok_or_else(|| ParseFacetError::Syntax(s.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
      return Err(ParseFacetError::Syntax(s.to_string()));
    }
    Ok(FilterFacet::new(category.parse()?, key))
  }
}

/// A facet as listed by the API, with a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
  pub facet: FilterFacet,
  pub label: String,
}
