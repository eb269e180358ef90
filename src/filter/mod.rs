//! Backend boolean filter grammar and the facet query composer.
//!
//! The content API accepts a `rawfilter` query parameter written in a small
//! prefix grammar:
//!
//! ```text
//! in(<field>.[],"<value>")   list field contains value
//! eq(<field>,"<value>")      string equality
//! eq(<field>,true)           boolean equality
//! isnull(<field>)            field missing
//! or(a,b,...)                any operand
//! and(a,b,...)               all operands
//! ```
//!
//! Terms are concatenated as-is; string values are quoted but not escaped.

mod compose;
mod facet;

pub use compose::{compose, compose_facets};
pub use facet::{FacetCategory, FacetOption, FilterFacet, ParseFacetError};

use std::fmt;

/// A literal on the right-hand side of `eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
  Str(String),
  Bool(bool),
}

/// One term of the raw filter grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFilter {
  In { field: String, value: String },
  Eq { field: String, value: Literal },
  IsNull { field: String },
  Or(Vec<RawFilter>),
  And(Vec<RawFilter>),
}

impl RawFilter {
  pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
    RawFilter::In {
      field: field.into(),
      value: value.into(),
    }
  }

  pub fn eq_str(field: impl Into<String>, value: impl Into<String>) -> Self {
    RawFilter::Eq {
      field: field.into(),
      value: Literal::Str(value.into()),
    }
  }

  pub fn eq_bool(field: impl Into<String>, value: bool) -> Self {
    RawFilter::Eq {
      field: field.into(),
      value: Literal::Bool(value),
    }
  }

  pub fn is_null(field: impl Into<String>) -> Self {
    RawFilter::IsNull {
      field: field.into(),
    }
  }

  /// `or(...)` over the operands; `None` for zero, the bare operand for one.
  pub fn any(terms: impl IntoIterator<Item = RawFilter>) -> Option<RawFilter> {
    Self::collapse(terms.into_iter().collect(), RawFilter::Or)
  }

  /// `and(...)` over the operands; `None` for zero, the bare operand for one.
  pub fn all(terms: impl IntoIterator<Item = RawFilter>) -> Option<RawFilter> {
    Self::collapse(terms.into_iter().collect(), RawFilter::And)
  }

  fn collapse(mut terms: Vec<RawFilter>, wrap: fn(Vec<RawFilter>) -> RawFilter) -> Option<RawFilter> {
    match terms.len() {
      0 => None,
      1 => terms.pop(),
      _ => Some(wrap(terms)),
    }
  }
}

fn write_list(f: &mut fmt::Formatter<'_>, op: &str, terms: &[RawFilter]) -> fmt::Result {
  write!(f, "{}(", op)?;
  for (i, term) in terms.iter().enumerate() {
    if i > 0 {
      f.write_str(",")?;
    }
    write!(f, "{}", term)?;
  }
  f.write_str(")")
}

impl fmt::Display for RawFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RawFilter::In { field, value } => write!(f, "in({}.[],\"{}\")", field, value),
      RawFilter::Eq {
        field,
        value: Literal::Str(value),
      } => write!(f, "eq({},\"{}\")", field, value),
      RawFilter::Eq {
        field,
        value: Literal::Bool(value),
      } => write!(f, "eq({},{})", field, value),
      RawFilter::IsNull { field } => write!(f, "isnull({})", field),
      RawFilter::Or(terms) => write_list(f, "or", terms),
      RawFilter::And(terms) => write_list(f, "and", terms),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_leaf_rendering() {
    assert_eq!(
      RawFilter::contains("TechnologyFields", "Alpine").to_string(),
      "in(TechnologyFields.[],\"Alpine\")"
    );
    assert_eq!(
      RawFilter::eq_str("Type", "CustomTagging").to_string(),
      "eq(Type,\"CustomTagging\")"
    );
    assert_eq!(
      RawFilter::eq_bool("Highlighted", true).to_string(),
      "eq(Highlighted,true)"
    );
    assert_eq!(
      RawFilter::is_null("Highlighted").to_string(),
      "isnull(Highlighted)"
    );
  }

  #[test]
  fn test_any_and_all_collapse() {
    assert_eq!(RawFilter::any(Vec::new()), None);
    assert_eq!(RawFilter::all(Vec::new()), None);

    let single = RawFilter::is_null("Highlighted");
    assert_eq!(RawFilter::all(vec![single.clone()]), Some(single));

    let nested = RawFilter::all(vec![
      RawFilter::any(vec![
        RawFilter::eq_bool("Highlighted", false),
        RawFilter::is_null("Highlighted"),
      ])
      .unwrap(),
      RawFilter::contains("TagIds", "42"),
    ])
    .unwrap();
    assert_eq!(
      nested.to_string(),
      "and(or(eq(Highlighted,false),isnull(Highlighted)),in(TagIds.[],\"42\"))"
    );
  }

  #[test]
  fn test_values_are_quoted_not_escaped() {
    assert_eq!(
      RawFilter::eq_str("Title", "say \"hi\"").to_string(),
      "eq(Title,\"say \"hi\"\")"
    );
  }
}
