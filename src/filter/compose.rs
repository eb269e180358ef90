//! Turns a selection of facets into a raw filter term.

use std::collections::{BTreeMap, BTreeSet};

use super::{FilterFacet, RawFilter};

/// Compose a raw filter from selected facets.
///
/// Facets are grouped by category field. Keys within a group are combined
/// with `or`, groups with `and`; a lone operand is never wrapped. An empty
/// selection yields `None`, meaning no filter at all.
///
/// Groups are ordered by field name and keys sorted within each group, so the
/// output does not depend on selection order.
pub fn compose<'a, T, C, K>(facets: impl IntoIterator<Item = &'a T>, category: C, key: K) -> Option<RawFilter>
where
  T: 'a,
  C: Fn(&'a T) -> &'a str,
  K: Fn(&'a T) -> &'a str,
{
  let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
  for facet in facets {
    groups.entry(category(facet)).or_default().insert(key(facet));
  }

  let terms = groups.into_iter().filter_map(|(field, keys)| {
    RawFilter::any(keys.into_iter().map(|k| RawFilter::contains(field, k)))
  });

  RawFilter::all(terms)
}

/// [`compose`] over [`FilterFacet`]s, shared by the event and news feeds.
pub fn compose_facets<'a>(facets: impl IntoIterator<Item = &'a FilterFacet>) -> Option<RawFilter> {
  compose(facets, |f| f.category.field(), |f| f.key.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::FacetCategory;

  fn facets(list: &[(FacetCategory, &str)]) -> BTreeSet<FilterFacet> {
    list
      .iter()
      .map(|(c, k)| FilterFacet::new(*c, *k))
      .collect()
  }

  #[test]
  fn test_empty_selection_is_no_filter() {
    assert_eq!(compose_facets(&BTreeSet::<FilterFacet>::new()), None);
  }

  #[test]
  fn test_single_facet_is_not_wrapped() {
    let selected = facets(&[(FacetCategory::CustomTagging, "NOI Community")]);
    assert_eq!(
      compose_facets(&selected).unwrap().to_string(),
      "in(CustomTagging.[],\"NOI Community\")"
    );
  }

  #[test]
  fn test_two_categories_are_anded() {
    let selected = facets(&[
      (FacetCategory::TechnologyFields, "Alpine"),
      (FacetCategory::CustomTagging, "NOI Community"),
    ]);
    assert_eq!(
      compose_facets(&selected).unwrap().to_string(),
      "and(in(CustomTagging.[],\"NOI Community\"),in(TechnologyFields.[],\"Alpine\"))"
    );
  }

  #[test]
  fn test_same_category_is_ored_within_and() {
    let selected = facets(&[
      (FacetCategory::TechnologyFields, "Green"),
      (FacetCategory::CustomTagging, "Startup"),
      (FacetCategory::TechnologyFields, "Alpine"),
    ]);
    assert_eq!(
      compose_facets(&selected).unwrap().to_string(),
      "and(in(CustomTagging.[],\"Startup\"),or(in(TechnologyFields.[],\"Alpine\"),in(TechnologyFields.[],\"Green\")))"
    );
  }

  #[test]
  fn test_only_one_category_with_many_keys() {
    let selected = facets(&[(FacetCategory::TagIds, "b"), (FacetCategory::TagIds, "a")]);
    assert_eq!(
      compose_facets(&selected).unwrap().to_string(),
      "or(in(TagIds.[],\"a\"),in(TagIds.[],\"b\"))"
    );
  }

  #[test]
  fn test_generic_accessors() {
    struct Tag {
      kind: String,
      id: String,
    }
    let tags = [
      Tag {
        kind: "TagIds".to_string(),
        id: "news-1".to_string(),
      },
      Tag {
        kind: "TagIds".to_string(),
        id: "news-1".to_string(),
      },
    ];

    let filter = compose(&tags, |t| t.kind.as_str(), |t| t.id.as_str()).unwrap();
    assert_eq!(filter.to_string(), "in(TagIds.[],\"news-1\")");
  }
}
