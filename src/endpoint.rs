//! Immutable description of an API call: a path plus ordered query parameters.

use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::error::Result;
use crate::transport::Request;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  path: String,
  query: Vec<(String, String)>,
}

impl Endpoint {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      query: Vec::new(),
    }
  }

  /// Append a query parameter.
  pub fn param(mut self, name: &str, value: impl ToString) -> Self {
    self.query.push((name.to_string(), value.to_string()));
    self
  }

  /// Append a query parameter only when a value is present.
  pub fn param_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
    match value {
      Some(v) => self.param(name, v),
      None => self,
    }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn query(&self) -> &[(String, String)] {
    &self.query
  }

  /// Look up the first value for a query parameter.
  pub fn query_value(&self, name: &str) -> Option<&str> {
    self
      .query
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.as_str())
  }

  /// Resolve against a base URL, keeping any path prefix the base carries.
  pub fn url(&self, base: &Url) -> Result<Url> {
    let mut url = base.clone();
    {
      let prefix = base.path().trim_end_matches('/');
      let path = self.path.trim_start_matches('/');
      url.set_path(&format!("{}/{}", prefix, path));
    }
    url.set_query(None);
    if !self.query.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(self.query.iter().map(|(n, v)| (n.as_str(), v.as_str())));
    }
    Ok(url)
  }

  /// Build a GET request for this endpoint.
  pub fn get(&self, base: &Url) -> Result<Request> {
    Ok(Request {
      method: Method::GET,
      url: self.url(base)?,
      headers: HeaderMap::new(),
      body: None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_absent_params_are_omitted() {
    let endpoint = Endpoint::new("/v1/Article")
      .param("pagesize", 10)
      .param_opt("rawfilter", None::<String>)
      .param_opt("publishedon", Some("noi-communityapp"));

    assert_eq!(
      endpoint.query(),
      &[
        ("pagesize".to_string(), "10".to_string()),
        ("publishedon".to_string(), "noi-communityapp".to_string()),
      ]
    );
    assert_eq!(endpoint.query_value("rawfilter"), None);
  }

  #[test]
  fn test_url_keeps_base_prefix_and_order() {
    let base = Url::parse("https://api.example.com/tourism/").unwrap();
    let endpoint = Endpoint::new("/v1/EventShort")
      .param("pagenumber", 2)
      .param("pagesize", 25);

    let url = endpoint.url(&base).unwrap();
    assert_eq!(
      url.as_str(),
      "https://api.example.com/tourism/v1/EventShort?pagenumber=2&pagesize=25"
    );
  }

  #[test]
  fn test_url_encodes_raw_filter() {
    let base = Url::parse("https://api.example.com").unwrap();
    let endpoint = Endpoint::new("v1/Article").param("rawfilter", "eq(Highlighted,true)");

    let url = endpoint.url(&base).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
      pairs,
      vec![("rawfilter".to_string(), "eq(Highlighted,true)".to_string())]
    );
  }

  #[test]
  fn test_get_builds_request() {
    let base = Url::parse("https://api.example.com").unwrap();
    let request = Endpoint::new("/v1/Tag").get(&base).unwrap();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url.path(), "/v1/Tag");
    assert!(request.body.is_none());
  }
}
