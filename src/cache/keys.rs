//! Cache key derivation.
//!
//! A cache key is the composite signature `METHOD:endpoint:body-json`.
//! Request bodies are held as `serde_json::Value`, whose object map keeps
//! keys sorted, so logically identical bodies serialize identically and
//! land on the same key regardless of construction order.

use serde_json::Value;

/// The signature of a backend request, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    method: &'static str,
    endpoint: String,
    body: Option<Value>,
}

impl RequestSignature {
    /// Signature for a GET request against `endpoint` (path plus query).
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: "GET",
            endpoint: endpoint.into(),
            body: None,
        }
    }

    /// Signature for a POST request. POST responses are never cached; the
    /// signature still exists so callers have one uniform handle.
    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self {
            method: "POST",
            endpoint: endpoint.into(),
            body: Some(body),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether responses for this signature may be stored.
    pub fn is_cacheable(&self) -> bool {
        self.method == "GET"
    }

    /// The composite key string: `METHOD:endpoint:body-json`.
    pub fn cache_key(&self) -> String {
        let body = match &self.body {
            Some(value) => value.to_string(),
            None => "null".to_string(),
        };
        format!("{}:{}:{}", self.method, self.endpoint, body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_includes_method_endpoint_and_body() {
        let sig = RequestSignature::get("blog-posts?limit=10");
        assert_eq!(sig.cache_key(), "GET:blog-posts?limit=10:null");
    }

    #[test]
    fn equal_bodies_produce_equal_keys_regardless_of_insertion_order() {
        let mut first = serde_json::Map::new();
        first.insert("alpha".into(), json!(1));
        first.insert("beta".into(), json!(2));

        let mut second = serde_json::Map::new();
        second.insert("beta".into(), json!(2));
        second.insert("alpha".into(), json!(1));

        let a = RequestSignature::post("search", Value::Object(first));
        let b = RequestSignature::post("search", Value::Object(second));
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn post_signatures_are_not_cacheable() {
        let sig = RequestSignature::post("search", json!({"q": "cms"}));
        assert!(!sig.is_cacheable());
        assert!(RequestSignature::get("blog-posts").is_cacheable());
    }

    #[test]
    fn distinct_endpoints_produce_distinct_keys() {
        let a = RequestSignature::get("blog-posts?limit=10");
        let b = RequestSignature::get("blog-posts?limit=20");
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
