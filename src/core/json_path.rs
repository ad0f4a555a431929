use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::error::ValidationError;

/// A JSONPath is a string that represents a path to a specific value within a JSON object.
///
/// A `JsonPath` is always syntactically valid: it can only be obtained through
/// [`JsonPath::parse`] (or [`JsonPath::parse_with`]) and decoding checks the same way.
///
/// For syntax details, see [https://identity.foundation/presentation-exchange/spec/v2.0.0/#jsonpath-syntax-definition](https://identity.foundation/presentation-exchange/spec/v2.0.0/#jsonpath-syntax-definition)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonPath(String);

impl JsonPath {
    /// Parse a JSONPath expression, validating it with [`SerdeJsonPath`].
    pub fn parse(path: impl Into<String>) -> Result<Self, ValidationError> {
        Self::parse_with(path, &SerdeJsonPath)
    }

    /// Parse a JSONPath expression, validating it with the given evaluator.
    pub fn parse_with(
        path: impl Into<String>,
        evaluator: &impl JsonPathEvaluator,
    ) -> Result<Self, ValidationError> {
        let path = path.into();
        match evaluator.check_syntax(&path) {
            Ok(()) => Ok(Self(path)),
            Err(reason) => Err(ValidationError::InvalidJsonPath { path, reason }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JsonPath {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for JsonPath {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<JsonPath> for String {
    fn from(value: JsonPath) -> Self {
        value.0
    }
}

impl AsRef<str> for JsonPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// JSONPath capabilities the matcher relies on.
pub trait JsonPathEvaluator {
    /// Check that `path` is a syntactically valid JSONPath expression,
    /// returning the reason it is not otherwise.
    fn check_syntax(&self, path: &str) -> Result<(), String>;

    fn is_valid_syntax(&self, path: &str) -> bool {
        self.check_syntax(path).is_ok()
    }

    /// Select the JSON found at `path` in `document`, if any.
    fn select(&self, path: &JsonPath, document: &Json) -> Option<Json>;
}

impl<T: JsonPathEvaluator + ?Sized> JsonPathEvaluator for &T {
    fn check_syntax(&self, path: &str) -> Result<(), String> {
        (**self).check_syntax(path)
    }

    fn select(&self, path: &JsonPath, document: &Json) -> Option<Json> {
        (**self).select(path, document)
    }
}

/// [RFC 9535](https://www.rfc-editor.org/rfc/rfc9535) JSONPath evaluation, backed by `serde_json_path`.
///
/// A query selecting a single node yields that node. A query selecting several
/// nodes yields them as a JSON array, in document order.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeJsonPath;

impl JsonPathEvaluator for SerdeJsonPath {
    fn check_syntax(&self, path: &str) -> Result<(), String> {
        serde_json_path::JsonPath::parse(path)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn select(&self, path: &JsonPath, document: &Json) -> Option<Json> {
        let query = match serde_json_path::JsonPath::parse(path.as_str()) {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!("JSONPath `{path}` failed to parse: {e}");
                return None;
            }
        };

        let nodes = query.query(document);
        match nodes.len() {
            0 => None,
            1 => nodes.first().cloned(),
            _ => Some(Json::Array(nodes.iter().map(|&n| n.clone()).collect())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn invalid_paths_are_rejected() {
        assert!(JsonPath::parse("$.credentialSubject.birth_date").is_ok());
        assert!(JsonPath::parse("$['vc']['issuer']").is_ok());

        let err = JsonPath::parse("credentialSubject..").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJsonPath { .. }));

        assert!(serde_json::from_value::<JsonPath>(json!("$[")).is_err());
        assert_eq!(
            serde_json::from_value::<JsonPath>(json!("$.iss")).unwrap(),
            JsonPath::parse("$.iss").unwrap()
        );
    }

    #[test]
    fn select_values() {
        let document = json!({
            "vc": {
                "issuer": "did:example:123",
                "type": ["VerifiableCredential", "BankAccount"]
            }
        });

        let issuer = JsonPath::parse("$.vc.issuer").unwrap();
        assert_eq!(
            SerdeJsonPath.select(&issuer, &document),
            Some(json!("did:example:123"))
        );

        let types = JsonPath::parse("$.vc.type[*]").unwrap();
        assert_eq!(
            SerdeJsonPath.select(&types, &document),
            Some(json!(["VerifiableCredential", "BankAccount"]))
        );

        let missing = JsonPath::parse("$.vc.credentialSubject").unwrap();
        assert_eq!(SerdeJsonPath.select(&missing, &document), None);
    }
}
