use std::sync::{Arc, OnceLock};

use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::error::ValidationError;

/// A JSON Schema descriptor used to filter the values selected by a field constraint path.
///
/// The filter is only required to be a JSON object. It is compiled as a schema
/// the first time it is evaluated, and clones share the compiled schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Json", into = "Json")]
pub struct Filter {
    schema: Map<String, Json>,
    validator: Arc<OnceLock<Option<JSONSchema>>>,
}

impl Filter {
    pub fn new(schema: Map<String, Json>) -> Self {
        Self {
            schema,
            validator: Arc::default(),
        }
    }

    pub fn as_object(&self) -> &Map<String, Json> {
        &self.schema
    }

    /// Return the compiled schema, or `None` if the filter is not a valid JSON Schema.
    pub fn validator(&self) -> Option<&JSONSchema> {
        self.validator
            .get_or_init(|| {
                let schema = Json::Object(self.schema.clone());
                let compiled = match JSONSchema::compile(&schema) {
                    Ok(validator) => Some(validator),
                    Err(e) => {
                        tracing::warn!("filter is not a valid JSON schema: {e}");
                        None
                    }
                };
                compiled
            })
            .as_ref()
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
    }
}

impl Eq for Filter {}

impl TryFrom<Json> for Filter {
    type Error = ValidationError;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Object(schema) => Ok(Self::new(schema)),
            _ => Err(ValidationError::FilterNotObject),
        }
    }
}

impl From<Filter> for Json {
    fn from(value: Filter) -> Self {
        Json::Object(value.schema)
    }
}

/// JSON Schema capabilities the matcher relies on.
pub trait FilterEvaluator {
    /// Returns whether `value` satisfies the `filter` schema.
    fn is_satisfied(&self, filter: &Filter, value: &Json) -> bool;
}

impl<T: FilterEvaluator + ?Sized> FilterEvaluator for &T {
    fn is_satisfied(&self, filter: &Filter, value: &Json) -> bool {
        (**self).is_satisfied(filter, value)
    }
}

/// Filter evaluation backed by the `jsonschema` crate.
///
/// A filter which does not compile as a JSON Schema is never satisfied.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSchemaFilter;

impl FilterEvaluator for JsonSchemaFilter {
    fn is_satisfied(&self, filter: &Filter, value: &Json) -> bool {
        let Some(validator) = filter.validator() else {
            return false;
        };

        match validator.validate(value) {
            Ok(()) => true,
            Err(errors) => {
                for error in errors {
                    tracing::debug!("Field did not pass filter validation: {error}");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn filter_must_be_an_object() {
        assert!(serde_json::from_value::<Filter>(json!({ "type": "string" })).is_ok());
        assert!(serde_json::from_value::<Filter>(json!("string")).is_err());
        assert_eq!(
            Filter::try_from(json!([1])),
            Err(ValidationError::FilterNotObject)
        );
    }

    #[test]
    fn filter_evaluation() {
        let filter: Filter = serde_json::from_value(json!({
            "type": "string",
            "const": "https://bank-standards.example.com/fullaccountroute.json"
        }))
        .unwrap();

        assert!(JsonSchemaFilter.is_satisfied(
            &filter,
            &json!("https://bank-standards.example.com/fullaccountroute.json")
        ));
        assert!(!JsonSchemaFilter.is_satisfied(&filter, &json!("https://example.com")));
        assert!(!JsonSchemaFilter.is_satisfied(&filter, &json!(42)));
    }

    #[test]
    fn invalid_schema_never_matches() {
        let filter: Filter = serde_json::from_value(json!({ "type": 12 })).unwrap();
        assert!(!JsonSchemaFilter.is_satisfied(&filter, &json!("anything")));
        assert!(filter.validator().is_none());
    }

    #[test]
    fn schema_is_compiled_once_and_shared_by_clones() {
        let filter: Filter = serde_json::from_value(json!({ "type": "string" })).unwrap();
        let copy = filter.clone();

        let compiled = filter.validator().unwrap() as *const JSONSchema;
        assert!(std::ptr::eq(compiled, filter.validator().unwrap()));
        assert!(std::ptr::eq(compiled, copy.validator().unwrap()));

        assert!(JsonSchemaFilter.is_satisfied(&copy, &json!("text")));
        assert!(!JsonSchemaFilter.is_satisfied(&copy, &json!(1)));
        assert_eq!(filter, copy);
    }
}
