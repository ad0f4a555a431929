use serde_json::Value as Json;

use super::{CandidateField, FieldQueryResult};
use crate::core::{
    filter::{FilterEvaluator, JsonSchemaFilter},
    input_descriptor::FieldConstraint,
    json_path::{JsonPathEvaluator, SerdeJsonPath},
};

/// Evaluates a field constraint against the JSON projection of a claim.
#[derive(Clone, Debug, Default)]
pub struct FieldConstraintMatcher<P = SerdeJsonPath, F = JsonSchemaFilter> {
    paths: P,
    filters: F,
}

impl<P: JsonPathEvaluator, F: FilterEvaluator> FieldConstraintMatcher<P, F> {
    pub fn new(paths: P, filters: F) -> Self {
        Self { paths, filters }
    }

    /// Paths are tried in declaration order. The first one selecting a value
    /// that passes the filter wins, and later paths are not evaluated.
    pub fn match_field(&self, constraint: &FieldConstraint, claim: &Json) -> FieldQueryResult {
        for path in constraint.paths().iter() {
            let Some(content) = self.paths.select(path, claim) else {
                continue;
            };

            let passes = constraint
                .filter()
                .map_or(true, |filter| self.filters.is_satisfied(filter, &content));

            if passes {
                return FieldQueryResult::Candidate(CandidateField::Found {
                    path: path.clone(),
                    content,
                });
            }

            tracing::debug!("value at `{path}` does not pass the field filter");
        }

        if constraint.is_optional() {
            FieldQueryResult::Candidate(CandidateField::OptionalFieldNotFound)
        } else {
            FieldQueryResult::RequiredFieldNotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::core::{filter::Filter, json_path::JsonPath};

    fn path(p: &str) -> JsonPath {
        JsonPath::parse(p).unwrap()
    }

    fn filter(value: Json) -> Filter {
        Filter::try_from(value).unwrap()
    }

    #[test]
    fn first_satisfying_path_wins() {
        let matcher: FieldConstraintMatcher = FieldConstraintMatcher::default();
        let constraint = FieldConstraint::new(path("$.issuer")).add_path(path("$.vc.issuer"));

        let claim = json!({ "vc": { "issuer": "did:example:123" } });
        assert_eq!(
            matcher.match_field(&constraint, &claim),
            FieldQueryResult::Candidate(CandidateField::Found {
                path: path("$.vc.issuer"),
                content: json!("did:example:123")
            })
        );

        let claim = json!({ "issuer": "did:example:456", "vc": { "issuer": "did:example:123" } });
        assert_eq!(
            matcher.match_field(&constraint, &claim),
            FieldQueryResult::Candidate(CandidateField::Found {
                path: path("$.issuer"),
                content: json!("did:example:456")
            })
        );
    }

    #[test]
    fn filter_selects_among_paths() {
        let matcher: FieldConstraintMatcher = FieldConstraintMatcher::default();
        let constraint = FieldConstraint::new(path("$.credentialSchema.id"))
            .add_path(path("$.vc.credentialSchema.id"))
            .set_filter(filter(json!({
                "type": "string",
                "const": "https://bank-standards.example.com/fullaccountroute.json"
            })));

        let claim = json!({
            "credentialSchema": { "id": "https://example.com/other.json" },
            "vc": {
                "credentialSchema": { "id": "https://bank-standards.example.com/fullaccountroute.json" }
            }
        });
        assert_eq!(
            matcher.match_field(&constraint, &claim),
            FieldQueryResult::Candidate(CandidateField::Found {
                path: path("$.vc.credentialSchema.id"),
                content: json!("https://bank-standards.example.com/fullaccountroute.json")
            })
        );

        let claim = json!({ "credentialSchema": { "id": "https://example.com/other.json" } });
        assert_eq!(
            matcher.match_field(&constraint, &claim),
            FieldQueryResult::RequiredFieldNotFound
        );
    }

    #[test]
    fn optional_field() {
        let matcher: FieldConstraintMatcher = FieldConstraintMatcher::default();
        let constraint = FieldConstraint::new(path("$.nickname")).set_optional(true);

        assert_eq!(
            matcher.match_field(&constraint, &json!({ "name": "Alice" })),
            FieldQueryResult::Candidate(CandidateField::OptionalFieldNotFound)
        );
    }

    #[derive(Default)]
    struct RecordingPaths {
        selected: RefCell<Vec<String>>,
    }

    impl JsonPathEvaluator for RecordingPaths {
        fn check_syntax(&self, _path: &str) -> Result<(), String> {
            Ok(())
        }

        fn select(&self, path: &JsonPath, document: &Json) -> Option<Json> {
            self.selected.borrow_mut().push(path.to_string());
            SerdeJsonPath.select(path, document)
        }
    }

    #[test]
    fn later_paths_are_not_evaluated() {
        let paths = RecordingPaths::default();
        let matcher = FieldConstraintMatcher::new(&paths, JsonSchemaFilter);
        let constraint = FieldConstraint::new(path("$.a"))
            .add_path(path("$.b"))
            .add_path(path("$.c"));

        let result = matcher.match_field(&constraint, &json!({ "b": 1, "c": 2 }));
        assert!(result.is_candidate());
        assert_eq!(*paths.selected.borrow(), ["$.a", "$.b"]);
    }
}
