use serde_json::Value as Json;

use super::{
    CandidateClaim, FieldConstraintMatcher, FieldQueryResult, InputDescriptorEvaluation,
    NotMatchedFieldConstraints,
};
use crate::core::{
    credential_format::Format,
    filter::{FilterEvaluator, JsonSchemaFilter},
    input_descriptor::InputDescriptor,
    json_path::{JsonPathEvaluator, SerdeJsonPath},
};

/// Evaluates an input descriptor against a claim: format compatibility first,
/// then every field constraint.
#[derive(Clone, Debug, Default)]
pub struct InputDescriptorEvaluator<P = SerdeJsonPath, F = JsonSchemaFilter> {
    fields: FieldConstraintMatcher<P, F>,
}

impl<P: JsonPathEvaluator, F: FilterEvaluator> InputDescriptorEvaluator<P, F> {
    pub fn new(fields: FieldConstraintMatcher<P, F>) -> Self {
        Self { fields }
    }

    /// Evaluate `descriptor` against a claim available in `claim_format`.
    ///
    /// The descriptor format, if any, overrides `definition_format`.
    pub fn evaluate<'a>(
        &self,
        definition_format: Option<&Format>,
        descriptor: &'a InputDescriptor,
        claim_format: &Format,
        claim: &Json,
    ) -> InputDescriptorEvaluation<'a> {
        let allowed = descriptor.format().or(definition_format);
        if !is_format_supported(allowed, claim_format) {
            tracing::debug!(
                "input descriptor `{}` does not support the claim format",
                descriptor.id()
            );
            return InputDescriptorEvaluation::UnsupportedFormat;
        }

        let mut matches = Vec::new();
        let mut missing = Vec::new();
        for constraint in descriptor.constraints().fields() {
            match self.fields.match_field(constraint, claim) {
                FieldQueryResult::Candidate(field) => matches.push((constraint, field)),
                FieldQueryResult::RequiredFieldNotFound => missing.push(constraint),
            }
        }

        if missing.is_empty() {
            InputDescriptorEvaluation::CandidateClaim(CandidateClaim { matches })
        } else {
            InputDescriptorEvaluation::NotMatchedFieldConstraints(NotMatchedFieldConstraints {
                missing,
            })
        }
    }
}

/// An absent or empty allowed format accepts every claim format.
fn is_format_supported(allowed: Option<&Format>, claim_format: &Format) -> bool {
    match allowed {
        None => true,
        Some(allowed) if allowed.is_empty() => true,
        Some(allowed) => allowed.intersects(claim_format),
    }
}
