//! Matching of claims against a presentation definition.
//!
//! Every claim is evaluated against every input descriptor of the definition.
//! The outcomes are partitioned per input descriptor into candidate and not
//! matched claims, which [`SubmissionRequirementResolver`] folds into an
//! overall [`Match`].
//!
//! ```
//! # use prex::core::presentation_definition::PresentationDefinition;
//! # use prex::core::credential_format::{Format, LdpProof, LdpType, SupportedClaimFormat};
//! # use prex::matcher::{PresentationMatcher, SimpleClaim};
//! # use serde_json::json;
//! let definition = PresentationDefinition::try_from(json!({
//!     "id": "32f54163-7166-48f1-93d8-ff217bdb0653",
//!     "input_descriptors": [{
//!         "id": "bank_account",
//!         "constraints": { "fields": [{ "path": ["$.issuer", "$.vc.issuer"] }] }
//!     }]
//! }))?;
//!
//! let format = Format::from(SupportedClaimFormat::ldp(
//!     LdpType::LdpVc,
//!     [LdpProof::Ed25519Signature2018],
//! )?);
//! let claim = SimpleClaim::new("claim-1", format, json!({ "issuer": "did:example:123" }));
//!
//! let outcome = PresentationMatcher::new().match_claims(&definition, &[claim]);
//! assert!(outcome.is_matched());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::core::{
    credential_format::Format,
    filter::{FilterEvaluator, JsonSchemaFilter},
    identifier::InputDescriptorId,
    input_descriptor::FieldConstraint,
    json_path::{JsonPath, JsonPathEvaluator, SerdeJsonPath},
    presentation_definition::PresentationDefinition,
};

pub mod field_constraint;
pub mod input_descriptor;
pub mod submission_requirement;

pub use field_constraint::FieldConstraintMatcher;
pub use input_descriptor::InputDescriptorEvaluator;
pub use submission_requirement::SubmissionRequirementResolver;

/// Unique identifier of a claim, as provided by the holder.
pub type ClaimId = String;

/// A credential-like document held by the holder.
pub trait Claim {
    /// Identifier of the claim, unique among the claims of one match call.
    fn unique_id(&self) -> &str;

    /// Formats the claim is available in.
    fn format(&self) -> &Format;

    /// JSON projection of the claim, against which field constraints are evaluated.
    fn as_json(&self) -> Cow<'_, Json>;
}

impl<T: Claim + ?Sized> Claim for &T {
    fn unique_id(&self) -> &str {
        (**self).unique_id()
    }

    fn format(&self) -> &Format {
        (**self).format()
    }

    fn as_json(&self) -> Cow<'_, Json> {
        (**self).as_json()
    }
}

impl<T: Claim + ?Sized> Claim for Box<T> {
    fn unique_id(&self) -> &str {
        (**self).unique_id()
    }

    fn format(&self) -> &Format {
        (**self).format()
    }

    fn as_json(&self) -> Cow<'_, Json> {
        (**self).as_json()
    }
}

/// A claim whose JSON projection is already available.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleClaim {
    id: ClaimId,
    format: Format,
    value: Json,
}

impl SimpleClaim {
    pub fn new(id: impl Into<ClaimId>, format: impl Into<Format>, value: Json) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            value,
        }
    }

    pub fn value(&self) -> &Json {
        &self.value
    }
}

impl Claim for SimpleClaim {
    fn unique_id(&self) -> &str {
        &self.id
    }

    fn format(&self) -> &Format {
        &self.format
    }

    fn as_json(&self) -> Cow<'_, Json> {
        Cow::Borrowed(&self.value)
    }
}

/// Outcome of matching a field constraint against a claim.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldQueryResult {
    /// No path of a required field constraint selected a value passing the filter.
    RequiredFieldNotFound,
    Candidate(CandidateField),
}

impl FieldQueryResult {
    pub fn is_candidate(&self) -> bool {
        matches!(self, Self::Candidate(_))
    }
}

/// A field constraint outcome that does not prevent the claim from being a candidate.
#[derive(Clone, Debug, PartialEq)]
pub enum CandidateField {
    /// The value selected by `path` passes the filter, if any.
    Found { path: JsonPath, content: Json },
    /// Reserved for predicate support; never produced by the matcher.
    PredicateEvaluated {
        path: JsonPath,
        predicate_evaluation: bool,
    },
    /// An optional field constraint selected no value passing the filter.
    OptionalFieldNotFound,
}

/// Outcome of evaluating an input descriptor against a claim.
#[derive(Clone, Debug, PartialEq)]
pub enum InputDescriptorEvaluation<'a> {
    CandidateClaim(CandidateClaim<'a>),
    NotMatchedFieldConstraints(NotMatchedFieldConstraints<'a>),
    /// None of the claim formats is allowed by the input descriptor. No field
    /// constraint was evaluated.
    UnsupportedFormat,
}

/// A claim satisfying every required field constraint of an input descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateClaim<'a> {
    /// Outcome of each field constraint, in declaration order.
    pub matches: Vec<(&'a FieldConstraint, CandidateField)>,
}

/// A claim failing some required field constraints of an input descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct NotMatchedFieldConstraints<'a> {
    /// The required field constraints the claim does not satisfy.
    pub missing: Vec<&'a FieldConstraint>,
}

/// Candidate claims, per input descriptor then per claim.
pub type CandidatesByDescriptor<'a> =
    IndexMap<&'a InputDescriptorId, IndexMap<ClaimId, CandidateClaim<'a>>>;

/// Not matched claims, per input descriptor then per claim.
pub type NotMatchedByDescriptor<'a> =
    IndexMap<&'a InputDescriptorId, IndexMap<ClaimId, NotMatchedFieldConstraints<'a>>>;

/// Overall outcome of matching claims against a presentation definition.
///
/// Maps follow the order of the input descriptors in the definition, then the
/// order of the claims.
#[derive(Clone, Debug, PartialEq)]
pub enum Match<'a> {
    /// The claims satisfy the definition. Candidate claims are given for every
    /// input descriptor contributing to the outcome.
    Matched { matches: CandidatesByDescriptor<'a> },
    /// The claims do not satisfy the definition. Details are given for every
    /// required input descriptor without candidate claims.
    NotMatched { details: NotMatchedByDescriptor<'a> },
}

impl<'a> Match<'a> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Return the candidate claims of an input descriptor, if the claims matched.
    pub fn candidates(
        &self,
        descriptor: &InputDescriptorId,
    ) -> Option<&IndexMap<ClaimId, CandidateClaim<'a>>> {
        match self {
            Self::Matched { matches } => matches.get(descriptor),
            Self::NotMatched { .. } => None,
        }
    }

    /// Return the not matched claims of an input descriptor, if the claims did not match.
    pub fn not_matched(
        &self,
        descriptor: &InputDescriptorId,
    ) -> Option<&IndexMap<ClaimId, NotMatchedFieldConstraints<'a>>> {
        match self {
            Self::Matched { .. } => None,
            Self::NotMatched { details } => details.get(descriptor),
        }
    }
}

/// Matches claims against presentation definitions.
///
/// JSONPath and JSON Schema evaluation are delegated to the `P` and `F`
/// collaborators.
#[derive(Clone, Debug, Default)]
pub struct PresentationMatcher<P = SerdeJsonPath, F = JsonSchemaFilter> {
    evaluator: InputDescriptorEvaluator<P, F>,
}

impl PresentationMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: JsonPathEvaluator, F: FilterEvaluator> PresentationMatcher<P, F> {
    pub fn with_evaluators(paths: P, filters: F) -> Self {
        Self {
            evaluator: InputDescriptorEvaluator::new(FieldConstraintMatcher::new(paths, filters)),
        }
    }

    /// Match `claims` against `definition`.
    ///
    /// Not matching is a regular outcome, not an error.
    pub fn match_claims<'a, C: Claim>(
        &self,
        definition: &'a PresentationDefinition,
        claims: &[C],
    ) -> Match<'a> {
        let projections: Vec<_> = claims.iter().map(|c| (c, c.as_json())).collect();

        let mut candidates = CandidatesByDescriptor::new();
        let mut not_matched = NotMatchedByDescriptor::new();

        for descriptor in definition.input_descriptors().iter() {
            let mut descriptor_candidates = IndexMap::new();
            let mut descriptor_not_matched = IndexMap::new();

            for (claim, json) in &projections {
                let evaluation =
                    self.evaluator
                        .evaluate(definition.format(), descriptor, claim.format(), json);

                match evaluation {
                    InputDescriptorEvaluation::CandidateClaim(c) => {
                        descriptor_candidates.insert(claim.unique_id().to_owned(), c);
                    }
                    InputDescriptorEvaluation::NotMatchedFieldConstraints(n) => {
                        descriptor_not_matched.insert(claim.unique_id().to_owned(), n);
                    }
                    InputDescriptorEvaluation::UnsupportedFormat => {}
                }
            }

            tracing::debug!(
                "input descriptor `{}`: {} candidate claim(s), {} not matched",
                descriptor.id(),
                descriptor_candidates.len(),
                descriptor_not_matched.len()
            );

            if !descriptor_candidates.is_empty() {
                candidates.insert(descriptor.id(), descriptor_candidates);
            }
            if !descriptor_not_matched.is_empty() {
                not_matched.insert(descriptor.id(), descriptor_not_matched);
            }
        }

        SubmissionRequirementResolver::resolve(definition, candidates, not_matched)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::credential_format::{DigSigAlgorithm, JwtAlgorithm, JwtType, SupportedClaimFormat};

    fn jwt_vc() -> Format {
        SupportedClaimFormat::jwt(
            JwtType::JwtVc,
            [JwtAlgorithm::DigSig(DigSigAlgorithm::ES256)],
        )
        .unwrap()
        .into()
    }

    fn definition() -> PresentationDefinition {
        PresentationDefinition::try_from(json!({
            "id": "pd",
            "input_descriptors": [
                {
                    "id": "A",
                    "constraints": { "fields": [{ "path": ["$.a"] }] }
                },
                {
                    "id": "B",
                    "constraints": { "fields": [{ "path": ["$.b"] }] }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn all_descriptors_required_without_submission_requirements() {
        let definition = definition();
        let matcher = PresentationMatcher::new();

        let only_a = [SimpleClaim::new("c1", jwt_vc(), json!({ "a": 1 }))];
        let outcome = matcher.match_claims(&definition, &only_a);
        assert!(!outcome.is_matched());

        let b = InputDescriptorId::from("B");
        let details = outcome.not_matched(&b).unwrap();
        assert_eq!(details["c1"].missing.len(), 1);
        assert!(outcome.not_matched(&InputDescriptorId::from("A")).is_none());

        let both = [
            SimpleClaim::new("c1", jwt_vc(), json!({ "a": 1 })),
            SimpleClaim::new("c2", jwt_vc(), json!({ "b": 2 })),
        ];
        let outcome = matcher.match_claims(&definition, &both);
        assert!(outcome.is_matched());
        assert_eq!(
            outcome
                .candidates(&InputDescriptorId::from("A"))
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            ["c1"]
        );
        assert_eq!(
            outcome
                .candidates(&b)
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            ["c2"]
        );
    }

    #[test]
    fn every_candidate_is_kept_in_claim_order() {
        let definition = definition();
        let claims = [
            SimpleClaim::new("c3", jwt_vc(), json!({ "a": 1, "b": 1 })),
            SimpleClaim::new("c1", jwt_vc(), json!({ "a": 2 })),
            SimpleClaim::new("c2", jwt_vc(), json!({ "b": 2 })),
        ];

        let outcome = PresentationMatcher::new().match_claims(&definition, &claims);
        assert_eq!(
            outcome
                .candidates(&InputDescriptorId::from("A"))
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            ["c3", "c1"]
        );
        assert_eq!(
            outcome
                .candidates(&InputDescriptorId::from("B"))
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            ["c3", "c2"]
        );
    }

    #[test]
    fn no_claims() {
        let definition = definition();
        let outcome = PresentationMatcher::new().match_claims(&definition, &[] as &[SimpleClaim]);
        match outcome {
            Match::NotMatched { details } => {
                assert_eq!(details.len(), 2);
                assert!(details.values().all(IndexMap::is_empty));
            }
            Match::Matched { .. } => panic!("expected no match"),
        }
    }

    #[test]
    fn boxed_claims() {
        let definition = definition();
        let claims: Vec<Box<dyn Claim>> = vec![
            Box::new(SimpleClaim::new("c1", jwt_vc(), json!({ "a": 1 }))),
            Box::new(SimpleClaim::new("c2", jwt_vc(), json!({ "b": 1 }))),
        ];
        assert!(PresentationMatcher::new()
            .match_claims(&definition, &claims)
            .is_matched());
    }
}
