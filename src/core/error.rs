use super::{
    credential_format::ClaimFormat,
    identifier::{Group, InputDescriptorId},
};

/// A model value could not be constructed because it violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("input descriptor id `{0}` is used more than once")]
    DuplicateInputDescriptorId(InputDescriptorId),

    #[error(
        "input descriptor `{descriptor}` references group `{group}` which is not present in submission requirements"
    )]
    UnreferencedGroup {
        descriptor: InputDescriptorId,
        group: Group,
    },

    #[error("pick count must be greater than zero (found {0})")]
    NonPositivePickCount(i64),

    #[error("pick min must be greater than or equal to zero (found {0})")]
    NegativePickMin(i64),

    #[error("pick max must be greater than or equal to zero (found {0})")]
    NegativePickMax(i64),

    #[error("pick bound {0} is too large")]
    PickBoundTooLarge(u64),

    #[error("pick max must be greater than or equal to min (min {min}, max {max})")]
    PickMinGreaterThanMax { min: i64, max: i64 },

    #[error("submission requirement must have exactly one of `from` or `from_nested`")]
    AmbiguousFrom,

    #[error("submission requirements are nested deeper than {max} levels")]
    RequirementTooDeep { max: usize },

    #[error("claim format `{0}` declared without any `alg` or `proof_type`")]
    MissingAlgorithms(ClaimFormat),

    #[error("claim format `{0}` is declared more than once")]
    DuplicateClaimFormat(ClaimFormat),

    #[error("unknown claim format `{0}`")]
    UnknownClaimFormat(String),

    #[error("unknown JWT algorithm `{0}`")]
    UnknownJwtAlgorithm(String),

    #[error("`{path}` is not a valid JSONPath expression: {reason}")]
    InvalidJsonPath { path: String, reason: String },

    #[error("filter must be a JSON object")]
    FilterNotObject,

    #[error("constraints must declare `fields` and/or `limit_disclosure`")]
    EmptyConstraints,
}

/// A JSON document could not be decoded into a model value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Validation(#[from] ValidationError),
}
