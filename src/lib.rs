//! This library provides a Rust implementation of the matching core of [DIF Presentation Exchange 2.0].
//!
//! [DIF Presentation Exchange 2.0]: <https://identity.foundation/presentation-exchange/spec/v2.0.0/>
//!
//! Given a verifier-issued presentation definition and a set of holder claims,
//! it decides whether the claims collectively satisfy the definition, and if
//! so, which claim satisfies which input descriptor through which JSON value.
//!
//! # Usage
//!
//! ```
//! use prex::core::presentation_definition::PresentationDefinition;
//! use prex::core::credential_format::{Format, LdpProof, LdpType, SupportedClaimFormat};
//! use prex::core::identifier::InputDescriptorId;
//! use prex::matcher::{PresentationMatcher, SimpleClaim};
//! use serde_json::json;
//!
//! // Decode a presentation definition, bare or embedded in an authorization request.
//! let definition = PresentationDefinition::from_embedded(json!({
//!     "presentation_definition": {
//!         "id": "32f54163-7166-48f1-93d8-ff217bdb0653",
//!         "input_descriptors": [{
//!             "id": "bankaccount_input",
//!             "constraints": {
//!                 "fields": [{
//!                     "path": ["$.credentialSchema.id", "$.vc.credentialSchema.id"],
//!                     "filter": {
//!                         "type": "string",
//!                         "const": "https://bank-standards.example.com/fullaccountroute.json"
//!                     }
//!                 }]
//!             }
//!         }]
//!     }
//! }))?;
//!
//! let ldp_vc = Format::from(SupportedClaimFormat::ldp(
//!     LdpType::LdpVc,
//!     [LdpProof::Ed25519Signature2018],
//! )?);
//! let claims = [SimpleClaim::new(
//!     "bank-account-credential",
//!     ldp_vc,
//!     json!({
//!         "credentialSchema": { "id": "https://bank-standards.example.com/fullaccountroute.json" }
//!     }),
//! )];
//!
//! let outcome = PresentationMatcher::new().match_claims(&definition, &claims);
//! assert!(outcome.is_matched());
//!
//! let candidates = outcome
//!     .candidates(&InputDescriptorId::from("bankaccount_input"))
//!     .expect("candidate claims");
//! assert!(candidates.contains_key("bank-account-credential"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Data Model
//!
//! All the presentation exchange vocabulary lives in the [`core`] module.
//! Values are validated when they are constructed or decoded, so a
//! [`PresentationDefinition`] that exists is always consistent.
//!
//! [`PresentationDefinition`]: crate::core::presentation_definition::PresentationDefinition
//!
//! # Matching
//!
//! Matching is performed by the [`PresentationMatcher`]. JSONPath and JSON
//! Schema evaluation are collaborators, see
//! [`JsonPathEvaluator`](crate::core::json_path::JsonPathEvaluator) and
//! [`FilterEvaluator`](crate::core::filter::FilterEvaluator).
//!
//! [`PresentationMatcher`]: crate::matcher::PresentationMatcher

pub mod config;
pub mod core;
pub mod matcher;
pub mod utils;
