use prex::{
    core::{
        credential_format::{
            DigSigAlgorithm, Format, JwtAlgorithm, JwtType, LdpProof, LdpType, SupportedClaimFormat,
        },
        identifier::InputDescriptorId,
        presentation_definition::PresentationDefinition,
    },
    matcher::{CandidateField, Match, PresentationMatcher, SimpleClaim},
};
use serde_json::{json, Value as Json};

fn ldp_vc() -> Format {
    SupportedClaimFormat::ldp(LdpType::LdpVc, [LdpProof::Ed25519Signature2018])
        .unwrap()
        .into()
}

fn jwt_vc() -> Format {
    SupportedClaimFormat::jwt(
        JwtType::JwtVc,
        [JwtAlgorithm::DigSig(DigSigAlgorithm::ES256K)],
    )
    .unwrap()
    .into()
}

fn definition(value: Json) -> PresentationDefinition {
    PresentationDefinition::try_from(value).unwrap()
}

fn id(id: &str) -> InputDescriptorId {
    InputDescriptorId::from(id)
}

fn bank_definition() -> PresentationDefinition {
    definition(json!({
        "id": "32f54163-7166-48f1-93d8-ff217bdb0653",
        "input_descriptors": [
            {
                "id": "issuer_input",
                "constraints": {
                    "fields": [{ "path": ["$.issuer", "$.vc.issuer", "$.iss"] }]
                }
            },
            {
                "id": "bankaccount_input",
                "name": "Full Bank Account Routing Information",
                "purpose": "We can only remit payment to a currently-valid bank account, submitted as an ABA RTN + Acct # or IBAN.",
                "constraints": {
                    "fields": [{
                        "path": ["$.credentialSchema.id", "$.vc.credentialSchema.id"],
                        "filter": {
                            "type": "string",
                            "const": "https://bank-standards.example.com/fullaccountroute.json"
                        }
                    }]
                }
            }
        ]
    }))
}

fn bank_account_claim() -> SimpleClaim {
    SimpleClaim::new(
        "bank-account",
        ldp_vc(),
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "BankAccountCredential"],
            "issuer": "did:example:123",
            "credentialSchema": {
                "id": "https://bank-standards.example.com/fullaccountroute.json",
                "type": "JsonSchemaValidator2018"
            },
            "credentialSubject": {
                "id": "did:example:ebfeb1f712ebc6f1c276e12ec21",
                "account": [{ "id": "1234567890", "route": "DE-9876543210" }]
            }
        }),
    )
}

fn unrelated_claim() -> SimpleClaim {
    SimpleClaim::new(
        "library-card",
        ldp_vc(),
        json!({
            "type": ["VerifiableCredential", "LibraryCard"],
            "credentialSubject": { "member_since": "2010-01-01" }
        }),
    )
}

#[test]
fn bank_account_scenario() {
    let definition = bank_definition();
    let claims = [unrelated_claim(), bank_account_claim()];

    let outcome = PresentationMatcher::new().match_claims(&definition, &claims);
    let Match::Matched { matches } = &outcome else {
        panic!("expected a match");
    };
    assert_eq!(matches.len(), 2);

    for descriptor in ["issuer_input", "bankaccount_input"] {
        let candidates = outcome.candidates(&id(descriptor)).unwrap();
        assert_eq!(
            candidates.keys().collect::<Vec<_>>(),
            ["bank-account"],
            "unexpected candidates for {descriptor}"
        );
    }

    let candidate = &outcome.candidates(&id("bankaccount_input")).unwrap()["bank-account"];
    let [(_, CandidateField::Found { path, content })] = candidate.matches.as_slice() else {
        panic!("expected a single found field");
    };
    assert_eq!(path.as_str(), "$.credentialSchema.id");
    assert_eq!(
        content,
        &json!("https://bank-standards.example.com/fullaccountroute.json")
    );
}

#[test]
fn bank_account_scenario_without_matching_claim() {
    let definition = bank_definition();
    let claims = [unrelated_claim()];

    let outcome = PresentationMatcher::new().match_claims(&definition, &claims);
    assert!(!outcome.is_matched());

    for descriptor in ["issuer_input", "bankaccount_input"] {
        let details = outcome.not_matched(&id(descriptor)).unwrap();
        assert_eq!(details["library-card"].missing.len(), 1);
    }
}

#[test]
fn optional_fields_do_not_prevent_matching() {
    let definition = definition(json!({
        "id": "pd",
        "input_descriptors": [{
            "id": "employment",
            "constraints": {
                "fields": [
                    { "path": ["$.credentialSubject.employer"] },
                    { "path": ["$.credentialSubject.title"], "optional": true }
                ]
            }
        }]
    }));
    let claims = [SimpleClaim::new(
        "employment-credential",
        ldp_vc(),
        json!({ "credentialSubject": { "employer": "ACME" } }),
    )];

    let outcome = PresentationMatcher::new().match_claims(&definition, &claims);
    let candidate = &outcome.candidates(&id("employment")).unwrap()["employment-credential"];
    assert_eq!(candidate.matches.len(), 2);
    assert_eq!(candidate.matches[1].1, CandidateField::OptionalFieldNotFound);
}

#[test]
fn format_mismatch_is_not_a_candidate() {
    let definition = definition(json!({
        "id": "pd",
        "input_descriptors": [{
            "id": "ldp_only",
            "format": { "ldp_vc": { "proof_type": ["Ed25519Signature2018"] } },
            "constraints": { "fields": [{ "path": ["$.issuer"] }] }
        }]
    }));

    let jwt_claim = SimpleClaim::new("jwt", jwt_vc(), json!({ "issuer": "did:example:123" }));
    let outcome = PresentationMatcher::new().match_claims(&definition, &[jwt_claim.clone()]);
    assert!(!outcome.is_matched());
    // Unsupported formats are not reported as failed field constraints.
    assert!(outcome.not_matched(&id("ldp_only")).unwrap().is_empty());

    let ldp_claim = SimpleClaim::new("ldp", ldp_vc(), json!({ "issuer": "did:example:123" }));
    let outcome = PresentationMatcher::new().match_claims(&definition, &[jwt_claim, ldp_claim]);
    assert_eq!(
        outcome
            .candidates(&id("ldp_only"))
            .unwrap()
            .keys()
            .collect::<Vec<_>>(),
        ["ldp"]
    );
}

#[test]
fn definition_format_applies_to_every_descriptor() {
    let definition = definition(json!({
        "id": "pd",
        "format": { "jwt_vc": { "alg": ["ES256K"] } },
        "input_descriptors": [
            { "id": "a", "constraints": { "fields": [{ "path": ["$.a"] }] } },
            {
                "id": "b",
                "format": { "ldp_vc": { "proof_type": ["Ed25519Signature2018"] } },
                "constraints": { "fields": [{ "path": ["$.b"] }] }
            }
        ]
    }));

    let claims = [
        SimpleClaim::new("jwt", jwt_vc(), json!({ "a": 1, "b": 1 })),
        SimpleClaim::new("ldp", ldp_vc(), json!({ "a": 1, "b": 1 })),
    ];
    let outcome = PresentationMatcher::new().match_claims(&definition, &claims);
    assert_eq!(
        outcome.candidates(&id("a")).unwrap().keys().collect::<Vec<_>>(),
        ["jwt"]
    );
    assert_eq!(
        outcome.candidates(&id("b")).unwrap().keys().collect::<Vec<_>>(),
        ["ldp"]
    );
}

#[test]
fn pick_one_of_group() {
    let definition = definition(json!({
        "id": "pd",
        "submission_requirements": [
            { "name": "Citizenship Information", "rule": "pick", "min": 1, "max": 1, "from": "A" }
        ],
        "input_descriptors": [
            {
                "id": "passport",
                "group": ["A"],
                "constraints": { "fields": [{ "path": ["$.passport_number"] }] }
            },
            {
                "id": "drivers_license",
                "group": ["A"],
                "constraints": { "fields": [{ "path": ["$.license_number"] }] }
            }
        ]
    }));
    let matcher = PresentationMatcher::new();

    let passport = SimpleClaim::new("passport", ldp_vc(), json!({ "passport_number": "X1" }));
    let license = SimpleClaim::new("license", ldp_vc(), json!({ "license_number": "D1" }));

    let outcome = matcher.match_claims(&definition, &[passport.clone()]);
    assert!(outcome.is_matched());
    assert!(outcome.candidates(&id("drivers_license")).is_none());

    let outcome = matcher.match_claims(&definition, &[passport, license]);
    assert!(!outcome.is_matched());

    let outcome = matcher.match_claims(&definition, &[] as &[SimpleClaim]);
    assert!(!outcome.is_matched());
}

#[test]
fn multi_group_requirements() {
    let definition = definition(json!({
        "id": "pd",
        "submission_requirements": [
            { "rule": "all", "from": "B" },
            {
                "rule": "pick",
                "count": 1,
                "from_nested": [
                    { "rule": "all", "from": "C" },
                    { "rule": "all", "from": "D" }
                ]
            }
        ],
        "input_descriptors": [
            { "id": "employment", "group": ["B"], "constraints": { "fields": [{ "path": ["$.employer"] }] } },
            { "id": "us_passport", "group": ["C"], "constraints": { "fields": [{ "path": ["$.us_passport"] }] } },
            { "id": "eu_license", "group": ["D"], "constraints": { "fields": [{ "path": ["$.eu_license"] }] } }
        ]
    }));
    let matcher = PresentationMatcher::new();

    let employment = SimpleClaim::new("employment", ldp_vc(), json!({ "employer": "ACME" }));
    let passport = SimpleClaim::new("passport", ldp_vc(), json!({ "us_passport": "X1" }));

    let outcome = matcher.match_claims(&definition, &[employment.clone(), passport]);
    let Match::Matched { matches } = outcome else {
        panic!("expected a match");
    };
    assert_eq!(
        matches.keys().map(|id| id.as_str()).collect::<Vec<_>>(),
        ["employment", "us_passport"]
    );

    let outcome = matcher.match_claims(&definition, &[employment]);
    let Match::NotMatched { details } = outcome else {
        panic!("expected no match");
    };
    assert_eq!(
        details.keys().map(|id| id.as_str()).collect::<Vec<_>>(),
        ["us_passport", "eu_license"]
    );
}
