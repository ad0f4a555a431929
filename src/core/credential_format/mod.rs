use core::fmt;
use std::{collections::HashSet, str::FromStr};

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use super::error::ValidationError;
use crate::utils::NonEmptySet;

const FORMAT_JWT: &str = "jwt";
const FORMAT_JWT_VC: &str = "jwt_vc";
const FORMAT_JWT_VP: &str = "jwt_vp";
const FORMAT_SD_JWT: &str = "sd_jwt";
const FORMAT_HB_JWT: &str = "hb_jwt";
const FORMAT_LDP: &str = "ldp";
const FORMAT_LDP_VC: &str = "ldp_vc";
const FORMAT_LDP_VP: &str = "ldp_vp";
const FORMAT_MSO_MDOC: &str = "mso_mdoc";

/// JWT based claim formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JwtType {
    Jwt,
    JwtVc,
    JwtVp,
    SdJwt,
    HbJwt,
}

/// Linked-Data Proof based claim formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LdpType {
    Ldp,
    LdpVc,
    LdpVp,
}

/// The claim format designation identifies the envelope of a claim.
///
/// Registry of claim format type: <https://identity.foundation/claim-format-registry/#registry>
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimFormat {
    /// JSON Web Tokens, expressing supported algorithms with an `alg` property.
    Jwt(JwtType),

    /// Linked-Data Proofs, expressing supported suites with a `proof_type` property.
    Ldp(LdpType),

    /// ISO/IEC 18013-5 mobile documents.
    MsoMdoc,
}

impl ClaimFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            FORMAT_JWT => Self::Jwt(JwtType::Jwt),
            FORMAT_JWT_VC => Self::Jwt(JwtType::JwtVc),
            FORMAT_JWT_VP => Self::Jwt(JwtType::JwtVp),
            FORMAT_SD_JWT => Self::Jwt(JwtType::SdJwt),
            FORMAT_HB_JWT => Self::Jwt(JwtType::HbJwt),
            FORMAT_LDP => Self::Ldp(LdpType::Ldp),
            FORMAT_LDP_VC => Self::Ldp(LdpType::LdpVc),
            FORMAT_LDP_VP => Self::Ldp(LdpType::LdpVp),
            FORMAT_MSO_MDOC => Self::MsoMdoc,
            _ => return None,
        };
        Some(format)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Jwt(JwtType::Jwt) => FORMAT_JWT,
            Self::Jwt(JwtType::JwtVc) => FORMAT_JWT_VC,
            Self::Jwt(JwtType::JwtVp) => FORMAT_JWT_VP,
            Self::Jwt(JwtType::SdJwt) => FORMAT_SD_JWT,
            Self::Jwt(JwtType::HbJwt) => FORMAT_HB_JWT,
            Self::Ldp(LdpType::Ldp) => FORMAT_LDP,
            Self::Ldp(LdpType::LdpVc) => FORMAT_LDP_VC,
            Self::Ldp(LdpType::LdpVp) => FORMAT_LDP_VP,
            Self::MsoMdoc => FORMAT_MSO_MDOC,
        }
    }
}

impl FromStr for ClaimFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::UnknownClaimFormat(s.to_owned()))
    }
}

impl fmt::Display for ClaimFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl Serialize for ClaimFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClaimFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// HMAC algorithms of the JSON Web Algorithms registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HmacAlgorithm {
    HS256,
    HS384,
    HS512,
}

/// Digital signature algorithms of the JSON Web Algorithms registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DigSigAlgorithm {
    RS256,
    RS384,
    RS512,
    ES256,
    ES256K,
    ES384,
    ES512,
    PS256,
    PS384,
    PS512,
    EdDSA,
}

/// A JWA algorithm, as found in the `alg` property of a JWT based format.
///
/// See: <https://www.rfc-editor.org/rfc/rfc7518#section-3.1>
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JwtAlgorithm {
    Hmac(HmacAlgorithm),
    DigSig(DigSigAlgorithm),
}

impl JwtAlgorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        use DigSigAlgorithm::*;
        use HmacAlgorithm::*;

        let alg = match name {
            "HS256" => Self::Hmac(HS256),
            "HS384" => Self::Hmac(HS384),
            "HS512" => Self::Hmac(HS512),
            "RS256" => Self::DigSig(RS256),
            "RS384" => Self::DigSig(RS384),
            "RS512" => Self::DigSig(RS512),
            "ES256" => Self::DigSig(ES256),
            "ES256K" => Self::DigSig(ES256K),
            "ES384" => Self::DigSig(ES384),
            "ES512" => Self::DigSig(ES512),
            "PS256" => Self::DigSig(PS256),
            "PS384" => Self::DigSig(PS384),
            "PS512" => Self::DigSig(PS512),
            "EdDSA" => Self::DigSig(EdDSA),
            _ => return None,
        };
        Some(alg)
    }

    pub fn name(&self) -> &'static str {
        use DigSigAlgorithm::*;
        use HmacAlgorithm::*;

        match self {
            Self::Hmac(HS256) => "HS256",
            Self::Hmac(HS384) => "HS384",
            Self::Hmac(HS512) => "HS512",
            Self::DigSig(RS256) => "RS256",
            Self::DigSig(RS384) => "RS384",
            Self::DigSig(RS512) => "RS512",
            Self::DigSig(ES256) => "ES256",
            Self::DigSig(ES256K) => "ES256K",
            Self::DigSig(ES384) => "ES384",
            Self::DigSig(ES512) => "ES512",
            Self::DigSig(PS256) => "PS256",
            Self::DigSig(PS384) => "PS384",
            Self::DigSig(PS512) => "PS512",
            Self::DigSig(EdDSA) => "EdDSA",
        }
    }
}

impl FromStr for JwtAlgorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::UnknownJwtAlgorithm(s.to_owned()))
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl Serialize for JwtAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JwtAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Linked Data cryptographic suites.
///
/// See: <https://w3c-ccg.github.io/ld-cryptosuite-registry/>
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LdpProof {
    Ed25519Signature2018,
    RsaSignature2018,
    RsaVerificationKey2018,
    EcdsaSecp256k1Signature2019,
    EcdsaSecp256k1VerificationKey2019,
    EcdsaSecp256k1RecoverySignature2020,
    EcdsaSecp256k1RecoveryMethod2020,
    JsonWebSignature2020,
    JwsVerificationKey2020,
    GpgSignature2020,
    GpgVerificationKey2020,
    JcsEd25519Signature2020,
    JcsEd25519Key2020,
    BbsBlsSignature2020,
    BbsBlsSignatureProof2020,
    Bls12381G1Key2020,
    Bls12381G2Key2020,
}

/// A claim format together with the algorithms (or proof suites) accepted for it.
///
/// The set of algorithms is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupportedClaimFormat {
    JwtBased {
        format: JwtType,
        algorithms: NonEmptySet<JwtAlgorithm>,
    },
    LdpBased {
        format: LdpType,
        proof_types: NonEmptySet<LdpProof>,
    },
    MsoMdoc {
        algorithms: NonEmptySet<JwtAlgorithm>,
    },
}

impl SupportedClaimFormat {
    /// Build a supported claim format, picking `algorithms` or `proof_types` as
    /// appropriate for `format`. The other argument is ignored.
    pub fn new(
        format: ClaimFormat,
        algorithms: impl IntoIterator<Item = JwtAlgorithm>,
        proof_types: impl IntoIterator<Item = LdpProof>,
    ) -> Result<Self, ValidationError> {
        let missing = || ValidationError::MissingAlgorithms(format);
        match format {
            ClaimFormat::Jwt(format) => Ok(Self::JwtBased {
                format,
                algorithms: NonEmptySet::maybe_new(algorithms).ok_or_else(missing)?,
            }),
            ClaimFormat::Ldp(format) => Ok(Self::LdpBased {
                format,
                proof_types: NonEmptySet::maybe_new(proof_types).ok_or_else(missing)?,
            }),
            ClaimFormat::MsoMdoc => Ok(Self::MsoMdoc {
                algorithms: NonEmptySet::maybe_new(algorithms).ok_or_else(missing)?,
            }),
        }
    }

    pub fn jwt(
        format: JwtType,
        algorithms: impl IntoIterator<Item = JwtAlgorithm>,
    ) -> Result<Self, ValidationError> {
        Self::new(ClaimFormat::Jwt(format), algorithms, [])
    }

    pub fn ldp(
        format: LdpType,
        proof_types: impl IntoIterator<Item = LdpProof>,
    ) -> Result<Self, ValidationError> {
        Self::new(ClaimFormat::Ldp(format), [], proof_types)
    }

    pub fn mso_mdoc(
        algorithms: impl IntoIterator<Item = JwtAlgorithm>,
    ) -> Result<Self, ValidationError> {
        Self::new(ClaimFormat::MsoMdoc, algorithms, [])
    }

    /// Returns the designated format of the claim.
    pub fn claim_format(&self) -> ClaimFormat {
        match self {
            Self::JwtBased { format, .. } => ClaimFormat::Jwt(*format),
            Self::LdpBased { format, .. } => ClaimFormat::Ldp(*format),
            Self::MsoMdoc { .. } => ClaimFormat::MsoMdoc,
        }
    }
}

/// Wire form of the value of a format entry, e.g. `{"alg": ["ES256"]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AlgorithmsOrProofTypes {
    #[serde(rename = "alg", default, skip_serializing_if = "Vec::is_empty")]
    algorithms: Vec<JwtAlgorithm>,
    #[serde(rename = "proof_type", default, skip_serializing_if = "Vec::is_empty")]
    proof_types: Vec<LdpProof>,
}

impl From<&SupportedClaimFormat> for AlgorithmsOrProofTypes {
    fn from(value: &SupportedClaimFormat) -> Self {
        match value {
            SupportedClaimFormat::JwtBased { algorithms, .. }
            | SupportedClaimFormat::MsoMdoc { algorithms } => Self {
                algorithms: algorithms.iter().copied().collect(),
                ..Default::default()
            },
            SupportedClaimFormat::LdpBased { proof_types, .. } => Self {
                proof_types: proof_types.iter().copied().collect(),
                ..Default::default()
            },
        }
    }
}

/// The claim formats a verifier can process, e.g.
///
/// ```json
/// { "jwt_vc": { "alg": ["ES256"] }, "ldp_vc": { "proof_type": ["Ed25519Signature2018"] } }
/// ```
///
/// Appears at presentation definition level and, as an override, on input descriptors.
///
/// See: <https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition>
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Format(Vec<SupportedClaimFormat>);

impl Format {
    /// Create a format from its entries, in declaration order.
    ///
    /// Each claim format may be declared only once.
    pub fn new(supported: Vec<SupportedClaimFormat>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for s in &supported {
            if !seen.insert(s.claim_format()) {
                return Err(ValidationError::DuplicateClaimFormat(s.claim_format()));
            }
        }
        Ok(Self(supported))
    }

    pub fn supported_claim_formats(&self) -> &[SupportedClaimFormat] {
        &self.0
    }

    /// Return the claim format designations declared by this format.
    pub fn claim_formats(&self) -> impl Iterator<Item = ClaimFormat> + '_ {
        self.0.iter().map(SupportedClaimFormat::claim_format)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether this format and `other` share at least one claim format designation.
    pub fn intersects(&self, other: &Format) -> bool {
        let ours: HashSet<ClaimFormat> = self.claim_formats().collect();
        other.claim_formats().any(|f| ours.contains(&f))
    }
}

impl From<SupportedClaimFormat> for Format {
    fn from(value: SupportedClaimFormat) -> Self {
        Self(vec![value])
    }
}

impl Serialize for Format {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for supported in &self.0 {
            map.serialize_entry(
                supported.claim_format().name(),
                &AlgorithmsOrProofTypes::from(supported),
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FormatVisitor;

        impl<'de> Visitor<'de> for FormatVisitor {
            type Value = Format;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of claim format designations")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Format, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut supported = Vec::new();
                while let Some((format, value)) =
                    access.next_entry::<ClaimFormat, AlgorithmsOrProofTypes>()?
                {
                    let s = SupportedClaimFormat::new(format, value.algorithms, value.proof_types)
                        .map_err(serde::de::Error::custom)?;
                    supported.push(s);
                }
                Format::new(supported).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(FormatVisitor)
    }
}
