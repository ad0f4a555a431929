use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::{
    credential_format::ClaimFormat,
    error::DecodeError,
    identifier::{Id, InputDescriptorId},
    json_path::JsonPath,
    object::TypedParameter,
};

/// Presentation Submissions are objects embedded within target
/// [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim) negotiation
/// formats that express how the inputs presented as proofs to a
/// [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) are
/// provided in accordance with the requirements specified in a [PresentationDefinition](super::presentation_definition::PresentationDefinition).
///
/// Embedded Presentation Submission objects MUST be located within target data format as
/// the value of a `presentation_submission` property. See [`PresentationSubmission::from_embedded`].
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationSubmission {
    id: Id,
    definition_id: Id,
    descriptor_map: Vec<DescriptorMap>,
}

impl TypedParameter for PresentationSubmission {
    const KEY: &'static str = "presentation_submission";
}

impl PresentationSubmission {
    /// Create a presentation submission with a random UUID v4 id.
    ///
    /// The presentation submission object MUST contain a `definition_id` property.
    /// The value of this property MUST be the id value of a valid presentation definition.
    ///
    /// The object MUST include a `descriptor_map` property. The value of this property MUST be an array of
    /// Input [DescriptorMap] Objects.
    pub fn new(definition_id: impl Into<Id>, descriptor_map: Vec<DescriptorMap>) -> Self {
        Self::with_id(Id::random(), definition_id, descriptor_map)
    }

    /// Create a presentation submission with an explicit id.
    pub fn with_id(
        id: impl Into<Id>,
        definition_id: impl Into<Id>,
        descriptor_map: Vec<DescriptorMap>,
    ) -> Self {
        Self {
            id: id.into(),
            definition_id: definition_id.into(),
            descriptor_map,
        }
    }

    /// Decode a presentation submission from an envelope.
    ///
    /// The known embed locations are probed in order; the first one holding
    /// a JSON object is decoded. When none does, the envelope itself is decoded.
    ///
    /// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#embed-locations](https://identity.foundation/presentation-exchange/spec/v2.0.0/#embed-locations)
    pub fn from_embedded(envelope: &Json) -> Result<Self, DecodeError> {
        let embedded = envelope.as_object().and_then(|object| {
            EmbedLocation::ALL.iter().find_map(|location| {
                let found = location.extract_from(object)?;
                tracing::debug!("presentation submission found in {location:?} location");
                Some(found)
            })
        });

        Ok(Self::deserialize(embedded.unwrap_or(envelope))?)
    }

    /// Return the id of the presentation submission.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Return the definition id of the presentation submission.
    pub fn definition_id(&self) -> &Id {
        &self.definition_id
    }

    /// Return the descriptor map of the presentation submission.
    pub fn descriptor_map(&self) -> &[DescriptorMap] {
        &self.descriptor_map
    }

    /// Return a mutable reference to the descriptor map of the presentation submission.
    pub fn descriptor_map_mut(&mut self) -> &mut Vec<DescriptorMap> {
        &mut self.descriptor_map
    }

    /// Returns the descriptor map as a mapping of input descriptor id to descriptor map entries.
    ///
    /// This mapping is helpful for checking if an input descriptor has an associated descriptor map.
    pub fn descriptor_map_by_id(&self) -> HashMap<&InputDescriptorId, Vec<&DescriptorMap>> {
        let mut by_id: HashMap<&InputDescriptorId, Vec<&DescriptorMap>> = HashMap::new();
        for descriptor_map in &self.descriptor_map {
            by_id
                .entry(&descriptor_map.id)
                .or_default()
                .push(descriptor_map);
        }
        by_id
    }
}

impl TryFrom<Json> for PresentationSubmission {
    type Error = DecodeError;

    fn try_from(raw: Json) -> Result<Self, Self::Error> {
        serde_json::from_value(raw).map_err(Into::into)
    }
}

/// Places where a presentation submission may be embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EmbedLocation {
    /// Top-level `presentation_submission`, as in OpenID responses and verifiable presentations.
    TopLevel,
    /// `vp.presentation_submission`, as in JWT encoded presentations.
    Jwt,
    /// `data.presentation_submission`, as in CHAPI.
    Chapi,
    /// `presentations~attach[0].data.json.presentation_submission`, as in DIDComm.
    DidComm,
}

impl EmbedLocation {
    const ALL: [Self; 4] = [Self::TopLevel, Self::Jwt, Self::Chapi, Self::DidComm];

    fn extract_from<'a>(&self, envelope: &'a Map<String, Json>) -> Option<&'a Json> {
        let root = match self {
            Self::TopLevel => envelope,
            Self::Jwt => envelope.get("vp")?.as_object()?,
            Self::Chapi => envelope.get("data")?.as_object()?,
            Self::DidComm => {
                let attachment = match envelope.get("presentations~attach")? {
                    Json::Array(attachments) => attachments.first()?,
                    attachment => attachment,
                };
                attachment
                    .get("data")?
                    .get("json")?
                    .as_object()?
            }
        };

        root.get(PresentationSubmission::KEY)
            .filter(|submission| submission.is_object())
    }
}

/// Descriptor Maps are objects used to describe the information a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder) provides to a [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier).
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescriptorMap {
    pub id: InputDescriptorId,
    pub format: ClaimFormat,
    pub path: JsonPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_nested: Option<Box<DescriptorMap>>,
}

impl DescriptorMap {
    /// The descriptor map MUST include an `id` property. The value of this property MUST be a string that matches the `id` property of an input descriptor in the presentation definition that the [PresentationSubmission] is related to.
    ///
    /// The descriptor map object MUST include a `format` property, denoting the data format of the [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim).
    ///
    /// The descriptor map object MUST include a `path` property. The path property indicates the [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim) submitted in relation to the identified input descriptor, when executed against the top-level of the object the [PresentationSubmission] is embedded within.
    pub fn new(id: impl Into<InputDescriptorId>, format: ClaimFormat, path: JsonPath) -> Self {
        Self {
            id: id.into(),
            format,
            path,
            path_nested: None,
        }
    }

    /// Set the nested path of the descriptor map.
    ///
    /// The format of a path_nested object mirrors that of a [DescriptorMap] property. The nesting may be any number of levels deep.
    /// The `id` property MUST be the same for each level of nesting.
    ///
    /// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#processing-of-submission-entries](https://identity.foundation/presentation-exchange/spec/v2.0.0/#processing-of-submission-entries)
    pub fn set_path_nested(mut self, mut path_nested: DescriptorMap) -> Self {
        // Ensure the nested path has the same id as the parent.
        path_nested.id.clone_from(&self.id);

        self.path_nested = Some(Box::new(path_nested));

        self
    }
}
