use serde::{Deserialize, Serialize};

use super::{
    credential_format::Format,
    error::ValidationError,
    filter::Filter,
    identifier::{Group, Id, InputDescriptorId, Name, Purpose},
    json_path::JsonPath,
};
use crate::utils::NonEmptyVec;

/// Input Descriptors are objects used to describe the information a
/// [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) requires of a
/// [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder).
///
/// All Input Descriptors MUST be satisfied, unless otherwise specified by
/// submission requirements.
///
/// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputDescriptor {
    id: InputDescriptorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purpose: Option<Purpose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<Format>,
    constraints: Constraints,
    #[serde(rename = "group", default, skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<Group>>,
}

impl InputDescriptor {
    /// Create a new instance of the input descriptor with the given id and constraints.
    ///
    /// The id MUST NOT conflict with the id of another Input Descriptor in the
    /// same Presentation Definition; this is checked when the definition is built.
    pub fn new(id: impl Into<InputDescriptorId>, constraints: Constraints) -> Self {
        Self {
            id: id.into(),
            name: None,
            purpose: None,
            format: None,
            constraints,
            groups: None,
        }
    }

    /// Return the id of the input descriptor.
    pub fn id(&self) -> &InputDescriptorId {
        &self.id
    }

    /// Return the constraints of the input descriptor.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Set the name of the input descriptor.
    pub fn set_name(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    /// Set the purpose for which the claim's data is being requested.
    pub fn set_purpose(mut self, purpose: impl Into<Purpose>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn purpose(&self) -> Option<&Purpose> {
        self.purpose.as_ref()
    }

    /// Set the format of the input descriptor.
    ///
    /// This format overrides the presentation definition format, and can be used to
    /// constrain submission of a single input to a subset of formats or algorithms.
    pub fn set_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    /// Add the input descriptor to a group.
    pub fn add_to_group(mut self, group: impl Into<Group>) -> Self {
        self.groups.get_or_insert_with(Vec::new).push(group.into());
        self
    }

    /// Return the groups this input descriptor is a member of.
    pub fn groups(&self) -> &[Group] {
        self.groups.as_deref().unwrap_or_default()
    }

    pub fn is_member_of(&self, group: &Group) -> bool {
        self.groups().contains(group)
    }
}

/// Constraints describe what a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder)
/// must satisfy to fulfill an Input Descriptor.
///
/// At least one of `fields` and `limit_disclosure` is present, and a field list is never empty.
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "ConstraintsJson", into = "ConstraintsJson")]
pub enum Constraints {
    /// A conformant consumer MAY submit more than the data described in the fields.
    Fields(NonEmptyVec<FieldConstraint>),
    LimitDisclosure(LimitDisclosure),
    FieldsAndDisclosure {
        fields: NonEmptyVec<FieldConstraint>,
        limit_disclosure: LimitDisclosure,
    },
}

impl Constraints {
    /// Creates constraints from a list of field constraints and/or a limit disclosure.
    ///
    /// Returns `None` if there are neither fields nor limit disclosure.
    pub fn of(
        fields: Option<Vec<FieldConstraint>>,
        limit_disclosure: Option<LimitDisclosure>,
    ) -> Option<Self> {
        let fields = fields.and_then(NonEmptyVec::maybe_new);
        match (fields, limit_disclosure) {
            (Some(fields), Some(limit_disclosure)) => Some(Self::FieldsAndDisclosure {
                fields,
                limit_disclosure,
            }),
            (Some(fields), None) => Some(Self::Fields(fields)),
            (None, Some(limit_disclosure)) => Some(Self::LimitDisclosure(limit_disclosure)),
            (None, None) => None,
        }
    }

    /// Returns the field constraints, possibly none.
    pub fn fields(&self) -> &[FieldConstraint] {
        match self {
            Self::Fields(fields) | Self::FieldsAndDisclosure { fields, .. } => &fields[..],
            Self::LimitDisclosure(_) => &[],
        }
    }

    pub fn limit_disclosure(&self) -> Option<LimitDisclosure> {
        match self {
            Self::LimitDisclosure(l) | Self::FieldsAndDisclosure { limit_disclosure: l, .. } => {
                Some(*l)
            }
            Self::Fields(_) => None,
        }
    }
}

impl From<NonEmptyVec<FieldConstraint>> for Constraints {
    fn from(fields: NonEmptyVec<FieldConstraint>) -> Self {
        Self::Fields(fields)
    }
}

impl From<FieldConstraint> for Constraints {
    fn from(field: FieldConstraint) -> Self {
        Self::Fields(NonEmptyVec::new(field))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ConstraintsJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldConstraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit_disclosure: Option<LimitDisclosure>,
}

impl TryFrom<ConstraintsJson> for Constraints {
    type Error = ValidationError;

    fn try_from(value: ConstraintsJson) -> Result<Self, Self::Error> {
        Self::of(value.fields, value.limit_disclosure).ok_or(ValidationError::EmptyConstraints)
    }
}

impl From<Constraints> for ConstraintsJson {
    fn from(value: Constraints) -> Self {
        let limit_disclosure = value.limit_disclosure();
        let fields = match value {
            Constraints::Fields(fields) | Constraints::FieldsAndDisclosure { fields, .. } => {
                Some(fields.into_inner())
            }
            Constraints::LimitDisclosure(_) => None,
        };
        Self {
            fields,
            limit_disclosure,
        }
    }
}

/// Tells the holder whether it must, or should, submit only the data described by the fields.
///
/// For more information: see [https://identity.foundation/presentation-exchange/spec/v2.0.0/#limited-disclosure-submissions](https://identity.foundation/presentation-exchange/spec/v2.0.0/#limited-disclosure-submissions)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LimitDisclosure {
    Required,
    Preferred,
}

/// A field constraint requires a value at one of its paths, optionally matching a filter.
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldConstraint {
    path: NonEmptyVec<JsonPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purpose: Option<Purpose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intent_to_retain: Option<bool>,
}

impl From<NonEmptyVec<JsonPath>> for FieldConstraint {
    fn from(path: NonEmptyVec<JsonPath>) -> Self {
        Self {
            path,
            id: None,
            name: None,
            purpose: None,
            filter: None,
            optional: false,
            intent_to_retain: None,
        }
    }
}

impl FieldConstraint {
    /// Create a new field constraint with a single path.
    ///
    /// Tip: Use the `From<NonEmptyVec<JsonPath>>` conversion if more than one path is known.
    pub fn new(path: JsonPath) -> Self {
        NonEmptyVec::new(path).into()
    }

    /// Add a new path to the field constraint. Paths are tried in the order they were added.
    pub fn add_path(mut self, path: JsonPath) -> Self {
        self.path.push(path);
        self
    }

    /// Return the candidate paths, in declaration order.
    pub fn paths(&self) -> &NonEmptyVec<JsonPath> {
        &self.path
    }

    pub fn set_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    pub fn set_name(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    pub fn set_purpose(mut self, purpose: impl Into<Purpose>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn purpose(&self) -> Option<&Purpose> {
        self.purpose.as_ref()
    }

    /// Set the JSON Schema the selected value must satisfy.
    pub fn set_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Mark the field as optional.
    ///
    /// Even when optional, a value located at one of the paths MUST validate
    /// against the filter, if any, to be reported as found.
    pub fn set_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Inverse alias for `!is_optional()`.
    pub fn is_required(&self) -> bool {
        !self.optional
    }

    /// Set the verifier's intent to retain the field value.
    pub fn set_retained(mut self, intent_to_retain: bool) -> Self {
        self.intent_to_retain = Some(intent_to_retain);
        self
    }

    pub fn intent_to_retain(&self) -> Option<bool> {
        self.intent_to_retain
    }
}
