use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{
    credential_format::Format,
    error::{DecodeError, ValidationError},
    identifier::{Group, Id, InputDescriptorId, Name, Purpose},
    input_descriptor::InputDescriptor,
    object::{TypedParameter, UntypedObject},
};
use crate::{config::Config, utils::NonEmptyVec};

/// A presentation definition is a JSON object that describes the information a [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) requires of a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder).
///
/// Presentation Definitions are composed of inputs, which describe the forms and details of the
/// proofs they require, and optional sets of selection rules, to allow [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder)s flexibility
/// in cases where different types of proofs may satisfy an input requirement.
///
/// A `PresentationDefinition` is always valid:
/// - input descriptor ids are pairwise distinct;
/// - every group an input descriptor belongs to is referenced by the submission requirements;
/// - the submission requirement tree is no deeper than [`Config::max_requirement_depth`].
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "UncheckedPresentationDefinition")]
pub struct PresentationDefinition {
    id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<Purpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Format>,
    input_descriptors: NonEmptyVec<InputDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submission_requirements: Option<NonEmptyVec<SubmissionRequirement>>,
}

impl PresentationDefinition {
    /// Start building a presentation definition with its id and first input descriptor.
    pub fn builder(
        id: impl Into<Id>,
        input_descriptor: InputDescriptor,
    ) -> PresentationDefinitionBuilder {
        PresentationDefinitionBuilder {
            unchecked: UncheckedPresentationDefinition {
                id: id.into(),
                name: None,
                purpose: None,
                format: None,
                input_descriptors: NonEmptyVec::new(input_descriptor),
                submission_requirements: None,
            },
        }
    }

    /// Decode a presentation definition, either bare or wrapped under a
    /// `presentation_definition` key, with the default [`Config`].
    pub fn from_embedded(value: Json) -> Result<Self, DecodeError> {
        Self::from_embedded_with(value, &Config::default())
    }

    /// Decode a presentation definition, either bare or wrapped under a
    /// `presentation_definition` key.
    pub fn from_embedded_with(value: Json, config: &Config) -> Result<Self, DecodeError> {
        match value {
            Json::Object(map) => {
                let mut object = UntypedObject(map);
                match object.take_raw::<Self>() {
                    Some(inner) => Self::from_json_with(inner, config),
                    None => Self::from_json_with(object.into(), config),
                }
            }
            other => Self::from_json_with(other, config),
        }
    }

    /// Decode a bare presentation definition, checking it against `config`.
    pub fn from_json_with(value: Json, config: &Config) -> Result<Self, DecodeError> {
        let unchecked: UncheckedPresentationDefinition = serde_json::from_value(value)?;
        Ok(unchecked.validate(config)?)
    }

    /// Return the id of the presentation definition.
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    pub fn purpose(&self) -> Option<&Purpose> {
        self.purpose.as_ref()
    }

    /// Return the claim formats the verifier can process, unless overridden by an input descriptor.
    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    /// Return the input descriptors of the presentation definition.
    pub fn input_descriptors(&self) -> &NonEmptyVec<InputDescriptor> {
        &self.input_descriptors
    }

    /// Return the input descriptor with the given id, if any.
    pub fn input_descriptor(&self, id: &InputDescriptorId) -> Option<&InputDescriptor> {
        self.input_descriptors.iter().find(|d| d.id() == id)
    }

    /// Return the submission requirements, if any.
    pub fn submission_requirements(&self) -> Option<&NonEmptyVec<SubmissionRequirement>> {
        self.submission_requirements.as_ref()
    }

    /// Return the input descriptors that are members of `group`, in declaration order.
    pub fn group_members<'s: 'g, 'g>(
        &'s self,
        group: &'g Group,
    ) -> impl Iterator<Item = &'s InputDescriptor> + 'g {
        self.input_descriptors
            .iter()
            .filter(move |d| d.is_member_of(group))
    }
}

impl TypedParameter for PresentationDefinition {
    const KEY: &'static str = "presentation_definition";
}

impl TryFrom<Json> for PresentationDefinition {
    type Error = DecodeError;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Self::from_json_with(value, &Config::default())
    }
}

/// Builds a [`PresentationDefinition`], checking its invariants on [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct PresentationDefinitionBuilder {
    unchecked: UncheckedPresentationDefinition,
}

impl PresentationDefinitionBuilder {
    pub fn with_name(mut self, name: impl Into<Name>) -> Self {
        self.unchecked.name = Some(name.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<Purpose>) -> Self {
        self.unchecked.purpose = Some(purpose.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.unchecked.format = Some(format);
        self
    }

    pub fn with_input_descriptor(mut self, input_descriptor: InputDescriptor) -> Self {
        self.unchecked.input_descriptors.push(input_descriptor);
        self
    }

    pub fn with_submission_requirement(mut self, requirement: SubmissionRequirement) -> Self {
        self.unchecked
            .submission_requirements
            .get_or_insert_with(Vec::new)
            .push(requirement);
        self
    }

    pub fn build(self) -> Result<PresentationDefinition, ValidationError> {
        self.build_with(&Config::default())
    }

    pub fn build_with(self, config: &Config) -> Result<PresentationDefinition, ValidationError> {
        self.unchecked.validate(config)
    }
}

/// Wire form of a presentation definition, before its invariants are checked.
#[derive(Clone, Debug, Deserialize)]
struct UncheckedPresentationDefinition {
    id: Id,
    #[serde(default)]
    name: Option<Name>,
    #[serde(default)]
    purpose: Option<Purpose>,
    #[serde(default)]
    format: Option<Format>,
    input_descriptors: NonEmptyVec<InputDescriptor>,
    #[serde(default)]
    submission_requirements: Option<Vec<SubmissionRequirement>>,
}

impl UncheckedPresentationDefinition {
    fn validate(self, config: &Config) -> Result<PresentationDefinition, ValidationError> {
        let mut ids = HashSet::new();
        for descriptor in self.input_descriptors.iter() {
            if !ids.insert(descriptor.id()) {
                return Err(ValidationError::DuplicateInputDescriptorId(
                    descriptor.id().clone(),
                ));
            }
        }

        let submission_requirements = self
            .submission_requirements
            .and_then(NonEmptyVec::maybe_new);

        let mut all_groups = BTreeSet::new();
        for requirement in submission_requirements.iter().flat_map(|r| r.iter()) {
            if requirement.depth() > config.max_requirement_depth {
                return Err(ValidationError::RequirementTooDeep {
                    max: config.max_requirement_depth,
                });
            }
            all_groups.extend(requirement.all_groups());
        }

        for descriptor in self.input_descriptors.iter() {
            if let Some(group) = descriptor.groups().iter().find(|g| !all_groups.contains(*g)) {
                return Err(ValidationError::UnreferencedGroup {
                    descriptor: descriptor.id().clone(),
                    group: group.clone(),
                });
            }
        }

        Ok(PresentationDefinition {
            id: self.id,
            name: self.name,
            purpose: self.purpose,
            format: self.format,
            input_descriptors: self.input_descriptors,
            submission_requirements,
        })
    }
}

impl TryFrom<UncheckedPresentationDefinition> for PresentationDefinition {
    type Error = ValidationError;

    fn try_from(value: UncheckedPresentationDefinition) -> Result<Self, Self::Error> {
        value.validate(&Config::default())
    }
}

/// The selection rule of a submission requirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Every input drawn from the source must be submitted.
    All,
    /// A number of inputs drawn from the source must be submitted.
    Pick(Pick),
}

/// Bounds of a `pick` rule.
///
/// `count` is greater than zero when present, and `min <= max` when both are present.
/// A missing bound is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pick {
    count: Option<u64>,
    min: Option<u64>,
    max: Option<u64>,
}

impl Pick {
    pub fn new(count: Option<i64>, min: Option<i64>, max: Option<i64>) -> Result<Self, ValidationError> {
        if let Some(count) = count.filter(|&c| c <= 0) {
            return Err(ValidationError::NonPositivePickCount(count));
        }
        if let Some(min) = min.filter(|&m| m < 0) {
            return Err(ValidationError::NegativePickMin(min));
        }
        if let Some(max) = max.filter(|&m| m < 0) {
            return Err(ValidationError::NegativePickMax(max));
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ValidationError::PickMinGreaterThanMax { min, max });
            }
        }

        // Bounds are non-negative at this point.
        Ok(Self {
            count: count.map(|c| c as u64),
            min: min.map(|m| m as u64),
            max: max.map(|m| m as u64),
        })
    }

    /// Pick exactly `count` inputs.
    pub fn count(count: u64) -> Result<Self, ValidationError> {
        Self::new(Some(bound(count)?), None, None)
    }

    /// Pick between `min` and `max` inputs, inclusive.
    pub fn range(min: Option<u64>, max: Option<u64>) -> Result<Self, ValidationError> {
        Self::new(None, min.map(bound).transpose()?, max.map(bound).transpose()?)
    }

    pub fn get_count(&self) -> Option<u64> {
        self.count
    }

    pub fn get_min(&self) -> Option<u64> {
        self.min
    }

    pub fn get_max(&self) -> Option<u64> {
        self.max
    }

    /// Returns whether selecting `selected` inputs honors every bound.
    pub fn accepts(&self, selected: usize) -> bool {
        let selected = selected as u64;
        self.count.map_or(true, |c| selected == c)
            && self.min.map_or(true, |m| selected >= m)
            && self.max.map_or(true, |m| selected <= m)
    }
}

fn bound(value: u64) -> Result<i64, ValidationError> {
    i64::try_from(value).map_err(|_| ValidationError::PickBoundTooLarge(value))
}

/// Where a submission requirement draws its inputs from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum From {
    /// The input descriptors that are members of a group.
    FromGroup(Group),
    /// The outcome of nested submission requirements.
    FromNested(NonEmptyVec<SubmissionRequirement>),
}

/// Submission requirements express OR/threshold logic over input descriptors.
///
/// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#submission-requirements](https://identity.foundation/presentation-exchange/spec/v2.0.0/#submission-requirements)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "SubmissionRequirementJson",
    into = "SubmissionRequirementJson"
)]
pub struct SubmissionRequirement {
    rule: Rule,
    from: From,
    name: Option<Name>,
    purpose: Option<Purpose>,
}

impl SubmissionRequirement {
    pub fn new(rule: Rule, from: From) -> Self {
        Self {
            rule,
            from,
            name: None,
            purpose: None,
        }
    }

    pub fn set_name(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_purpose(mut self, purpose: impl Into<Purpose>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn from(&self) -> &From {
        &self.from
    }

    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    pub fn purpose(&self) -> Option<&Purpose> {
        self.purpose.as_ref()
    }

    /// Collect every group referenced, directly or through nested requirements.
    pub fn all_groups(&self) -> BTreeSet<Group> {
        let mut groups = BTreeSet::new();
        self.collect_groups(&mut groups);
        groups
    }

    fn collect_groups(&self, groups: &mut BTreeSet<Group>) {
        match &self.from {
            From::FromGroup(group) => {
                groups.insert(group.clone());
            }
            From::FromNested(nested) => nested.iter().for_each(|r| r.collect_groups(groups)),
        }
    }

    /// Nesting depth of the requirement tree; a requirement drawing from a group has depth 1.
    pub fn depth(&self) -> usize {
        match &self.from {
            From::FromGroup(_) => 1,
            From::FromNested(nested) => 1 + nested.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RuleJson {
    All,
    Pick,
}

/// Wire form of a submission requirement: `rule`, pick bounds, and `from` XOR `from_nested`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct SubmissionRequirementJson {
    rule: RuleJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from_nested: Option<NonEmptyVec<SubmissionRequirement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purpose: Option<Purpose>,
}

impl TryFrom<SubmissionRequirementJson> for SubmissionRequirement {
    type Error = ValidationError;

    fn try_from(value: SubmissionRequirementJson) -> Result<Self, Self::Error> {
        let from = match (value.from, value.from_nested) {
            (Some(group), None) => From::FromGroup(group),
            (None, Some(nested)) => From::FromNested(nested),
            _ => return Err(ValidationError::AmbiguousFrom),
        };

        let rule = match value.rule {
            RuleJson::All => Rule::All,
            RuleJson::Pick => Rule::Pick(Pick::new(value.count, value.min, value.max)?),
        };

        Ok(Self {
            rule,
            from,
            name: value.name,
            purpose: value.purpose,
        })
    }
}

impl std::convert::From<SubmissionRequirement> for SubmissionRequirementJson {
    fn from(value: SubmissionRequirement) -> Self {
        let (rule, pick) = match value.rule {
            Rule::All => (RuleJson::All, Pick::default()),
            Rule::Pick(pick) => (RuleJson::Pick, pick),
        };
        let (from, from_nested) = match value.from {
            From::FromGroup(group) => (Some(group), None),
            From::FromNested(nested) => (None, Some(nested)),
        };

        Self {
            rule,
            count: pick.count.map(|c| c as i64),
            min: pick.min.map(|m| m as i64),
            max: pick.max.map(|m| m as i64),
            from,
            from_nested,
            name: value.name,
            purpose: value.purpose,
        }
    }
}
