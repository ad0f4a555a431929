use indexmap::IndexSet;

use super::{CandidatesByDescriptor, Match, NotMatchedByDescriptor};
use crate::core::{
    identifier::{Group, InputDescriptorId},
    presentation_definition::{From, PresentationDefinition, Rule, SubmissionRequirement},
};

/// Folds per input descriptor outcomes into the outcome of a presentation definition.
///
/// Without submission requirements every input descriptor must have a
/// candidate claim. Otherwise every top-level submission requirement must be
/// satisfied:
/// - a group is satisfied under `all` when each of its members has a candidate
///   claim, which holds trivially for a group without members;
/// - under `pick`, the number of satisfied members (or of satisfied nested
///   requirements) must honor every given bound.
///
/// Input descriptors outside of any group do not take part in the outcome when
/// submission requirements are present.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubmissionRequirementResolver;

impl SubmissionRequirementResolver {
    pub fn resolve<'a>(
        definition: &'a PresentationDefinition,
        candidates: CandidatesByDescriptor<'a>,
        not_matched: NotMatchedByDescriptor<'a>,
    ) -> Match<'a> {
        match definition.submission_requirements() {
            None => all_descriptors_required(definition, candidates, not_matched),
            Some(requirements) => {
                let resolution = Resolution {
                    definition,
                    candidates: &candidates,
                };

                let mut contributing = IndexSet::new();
                let mut satisfied = true;
                for requirement in requirements.iter() {
                    let outcome = resolution.resolve(requirement);
                    if !outcome.satisfied {
                        tracing::debug!(
                            "submission requirement {} is not satisfied",
                            requirement
                                .name()
                                .map_or("(unnamed)", |name| name.as_str())
                        );
                    }
                    satisfied &= outcome.satisfied;
                    contributing.extend(outcome.descriptors);
                }

                if satisfied {
                    let mut matches = candidates;
                    matches.retain(|id, _| contributing.contains(id));
                    Match::Matched { matches }
                } else {
                    let details = definition
                        .input_descriptors()
                        .iter()
                        .filter(|d| !d.groups().is_empty() && !candidates.contains_key(d.id()))
                        .map(|d| {
                            let id = d.id();
                            (id, not_matched.get(id).cloned().unwrap_or_default())
                        })
                        .collect();
                    Match::NotMatched { details }
                }
            }
        }
    }
}

fn all_descriptors_required<'a>(
    definition: &'a PresentationDefinition,
    candidates: CandidatesByDescriptor<'a>,
    mut not_matched: NotMatchedByDescriptor<'a>,
) -> Match<'a> {
    let missing: Vec<_> = definition
        .input_descriptors()
        .iter()
        .map(|d| d.id())
        .filter(|id| !candidates.contains_key(id))
        .collect();

    if missing.is_empty() {
        return Match::Matched {
            matches: candidates,
        };
    }

    let details = missing
        .into_iter()
        .map(|id| (id, not_matched.swap_remove(id).unwrap_or_default()))
        .collect();
    Match::NotMatched { details }
}

/// Outcome of a single submission requirement.
struct Outcome<'a> {
    satisfied: bool,
    /// Input descriptors backing the outcome, in definition order.
    descriptors: Vec<&'a InputDescriptorId>,
}

struct Resolution<'r, 'a> {
    definition: &'a PresentationDefinition,
    candidates: &'r CandidatesByDescriptor<'a>,
}

impl<'a> Resolution<'_, 'a> {
    fn is_candidate(&self, id: &InputDescriptorId) -> bool {
        self.candidates.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Recursion depth is bounded when the definition is constructed.
    fn resolve(&self, requirement: &'a SubmissionRequirement) -> Outcome<'a> {
        match requirement.from() {
            From::FromGroup(group) => self.resolve_group(requirement.rule(), group),
            From::FromNested(nested) => {
                let outcomes: Vec<_> = nested.iter().map(|r| self.resolve(r)).collect();
                match requirement.rule() {
                    Rule::All => Outcome {
                        satisfied: outcomes.iter().all(|o| o.satisfied),
                        descriptors: outcomes.into_iter().flat_map(|o| o.descriptors).collect(),
                    },
                    Rule::Pick(pick) => {
                        let picked: Vec<_> = outcomes.into_iter().filter(|o| o.satisfied).collect();
                        Outcome {
                            satisfied: pick.accepts(picked.len()),
                            descriptors: picked.into_iter().flat_map(|o| o.descriptors).collect(),
                        }
                    }
                }
            }
        }
    }

    fn resolve_group(&self, rule: &Rule, group: &'a Group) -> Outcome<'a> {
        let members: Vec<_> = self
            .definition
            .group_members(group)
            .map(|d| d.id())
            .collect();

        match rule {
            Rule::All => Outcome {
                satisfied: members.iter().all(|id| self.is_candidate(id)),
                descriptors: members,
            },
            Rule::Pick(pick) => {
                let picked: Vec<_> = members
                    .into_iter()
                    .filter(|id| self.is_candidate(id))
                    .collect();
                Outcome {
                    satisfied: pick.accepts(picked.len()),
                    descriptors: picked,
                }
            }
        }
    }
}
