//! Common compositions of engine conditions and actions.

use crate::duration::Duration;
use crate::expr::{Expression, ExpressionArg};
use crate::keys;

use super::conditions::{
    and, gt, gte, has_response_key, lt, lte, response_has_keys_any,
    response_has_only_keys_other_than, timestamp_with_offset,
};
use super::participant::ParticipantState;

pub fn single_choice_any(item_key: &str, option_keys: &[&str]) -> Expression {
    response_has_keys_any(item_key, &keys::single_choice_path(), option_keys)
}

pub fn single_choice_none(item_key: &str, option_keys: &[&str]) -> Expression {
    response_has_only_keys_other_than(item_key, &keys::single_choice_path(), option_keys)
}

pub fn multiple_choice_any(item_key: &str, option_keys: &[&str]) -> Expression {
    response_has_keys_any(item_key, &keys::multiple_choice_path(), option_keys)
}

pub fn multiple_choice_none(item_key: &str, option_keys: &[&str]) -> Expression {
    response_has_only_keys_other_than(item_key, &keys::multiple_choice_path(), option_keys)
}

/// Every one of `option_keys` is selected.
pub fn multiple_choice_all(item_key: &str, option_keys: &[&str]) -> Expression {
    let slot = keys::multiple_choice_path();
    and(option_keys
        .iter()
        .map(|option| response_has_keys_any(item_key, &slot, &[*option])))
}

pub fn consent_accepted(item_key: &str) -> Expression {
    has_response_key(item_key, &keys::consent_path())
}

/// The survey is assigned and its validity window contains the current time.
pub fn survey_is_active(survey_key: &str) -> Expression {
    let state = ParticipantState::CURRENT;
    and([
        lte(
            state.get_survey_key_assigned_from(survey_key),
            timestamp_with_offset(
                Duration {
                    seconds: 1,
                    ..Duration::default()
                },
                None,
            ),
        ),
        gte(
            state.get_survey_key_assigned_until(survey_key),
            timestamp_with_offset(
                Duration {
                    seconds: -1,
                    ..Duration::default()
                },
                None,
            ),
        ),
    ])
}

/// `validFrom` of the assignment lies before `reference + delta`.
pub fn survey_valid_from_older_than(
    survey_key: &str,
    delta: Duration,
    reference: Option<ExpressionArg>,
) -> Expression {
    lt(
        ParticipantState::CURRENT.get_survey_key_assigned_from(survey_key),
        timestamp_with_offset(delta, reference),
    )
}

/// `validUntil` of the assignment lies before `reference + delta`.
pub fn survey_valid_until_sooner_than(
    survey_key: &str,
    delta: Duration,
    reference: Option<ExpressionArg>,
) -> Expression {
    gt(
        timestamp_with_offset(delta, reference),
        ParticipantState::CURRENT.get_survey_key_assigned_until(survey_key),
    )
}
