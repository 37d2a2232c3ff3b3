//! Read-only checks evaluated by the study engine: events, responses, payloads, comparisons.

use crate::duration::Duration;
use crate::expr::{Expression, ExpressionArg, ReturnType, arg, build_expression, opt_arg};
use crate::rules::EventKind;

/// How `checkConditionForOldResponses` aggregates the per-response results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OldResponsesCheck {
    All,
    Any,
    /// At least this many responses must match.
    AtLeast(u32),
}

impl From<OldResponsesCheck> for ExpressionArg {
    fn from(value: OldResponsesCheck) -> Self {
        match value {
            OldResponsesCheck::All => ExpressionArg::str("all"),
            OldResponsesCheck::Any => ExpressionArg::str("any"),
            OldResponsesCheck::AtLeast(count) => ExpressionArg::num(count),
        }
    }
}

/// Filters for [`check_condition_for_old_responses`]; unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OldResponsesQuery {
    pub check: Option<OldResponsesCheck>,
    pub survey_key: Option<String>,
    pub since: Option<ExpressionArg>,
    pub until: Option<ExpressionArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }
}

impl From<Month> for ExpressionArg {
    fn from(value: Month) -> Self {
        ExpressionArg::str(value.as_str())
    }
}

fn keyed(name: &str, return_type: Option<ReturnType>, keys: &[&str]) -> Expression {
    build_expression(name, return_type, keys.iter().map(|key| arg(*key)))
}

fn with_options(name: &str, item_key: &str, slot_key: &str, options: &[&str]) -> Expression {
    let args = [arg(item_key), arg(slot_key)]
        .into_iter()
        .chain(options.iter().map(|option| arg(*option)));
    build_expression(name, None, args)
}

pub fn check_event_type(kind: EventKind) -> Expression {
    keyed("checkEventType", None, &[kind.as_str()])
}

pub fn check_event_key(key: &str) -> Expression {
    keyed("checkEventKey", None, &[key])
}

pub fn check_survey_response_key(survey_key: &str) -> Expression {
    keyed("checkSurveyResponseKey", None, &[survey_key])
}

/// True when any of `option_keys` is selected in the response slot `slot_key` of `item_key`.
pub fn response_has_keys_any(item_key: &str, slot_key: &str, option_keys: &[&str]) -> Expression {
    with_options("responseHasKeysAny", item_key, slot_key, option_keys)
}

/// True when something is selected, but none of `option_keys`.
pub fn response_has_only_keys_other_than(
    item_key: &str,
    slot_key: &str,
    option_keys: &[&str],
) -> Expression {
    with_options("responseHasOnlyKeysOtherThan", item_key, slot_key, option_keys)
}

pub fn has_response_key(item_key: &str, response_key: &str) -> Expression {
    keyed("hasResponseKey", None, &[item_key, response_key])
}

pub fn has_response_key_with_value(item_key: &str, response_key: &str, value: &str) -> Expression {
    keyed("hasResponseKeyWithValue", None, &[item_key, response_key, value])
}

pub fn get_response_value_as_num(item_key: &str, response_key: &str) -> Expression {
    keyed(
        "getResponseValueAsNum",
        Some(ReturnType::Float),
        &[item_key, response_key],
    )
}

pub fn get_response_value_as_str(item_key: &str, response_key: &str) -> Expression {
    keyed(
        "getResponseValueAsStr",
        Some(ReturnType::String),
        &[item_key, response_key],
    )
}

pub fn get_selected_keys(item_key: &str, response_key: &str) -> Expression {
    keyed(
        "getSelectedKeys",
        Some(ReturnType::String),
        &[item_key, response_key],
    )
}

pub fn count_response_items(item_key: &str, response_key: &str) -> Expression {
    keyed("countResponseItems", None, &[item_key, response_key])
}

pub fn is_study_code_present(
    list_key: impl Into<ExpressionArg>,
    code: impl Into<ExpressionArg>,
) -> Expression {
    build_expression("isStudyCodePresent", None, [arg(list_key), arg(code)])
}

/// Evaluates `condition` on each of the participant's earlier responses.
pub fn check_condition_for_old_responses(
    condition: Expression,
    query: OldResponsesQuery,
) -> Expression {
    build_expression(
        "checkConditionForOldResponses",
        None,
        [
            arg(condition),
            opt_arg(query.check),
            opt_arg(query.survey_key),
            query.since,
            query.until,
        ],
    )
}

pub fn has_event_payload() -> Expression {
    Expression::named("hasEventPayload")
}

pub fn has_event_payload_key(key: &str) -> Expression {
    keyed("hasEventPayloadKey", None, &[key])
}

pub fn has_event_payload_key_with_value(key: &str, value: &str) -> Expression {
    keyed("hasEventPayloadKeyWithValue", None, &[key, value])
}

pub fn get_event_payload_value_as_str(key: &str) -> Expression {
    keyed("getEventPayloadValueAsStr", Some(ReturnType::String), &[key])
}

pub fn get_event_payload_value_as_num(key: &str) -> Expression {
    keyed("getEventPayloadValueAsNum", Some(ReturnType::Float), &[key])
}

pub fn has_linking_code(for_key: impl Into<ExpressionArg>) -> Expression {
    build_expression("hasLinkingCode", None, [arg(for_key)])
}

pub fn get_linking_code(for_key: impl Into<ExpressionArg>) -> Expression {
    build_expression("getLinkingCodeValue", None, [arg(for_key)])
}

fn compare(name: &str, left: ExpressionArg, right: ExpressionArg) -> Expression {
    build_expression(name, None, [Some(left), Some(right)])
}

pub fn eq(left: impl Into<ExpressionArg>, right: impl Into<ExpressionArg>) -> Expression {
    compare("eq", left.into(), right.into())
}

pub fn lt(left: impl Into<ExpressionArg>, right: impl Into<ExpressionArg>) -> Expression {
    compare("lt", left.into(), right.into())
}

pub fn lte(left: impl Into<ExpressionArg>, right: impl Into<ExpressionArg>) -> Expression {
    compare("lte", left.into(), right.into())
}

pub fn gt(left: impl Into<ExpressionArg>, right: impl Into<ExpressionArg>) -> Expression {
    compare("gt", left.into(), right.into())
}

pub fn gte(left: impl Into<ExpressionArg>, right: impl Into<ExpressionArg>) -> Expression {
    compare("gte", left.into(), right.into())
}

pub fn or(operands: impl IntoIterator<Item = Expression>) -> Expression {
    build_expression("or", None, operands.into_iter().map(arg))
}

pub fn and(operands: impl IntoIterator<Item = Expression>) -> Expression {
    build_expression("and", None, operands.into_iter().map(arg))
}

pub fn not(operand: Expression) -> Expression {
    build_expression("not", None, [arg(operand)])
}

pub fn sum(values: impl IntoIterator<Item = ExpressionArg>) -> Expression {
    build_expression("sum", Some(ReturnType::Float), values.into_iter().map(Some))
}

pub fn neg(value: impl Into<ExpressionArg>) -> Expression {
    build_expression("neg", Some(ReturnType::Float), [arg(value)])
}

/// Timestamp `reference + delta`; the runtime uses the current time when `reference` is unset.
pub fn timestamp_with_offset(delta: Duration, reference: Option<ExpressionArg>) -> Expression {
    build_expression(
        "timestampWithOffset",
        None,
        [arg(delta.to_seconds()), reference],
    )
}

pub fn get_iso_week_for_ts(ts: impl Into<ExpressionArg>) -> Expression {
    build_expression("getISOWeekForTs", None, [arg(ts)])
}

pub fn get_ts_for_next_start_of_month(
    month: impl Into<ExpressionArg>,
    reference: Option<ExpressionArg>,
) -> Expression {
    build_expression("getTsForNextStartOfMonth", None, [arg(month), reference])
}

pub fn get_ts_for_next_iso_week(
    iso_week: impl Into<ExpressionArg>,
    reference: Option<ExpressionArg>,
) -> Expression {
    build_expression("getTsForNextISOWeek", None, [arg(iso_week), reference])
}

pub fn parse_value_as_num(value: impl Into<ExpressionArg>) -> Expression {
    build_expression("parseValueAsNum", Some(ReturnType::Float), [arg(value)])
}

pub fn generate_random_number(min: i64, max: i64) -> Expression {
    build_expression("generateRandomNumber", None, [arg(min), arg(max)])
}

/// Value computed by an external service; a string unless `expect_float` is set.
pub fn external_event_eval(
    service_name: &str,
    route: Option<&str>,
    expect_float: bool,
) -> Expression {
    build_expression(
        "externalEventEval",
        expect_float.then_some(ReturnType::Float),
        [arg(service_name), opt_arg(route)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn option_lists_follow_item_and_slot() {
        let expr = response_has_keys_any("s.q1", "rg.scg", &["a", "b"]);
        let args: Vec<_> = expr.data.iter().filter_map(ExpressionArg::as_str).collect();
        assert_eq!(args, vec!["s.q1", "rg.scg", "a", "b"]);
    }

    #[test]
    fn typed_getters_carry_return_types() {
        assert_eq!(
            get_response_value_as_num("s.q", "rg.num").return_type,
            Some(ReturnType::Float)
        );
        assert_eq!(
            get_selected_keys("s.q", "rg.mcg").return_type,
            Some(ReturnType::String)
        );
        assert_eq!(external_event_eval("svc", None, false).return_type, None);
        assert_eq!(
            external_event_eval("svc", Some("/score"), true).return_type,
            Some(ReturnType::Float)
        );
    }

    #[test]
    fn old_responses_skip_unset_filters() {
        let expr = check_condition_for_old_responses(
            Expression::named("isDefined"),
            OldResponsesQuery {
                check: Some(OldResponsesCheck::AtLeast(2)),
                since: Some(ExpressionArg::num(100)),
                ..Default::default()
            },
        );
        assert_eq!(
            serde_json::to_value(&expr).expect("serialize"),
            json!({
                "name": "checkConditionForOldResponses",
                "data": [
                    {"dtype": "exp", "exp": {"name": "isDefined"}},
                    {"dtype": "num", "num": 2},
                    {"dtype": "num", "num": 100}
                ]
            })
        );
    }

    #[test]
    fn offsets_are_seconds() {
        let expr = timestamp_with_offset(Duration::days(-1), None);
        assert_eq!(expr.data, vec![ExpressionArg::num(-86_400)]);
    }

    #[test]
    fn comparisons_mix_argument_kinds() {
        let expr = gt(get_event_payload_value_as_num("score"), 3);
        assert_eq!(expr.data.len(), 2);
        assert!(expr.data[0].as_exp().is_some());
        assert_eq!(expr.data[1].as_num(), Some(3.0));
        let months = get_ts_for_next_start_of_month(Month::March, None);
        assert_eq!(months.data[0].as_str(), Some("March"));
    }
}
