//! Survey prefill rules and context rules for previous responses.

use crate::duration::Duration;
use crate::expr::{Expression, ExpressionArg, arg, build_expression, opt_arg};

pub fn prefill_slot_with_value(
    item_key: &str,
    slot_key: &str,
    value: impl Into<ExpressionArg>,
) -> Expression {
    build_expression(
        "PREFILL_SLOT_WITH_VALUE",
        None,
        [arg(item_key), arg(slot_key), arg(value)],
    )
}

/// Copies the last response to `item_key`, optionally only when newer than the given span.
pub fn get_last_survey_item(
    survey_key: &str,
    item_key: &str,
    submitted_later_than: Option<Duration>,
) -> Expression {
    build_expression(
        "GET_LAST_SURVEY_ITEM",
        None,
        [
            arg(survey_key),
            arg(item_key),
            opt_arg(submitted_later_than.map(|span| span.to_seconds())),
        ],
    )
}

pub fn last_responses_by_key(survey_key: &str, limit: u32) -> Expression {
    build_expression(
        "LAST_RESPONSES_BY_KEY",
        None,
        [arg(survey_key), arg(limit)],
    )
}

pub fn all_responses_since(since_timestamp: i64) -> Expression {
    build_expression("ALL_RESPONSES_SINCE", None, [arg(since_timestamp)])
}

pub fn responses_since_by_key(since_timestamp: i64, survey_key: &str) -> Expression {
    build_expression(
        "RESPONSES_SINCE_BY_KEY",
        None,
        [arg(since_timestamp), arg(survey_key)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_survey_item_window_in_seconds() {
        let expr = get_last_survey_item("intake", "intake.q1", Some(Duration::weeks(1)));
        assert_eq!(expr.data[2].as_num(), Some(604_800.0));
        let open = get_last_survey_item("intake", "intake.q1", None);
        assert_eq!(open.data.len(), 2);
    }
}
