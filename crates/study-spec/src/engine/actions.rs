//! Control flow and state-changing actions of study rules.

use crate::expr::{Expression, ExpressionArg, arg, build_expression, opt_arg};

/// Priority of an assigned survey in the participant's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyCategory {
    Immediate,
    Prio,
    Normal,
    Optional,
}

impl SurveyCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Prio => "prio",
            Self::Normal => "normal",
            Self::Optional => "optional",
        }
    }
}

/// Which assignments of a survey key to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveSelector {
    First,
    Last,
    All,
}

/// Rendering hint for a report attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDataType {
    Date,
    Float,
    Int,
    String,
    RawMessage,
    KeyList,
}

impl ReportDataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Float => "float",
            Self::Int => "int",
            Self::String => "string",
            Self::RawMessage => "rawMessage",
            Self::KeyList => "keyList",
        }
    }
}

fn action<I>(name: &str, args: I) -> Expression
where
    I: IntoIterator<Item = Option<ExpressionArg>>,
{
    build_expression(name, None, args)
}

/// `IF(condition, then, otherwise?)`
pub fn if_else(
    condition: Expression,
    then: Expression,
    otherwise: Option<Expression>,
) -> Expression {
    action("IF", [arg(condition), arg(then), opt_arg(otherwise)])
}

/// Runs all `actions` in order.
pub fn do_all(actions: impl IntoIterator<Item = Expression>) -> Expression {
    action("DO", actions.into_iter().map(arg))
}

/// Runs `actions` when `condition` holds.
pub fn if_then(condition: Expression, actions: impl IntoIterator<Item = Expression>) -> Expression {
    action(
        "IFTHEN",
        std::iter::once(arg(condition)).chain(actions.into_iter().map(arg)),
    )
}

pub fn update_study_status(status: &str) -> Expression {
    action("UPDATE_STUDY_STATUS", [arg(status)])
}

pub fn start_new_study_session() -> Expression {
    Expression::named("START_NEW_STUDY_SESSION")
}

pub fn update_flag(key: &str, value: impl Into<ExpressionArg>) -> Expression {
    action("UPDATE_FLAG", [arg(key), arg(value)])
}

pub fn remove_flag(key: &str) -> Expression {
    action("REMOVE_FLAG", [arg(key)])
}

/// Assigns a survey; an unset validity bound is sent as `0`.
pub fn add_new_survey(
    survey_key: &str,
    category: SurveyCategory,
    active_from: Option<ExpressionArg>,
    active_until: Option<ExpressionArg>,
) -> Expression {
    action(
        "ADD_NEW_SURVEY",
        [
            arg(survey_key),
            Some(active_from.unwrap_or_else(|| ExpressionArg::num(0))),
            Some(active_until.unwrap_or_else(|| ExpressionArg::num(0))),
            arg(category.as_str()),
        ],
    )
}

pub fn remove_all_surveys() -> Expression {
    Expression::named("REMOVE_ALL_SURVEYS")
}

pub fn remove_survey_by_key(survey_key: &str, selector: RemoveSelector) -> Expression {
    match selector {
        RemoveSelector::All => action("REMOVE_SURVEYS_BY_KEY", [arg(survey_key)]),
        RemoveSelector::First => action("REMOVE_SURVEY_BY_KEY", [arg(survey_key), arg("first")]),
        RemoveSelector::Last => action("REMOVE_SURVEY_BY_KEY", [arg(survey_key), arg("last")]),
    }
}

pub fn add_message(message_type: &str, scheduled_for: impl Into<ExpressionArg>) -> Expression {
    action("ADD_MESSAGE", [arg(message_type), arg(scheduled_for)])
}

pub fn remove_all_messages() -> Expression {
    Expression::named("REMOVE_ALL_MESSAGES")
}

pub fn remove_messages_by_type(message_type: &str) -> Expression {
    action("REMOVE_MESSAGES_BY_TYPE", [arg(message_type)])
}

pub fn remove_study_code(
    list_key: impl Into<ExpressionArg>,
    code: impl Into<ExpressionArg>,
) -> Expression {
    action("REMOVE_STUDY_CODE", [arg(list_key), arg(code)])
}

pub fn notify_researcher(
    message_type: &str,
    payload: impl IntoIterator<Item = ExpressionArg>,
) -> Expression {
    action(
        "NOTIFY_RESEARCHER",
        std::iter::once(arg(message_type)).chain(payload.into_iter().map(Some)),
    )
}

pub fn init_report(report_key: &str) -> Expression {
    action("INIT_REPORT", [arg(report_key)])
}

pub fn cancel_report(report_key: &str) -> Expression {
    action("CANCEL_REPORT", [arg(report_key)])
}

pub fn update_report_data(
    report_key: &str,
    attribute_key: &str,
    value: impl Into<ExpressionArg>,
    dtype: Option<ReportDataType>,
) -> Expression {
    action(
        "UPDATE_REPORT_DATA",
        [
            arg(report_key),
            arg(attribute_key),
            arg(value),
            opt_arg(dtype.map(ReportDataType::as_str)),
        ],
    )
}

pub fn remove_report_data(report_key: &str, attribute_key: &str) -> Expression {
    action("REMOVE_REPORT_DATA", [arg(report_key), arg(attribute_key)])
}

pub fn set_report_icon(report_key: &str, icon: &str) -> Expression {
    update_report_data(report_key, "icon", icon, None)
}

/// Report message; plain text unless `as_translation_key` is set.
pub fn set_report_message(report_key: &str, content: &str, as_translation_key: bool) -> Expression {
    update_report_data(
        report_key,
        "message",
        content,
        (!as_translation_key).then_some(ReportDataType::RawMessage),
    )
}

pub fn set_report_summary(report_key: &str, content: &str, as_translation_key: bool) -> Expression {
    update_report_data(
        report_key,
        "summary",
        content,
        (!as_translation_key).then_some(ReportDataType::RawMessage),
    )
}

/// Sets a linking code, replacing any earlier value for `for_key`.
pub fn set_linking_code(
    for_key: impl Into<ExpressionArg>,
    value: impl Into<ExpressionArg>,
) -> Expression {
    action("SET_LINKING_CODE", [arg(for_key), arg(value)])
}

/// Deletes the linking code for `for_key`, or all of them.
pub fn delete_linking_code(for_key: Option<ExpressionArg>) -> Expression {
    action("DELETE_LINKING_CODE", [for_key])
}

pub fn draw_study_code_as_linking_code(
    list_key: impl Into<ExpressionArg>,
    for_key: Option<ExpressionArg>,
) -> Expression {
    action("DRAW_STUDY_CODE_AS_LINKING_CODE", [arg(list_key), for_key])
}

pub fn remove_confidential_response_by_key(key: &str) -> Expression {
    action("REMOVE_CONFIDENTIAL_RESPONSE_BY_KEY", [arg(key)])
}

pub fn remove_all_confidential_responses() -> Expression {
    Expression::named("REMOVE_ALL_CONFIDENTIAL_RESPONSES")
}

pub fn external_event_handler(service_name: &str, route: Option<&str>) -> Expression {
    action("EXTERNAL_EVENT_HANDLER", [arg(service_name), opt_arg(route)])
}

pub fn stop_participation() -> Expression {
    update_study_status("inactive")
}

pub fn finish_participation() -> Expression {
    update_study_status("finished")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_survey_defaults_validity_to_zero() {
        let expr = add_new_survey("weekly", SurveyCategory::Prio, None, None);
        assert_eq!(
            serde_json::to_value(&expr).expect("serialize"),
            json!({
                "name": "ADD_NEW_SURVEY",
                "data": [
                    {"dtype": "str", "str": "weekly"},
                    {"dtype": "num", "num": 0},
                    {"dtype": "num", "num": 0},
                    {"dtype": "str", "str": "prio"}
                ]
            })
        );
    }

    #[test]
    fn removing_all_uses_plural_action() {
        let all = remove_survey_by_key("weekly", RemoveSelector::All);
        assert_eq!(all.name, "REMOVE_SURVEYS_BY_KEY");
        assert_eq!(all.data.len(), 1);
        let last = remove_survey_by_key("weekly", RemoveSelector::Last);
        assert_eq!(last.name, "REMOVE_SURVEY_BY_KEY");
        assert_eq!(last.data[1].as_str(), Some("last"));
    }

    #[test]
    fn report_messages_are_raw_unless_translated() {
        let raw = set_report_message("r", "hello", false);
        assert_eq!(raw.data[3].as_str(), Some("rawMessage"));
        let translated = set_report_summary("r", "summary.key", true);
        assert_eq!(translated.data.len(), 3);
    }

    #[test]
    fn if_else_drops_missing_branch() {
        let expr = if_else(Expression::named("c"), finish_participation(), None);
        assert_eq!(expr.name, "IF");
        assert_eq!(expr.data.len(), 2);
    }

    #[test]
    fn if_then_puts_condition_first() {
        let expr = if_then(
            Expression::named("c"),
            [stop_participation(), remove_all_messages()],
        );
        assert_eq!(expr.data.len(), 3);
        assert_eq!(expr.data[0].as_exp().map(|e| e.name.as_str()), Some("c"));
        assert_eq!(
            expr.data[2].as_exp().map(|e| e.name.as_str()),
            Some("REMOVE_ALL_MESSAGES")
        );
    }
}
