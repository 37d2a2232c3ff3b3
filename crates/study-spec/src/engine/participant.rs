//! Queries on the participant state.
//!
//! During a merge event the study engine sees two states: the participant's own and the incoming
//! one. [`ParticipantState::INCOMING`] builds the same queries against the latter.

use crate::expr::{Expression, ExpressionArg, arg, build_expression, opt_arg};

use super::conditions::parse_value_as_num;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantState {
    prefix: &'static str,
}

impl ParticipantState {
    pub const CURRENT: Self = Self { prefix: "" };
    pub const INCOMING: Self = Self {
        prefix: "incomingState:",
    };

    fn query<I>(&self, name: &str, args: I) -> Expression
    where
        I: IntoIterator<Item = Option<ExpressionArg>>,
    {
        build_expression(format!("{}{name}", self.prefix), None, args)
    }

    /// Timestamp of the participant entering the study.
    pub fn get_study_entry_time(&self) -> Expression {
        Expression::named(format!("{}getStudyEntryTime", self.prefix))
    }

    pub fn has_survey_key_assigned(&self, survey_key: &str) -> Expression {
        self.query("hasSurveyKeyAssigned", [arg(survey_key)])
    }

    pub fn get_survey_key_assigned_from(&self, survey_key: &str) -> Expression {
        self.query("getSurveyKeyAssignedFrom", [arg(survey_key)])
    }

    pub fn get_survey_key_assigned_until(&self, survey_key: &str) -> Expression {
        self.query("getSurveyKeyAssignedUntil", [arg(survey_key)])
    }

    pub fn has_study_status(&self, status: &str) -> Expression {
        self.query("hasStudyStatus", [arg(status)])
    }

    /// Case-sensitive match on both flag key and value.
    pub fn has_participant_flag_key_and_value(&self, key: &str, value: &str) -> Expression {
        self.query("hasParticipantFlag", [arg(key), arg(value)])
    }

    pub fn has_participant_flag_key(&self, key: &str) -> Expression {
        self.query("hasParticipantFlagKey", [arg(key)])
    }

    pub fn get_participant_flag_value(&self, key: &str) -> Expression {
        self.query("getParticipantFlagValue", [arg(key)])
    }

    pub fn get_participant_flag_value_as_num(&self, key: &str) -> Expression {
        parse_value_as_num(self.get_participant_flag_value(key))
    }

    pub fn has_message_type_assigned(&self, message_type: &str) -> Expression {
        self.query("hasMessageTypeAssigned", [arg(message_type)])
    }

    /// `scheduledFor` of the message type, zero when not assigned.
    pub fn get_message_next_time(&self, message_type: &str) -> Expression {
        self.query("getMessageNextTime", [arg(message_type)])
    }

    /// Timestamp of the last submission, of `survey_key` or of any survey.
    pub fn get_last_submission_date(&self, survey_key: Option<&str>) -> Expression {
        self.query("getLastSubmissionDate", [opt_arg(survey_key)])
    }

    pub fn last_submission_date_older_than(
        &self,
        reference: impl Into<ExpressionArg>,
        survey_key: Option<&str>,
    ) -> Expression {
        self.query(
            "lastSubmissionDateOlderThan",
            [arg(reference), opt_arg(survey_key)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_queries_are_prefixed() {
        let current = ParticipantState::CURRENT.has_study_status("active");
        let incoming = ParticipantState::INCOMING.has_study_status("active");
        assert_eq!(current.name, "hasStudyStatus");
        assert_eq!(incoming.name, "incomingState:hasStudyStatus");
        assert_eq!(current.data, incoming.data);
    }

    #[test]
    fn flag_value_pair_uses_engine_name() {
        let expr = ParticipantState::CURRENT.has_participant_flag_key_and_value("group", "a");
        assert_eq!(expr.name, "hasParticipantFlag");
    }

    #[test]
    fn optional_survey_key_is_dropped() {
        let expr = ParticipantState::CURRENT.get_last_submission_date(None);
        assert!(expr.data.is_empty());
        let expr = ParticipantState::CURRENT.last_submission_date_older_than(10, Some("weekly"));
        assert_eq!(expr.data.len(), 2);
    }
}
