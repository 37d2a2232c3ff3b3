use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::actions::if_then;
use crate::engine::conditions::check_event_type;
use crate::expr::Expression;

/// Study event kinds the engine dispatches rules on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Enter,
    Submit,
    Timer,
    Merge,
    Leave,
    Custom,
}

impl EventKind {
    /// Order in which composed rules are emitted.
    pub const ALL: [EventKind; 6] = [
        Self::Enter,
        Self::Submit,
        Self::Timer,
        Self::Merge,
        Self::Leave,
        Self::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "ENTER",
            Self::Submit => "SUBMIT",
            Self::Timer => "TIMER",
            Self::Merge => "MERGE",
            Self::Leave => "LEAVE",
            Self::Custom => "CUSTOM",
        }
    }
}

/// Actions per event kind, composed into the study rules document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Vec<Expression>>,
}

impl StudyRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the actions run for `kind`, replacing earlier ones.
    pub fn with(mut self, kind: EventKind, actions: Vec<Expression>) -> Self {
        *self.slot_mut(kind) = Some(actions);
        self
    }

    pub fn actions(&self, kind: EventKind) -> Option<&[Expression]> {
        match kind {
            EventKind::Enter => self.enter.as_deref(),
            EventKind::Submit => self.submit.as_deref(),
            EventKind::Timer => self.timer.as_deref(),
            EventKind::Merge => self.merge.as_deref(),
            EventKind::Leave => self.leave.as_deref(),
            EventKind::Custom => self.custom.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, kind: EventKind) -> &mut Option<Vec<Expression>> {
        match kind {
            EventKind::Enter => &mut self.enter,
            EventKind::Submit => &mut self.submit,
            EventKind::Timer => &mut self.timer,
            EventKind::Merge => &mut self.merge,
            EventKind::Leave => &mut self.leave,
            EventKind::Custom => &mut self.custom,
        }
    }

    /// One `IFTHEN(checkEventType(kind), ...actions)` per kind with actions, in
    /// [`EventKind::ALL`] order. Kinds without actions are skipped.
    pub fn compose(&self) -> Vec<Expression> {
        EventKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let actions = self.actions(kind).filter(|actions| !actions.is_empty())?;
                Some(if_then(check_event_type(kind), actions.iter().cloned()))
            })
            .collect()
    }
}
