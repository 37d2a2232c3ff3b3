//! Sweeps over a finished survey for keys used by more than one sibling.

use std::collections::HashMap;
use std::fmt;

use tracing::error;

use crate::spec::{Survey, SurveyItem};

/// A key that appears twice among the children of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyReport {
    pub key: String,
    pub parent_key: String,
    pub first_index: usize,
    pub duplicate_index: usize,
}

impl fmt::Display for DuplicateKeyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is used twice (at index {} and at index {})",
            self.key, self.first_index, self.duplicate_index
        )
    }
}

/// Checks the direct children of the survey root.
pub fn check_duplicate_child_keys(survey: &Survey) -> Vec<DuplicateKeyReport> {
    let mut reports = Vec::new();
    sweep(
        &survey.survey_definition.key,
        &survey.survey_definition.items,
        &mut reports,
    );
    reports
}

/// Checks the children of every group in the survey.
pub fn check_duplicate_keys_deep(survey: &Survey) -> Vec<DuplicateKeyReport> {
    let mut reports = Vec::new();
    sweep(
        &survey.survey_definition.key,
        &survey.survey_definition.items,
        &mut reports,
    );
    for item in &survey.survey_definition.items {
        item.walk(&mut |item| {
            if let SurveyItem::Group(group) = item {
                sweep(&group.key, &group.items, &mut reports);
            }
        });
    }
    reports
}

fn sweep(parent_key: &str, items: &[SurveyItem], reports: &mut Vec<DuplicateKeyReport>) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        match first_seen.get(item.key()) {
            Some(&first_index) => {
                let report = DuplicateKeyReport {
                    key: item.key().to_string(),
                    parent_key: parent_key.to_string(),
                    first_index,
                    duplicate_index: index,
                };
                error!(parent = parent_key, "duplicate key: {report}");
                reports.push(report);
            }
            None => {
                first_seen.insert(item.key(), index);
            }
        }
    }
}
