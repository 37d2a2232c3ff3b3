use serde::{Deserialize, Serialize};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Calendar-free span of time; months are 30 days and years 365 days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Duration {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Duration {
    pub fn days(days: i64) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn weeks(weeks: i64) -> Self {
        Self {
            weeks,
            ..Self::default()
        }
    }

    pub fn hours(hours: i64) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn to_seconds(&self) -> i64 {
        self.years * YEAR
            + self.months * MONTH
            + self.weeks * WEEK
            + self.days * DAY
            + self.hours * HOUR
            + self.minutes * MINUTE
            + self.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_seconds() {
        assert_eq!(Duration::days(1).to_seconds(), 86_400);
        assert_eq!(Duration::weeks(2).to_seconds(), 1_209_600);
        let mixed = Duration {
            years: 1,
            months: 1,
            minutes: 2,
            seconds: 5,
            ..Duration::default()
        };
        assert_eq!(mixed.to_seconds(), 365 * 86_400 + 30 * 86_400 + 125);
    }

    #[test]
    fn negative_offsets() {
        assert_eq!(Duration::hours(-2).to_seconds(), -7_200);
    }
}
