//! Component keys the study runtime addresses by convention.

/// Response group of a question.
pub const RESPONSE_GROUP: &str = "rg";
/// Single choice group inside the response group.
pub const SINGLE_CHOICE_GROUP: &str = "scg";
/// Multiple choice group inside the response group.
pub const MULTIPLE_CHOICE_GROUP: &str = "mcg";
/// Consent component inside the response group.
pub const CONSENT_GROUP: &str = "con";

/// `rg.scg`
pub fn single_choice_path() -> String {
    format!("{RESPONSE_GROUP}.{SINGLE_CHOICE_GROUP}")
}

/// `rg.mcg`
pub fn multiple_choice_path() -> String {
    format!("{RESPONSE_GROUP}.{MULTIPLE_CHOICE_GROUP}")
}

/// `rg.con`
pub fn consent_path() -> String {
    format!("{RESPONSE_GROUP}.{CONSENT_GROUP}")
}
