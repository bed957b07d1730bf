use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString,
    AsRefStr, EnumIter, ToSchema,
)]
pub enum Role {
    #[serde(rename = "md")]
    #[strum(serialize = "md")]
    Md,
    #[serde(rename = "phead")]
    #[strum(serialize = "phead")]
    PlantHead,
    #[serde(rename = "accounts")]
    #[strum(serialize = "accounts")]
    Accounts,
    #[serde(rename = "shift")]
    #[strum(serialize = "shift")]
    ShiftInCharge,
    #[serde(rename = "scanner")]
    #[strum(serialize = "scanner")]
    Scanner,
    #[default]
    #[serde(rename = "staff")]
    #[strum(serialize = "staff")]
    Staff,
}

impl Role {
    /// Roles allowed to mark attendance on behalf of workers.
    pub const ATTENDANCE_MARKERS: &'static [Role] = &[Role::PlantHead, Role::Md, Role::Scanner];

    /// Roles allowed to read another user's profile.
    pub const PROFILE_READERS: &'static [Role] = &[Role::Md, Role::Accounts];

    pub const ADMINS: &'static [Role] = &[Role::Md];
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_match_stored_values() {
        let codes: Vec<String> = Role::iter().map(|r| r.to_string()).collect();
        assert_eq!(codes, ["md", "phead", "accounts", "shift", "scanner", "staff"]);
    }

    #[test]
    fn parses_and_serializes_codes() {
        assert_eq!("phead".parse::<Role>().unwrap(), Role::PlantHead);
        assert_eq!(serde_json::to_string(&Role::ShiftInCharge).unwrap(), "\"shift\"");
        assert!("GOD".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Staff);
    }
}
