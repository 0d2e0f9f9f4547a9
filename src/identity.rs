use serde::{Deserialize, Serialize};

/// Portal role claimed by the external identity provider.
///
/// The provider's claim is trusted as-is; nothing here re-verifies it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Prospect,
    Client,
    Coach,
}

/// Declared experience level. Selects which UI modules and prompt phrasing a
/// client sees; carries no other semantics.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
}

impl Role {
    #[must_use]
    pub fn can_manage_clients(self) -> bool {
        matches!(self, Self::Coach)
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Tier};
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Coach.to_string(), "coach");
        assert_eq!(Role::from_str("client").unwrap(), Role::Client);
    }

    #[test]
    fn only_coach_manages_clients() {
        assert!(Role::Coach.can_manage_clients());
        assert!(!Role::Client.can_manage_clients());
        assert!(!Role::Prospect.can_manage_clients());
    }

    #[test]
    fn tier_serde_uses_snake_case() {
        let json = serde_json::to_string(&Tier::Intermediate).unwrap();
        assert_eq!(json, "\"intermediate\"");
    }
}
