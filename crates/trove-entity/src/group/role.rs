//! Group role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display role of a subject on a group.
///
/// A subject may hold several relations simultaneously; the effective
/// role is the highest-precedence one: Owner > Admin > Member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    /// Group creator with full control.
    Owner,
    /// Can invite and demote other members.
    Admin,
    /// Plain membership.
    Member,
}

impl GroupRole {
    /// Return the precedence level (higher wins when a subject holds
    /// several relations).
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Owner => 3,
            Self::Admin => 2,
            Self::Member => 1,
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GroupRole {
    type Err = trove_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(trove_core::AppError::validation(format!(
                "Invalid group role: '{s}'. Expected one of: owner, admin, member"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(GroupRole::Owner.precedence() > GroupRole::Admin.precedence());
        assert!(GroupRole::Admin.precedence() > GroupRole::Member.precedence());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("owner".parse::<GroupRole>().unwrap(), GroupRole::Owner);
        assert_eq!("ADMIN".parse::<GroupRole>().unwrap(), GroupRole::Admin);
        assert!("invalid".parse::<GroupRole>().is_err());
    }
}
