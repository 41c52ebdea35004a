//! User model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Line;

/// Stable user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new unique user ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Organizational rank, from system admin down to front-line staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    BranchPresident,
    VpCorporate,
    VpRetail,
    VpPersonal,
    DepartmentManager,
    Staff,
}

impl Role {
    pub const ALL: [Self; 7] = [
        Self::Admin,
        Self::BranchPresident,
        Self::VpCorporate,
        Self::VpRetail,
        Self::VpPersonal,
        Self::DepartmentManager,
        Self::Staff,
    ];

    /// The line a vice-president oversees.
    pub const fn vp_line(self) -> Option<Line> {
        match self {
            Self::VpCorporate => Some(Line::Corporate),
            Self::VpRetail => Some(Line::Retail),
            Self::VpPersonal => Some(Line::Personal),
            _ => None,
        }
    }

    pub const fn is_management(self) -> bool {
        !matches!(self, Self::Staff)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::BranchPresident => "branch-president",
            Self::VpCorporate => "vp-corporate",
            Self::VpRetail => "vp-retail",
            Self::VpPersonal => "vp-personal",
            Self::DepartmentManager => "department-manager",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| format!("unknown role '{}'", s.trim()))
    }
}

/// An organizational actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Human-facing employee code used for lookup
    pub employee_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    /// Display-only job title
    #[serde(default)]
    pub title: String,
    pub department: String,
    pub line: Line,
    #[serde(default)]
    pub yearly_target: u32,
}

impl User {
    pub fn new(
        employee_id: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        department: impl Into<String>,
        line: Line,
    ) -> Self {
        Self {
            id: UserId::new(),
            employee_id: employee_id.into(),
            name: name.into(),
            password: None,
            role,
            title: String::new(),
            department: department.into(),
            line,
            yearly_target: 0,
        }
    }
}
