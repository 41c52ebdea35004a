//! Organizational line model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three top-level organizational verticals.
///
/// Stored under the labels the shared document already uses, so other
/// clients of the same bin keep filtering on them. Upper-case names are
/// accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Line {
    #[serde(rename = "公司", alias = "CORPORATE")]
    Corporate,
    #[serde(rename = "零售", alias = "RETAIL")]
    Retail,
    #[serde(rename = "个人", alias = "PERSONAL")]
    Personal,
}

impl Line {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Corporate => "Corporate",
            Self::Retail => "Retail",
            Self::Personal => "Personal",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Line {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "corporate" | "company" => Ok(Self::Corporate),
            "retail" => Ok(Self::Retail),
            "personal" => Ok(Self::Personal),
            other => Err(format!(
                "unknown line '{other}' (expected corporate, retail, or personal)"
            )),
        }
    }
}
