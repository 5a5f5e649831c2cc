//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two-tier authorization model.
///
/// Administrators and editors may modify data; viewers are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum UserRole {
    /// Full access, including user management.
    Administrator,
    /// May modify documents, uploads and users.
    Editor,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// Whether this role may perform mutations.
    pub fn can_modify(&self) -> bool {
        matches!(self, Self::Administrator | Self::Editor)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = registry_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "administrador" => Ok(Self::Administrator),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(registry_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: administrator, editor, viewer"
            ))),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = registry_core::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
