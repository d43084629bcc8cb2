use derive_more::{AsRef, Display};

/// Identity of an authenticated user.
///
/// Assigned by the external authentication provider and treated as an
/// opaque string. All programs, sessions and exercise templates are
/// scoped to a user id.
#[derive(AsRef, Debug, Display, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(String);

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}
