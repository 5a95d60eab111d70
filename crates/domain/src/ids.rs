use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifiers in Gumshoe are strings, not UUIDs: every id either comes out
/// of an authored case document (rooms, suspects, secrets) or is handed to us
/// by the chat platform (guilds, players). We never mint them in-process.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Tenant and player identity (opaque platform snowflakes)
define_id!(GuildId);
define_id!(PlayerId);

// Case document identity
define_id!(CaseId);
define_id!(RoomId);
define_id!(SuspectId);
define_id!(SecretId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_matches_inner() {
        let id = RoomId::new("study");
        assert_eq!(id.to_string(), "study");
        assert_eq!(id.as_str(), "study");
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = SuspectId::new("lady_ashworth");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"lady_ashworth\"");
        let back: SuspectId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
