//! Prefixed entity IDs.
//!
//! Every ID is a `{prefix}-{uuid}` string. The prefix doubles as a
//! human-readable type tag: `parse` rejects a value carrying the wrong
//! prefix, and `KIND` is the label stores put into their not-found errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A string that is not a well-formed ID of the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id '{value}': expected '{prefix}-...'")]
pub struct IdError {
    /// Entity kind the caller asked for.
    pub kind: &'static str,
    /// Prefix a well-formed ID of that kind starts with.
    pub prefix: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! define_id {
    ($name:ident, $prefix:literal, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Entity-kind label, used by stores in not-found errors.
            pub const KIND: &'static str = $kind;

            /// Prefix every well-formed ID of this type starts with.
            pub const PREFIX: &'static str = $prefix;

            /// Creates a new random ID.
            pub fn new() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4()))
            }

            /// Parses external input, rejecting values without the
            /// `{prefix}-` tag. Use this for anything user-supplied.
            pub fn parse(s: &str) -> Result<Self, IdError> {
                match s.strip_prefix(concat!($prefix, "-")) {
                    Some(rest) if !rest.is_empty() => Ok(Self(s.to_string())),
                    _ => Err(IdError {
                        kind: $kind,
                        prefix: $prefix,
                        value: s.to_string(),
                    }),
                }
            }

            /// Wraps an already-trusted string (stored records, tests).
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, IdError> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(WorkshopId, "shop", "workshop");
define_id!(WorkbenchId, "bench", "workbench");
define_id!(CommissionId, "comm", "commission");
define_id!(WorkplanId, "plan", "workplan");
define_id!(ActorId, "actor", "actor");
