//! Core type definitions with validation.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An activity set must hold one or two distinct activities.
    #[error("activity set must hold 1 or 2 distinct activities, got {len}")]
    ActivitySetSize { len: usize },
}

/// Generates a validated string key newtype with common trait implementations.
macro_rules! define_string_key {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new key after validation.
            pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
                let key = key.into();
                if key.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(key))
            }

            /// Returns the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_key!(
    /// A validated activity name.
    ///
    /// Activity keys join all four scoring dimensions: identical names in
    /// different traces denote the same activity.
    ActivityKey, "activity name"
);

/// An unordered set of one or two distinct activities.
///
/// Keys the multi-dimensional scores: singletons for individual activities,
/// pairs for activities co-occurring within one trace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ActivityKey>", into = "Vec<ActivityKey>")]
pub struct ActivitySet(BTreeSet<ActivityKey>);

impl ActivitySet {
    /// A one-element set.
    pub fn single(activity: ActivityKey) -> Self {
        Self(BTreeSet::from([activity]))
    }

    /// A two-element set, or `None` when both activities are the same.
    pub fn pair(a: ActivityKey, b: ActivityKey) -> Option<Self> {
        (a != b).then(|| Self(BTreeSet::from([a, b])))
    }
}

impl TryFrom<Vec<ActivityKey>> for ActivitySet {
    type Error = ValidationError;

    fn try_from(value: Vec<ActivityKey>) -> Result<Self, Self::Error> {
        let set: BTreeSet<ActivityKey> = value.into_iter().collect();
        match set.len() {
            1 | 2 => Ok(Self(set)),
            len => Err(ValidationError::ActivitySetSize { len }),
        }
    }
}

impl From<ActivitySet> for Vec<ActivityKey> {
    fn from(set: ActivitySet) -> Self {
        set.0.into_iter().collect()
    }
}

impl fmt::Display for ActivitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(ActivityKey::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
