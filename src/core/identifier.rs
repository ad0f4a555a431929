use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

string_wrapper!(
    /// Identifier of a presentation definition, submission or field constraint.
    Id
);

string_wrapper!(
    /// A human-friendly name.
    Name
);

string_wrapper!(
    /// Describes why some data is being requested.
    Purpose
);

string_wrapper!(
    /// A group of input descriptors, referenced by submission requirements.
    Group
);

string_wrapper!(
    /// Identifier of an input descriptor, unique within a presentation definition.
    InputDescriptorId
);

impl Id {
    /// Generate a random (UUID v4) identifier.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
