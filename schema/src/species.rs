use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Every species the catalog knows about. The variant name doubles as the
/// display name and as the persisted starter key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum Species {
    Charmander,
    Squirtle,
    Bulbasaur,
}

impl Species {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// All species in catalog order (the order the starter screen lists them).
    pub fn all() -> Vec<Species> {
        Species::iter().collect()
    }

    /// Case-insensitive lookup used for typed player input.
    pub fn from_name(name: &str) -> Option<Species> {
        Species::iter().find(|species| species.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
