use crate::{ElementType, Species};
use serde::{Deserialize, Serialize};

/// A single attack. Moves are immutable once loaded from the catalog; creature
/// instances carry their own copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub power: u16,
    #[serde(rename = "type")]
    pub element: ElementType,
}

impl MoveData {
    pub fn new(name: impl Into<String>, power: u16, element: ElementType) -> Self {
        Self {
            name: name.into(),
            power,
            element,
        }
    }
}

/// Catalog template from which creature instances are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub species: Species,
    pub element: ElementType,
    pub max_hp: u16,
    pub level: u16,
    pub moves: Vec<MoveData>, // Ordered, never empty
}

impl SpeciesData {
    pub fn name(&self) -> &'static str {
        self.species.name()
    }

    /// Checks the catalog invariants: positive health and level, at least one move.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_hp == 0 {
            return Err(format!("{} has zero max HP", self.name()));
        }
        if self.level == 0 {
            return Err(format!("{} has level 0", self.name()));
        }
        if self.moves.is_empty() {
            return Err(format!("{} has no moves", self.name()));
        }
        Ok(())
    }
}
