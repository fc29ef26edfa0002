// Wild Grass Schema - Shared type definitions
// This crate contains the catalog enums and data records shared between the
// game core and the catalog data files.

// Re-export the main types
pub use element_types::*;
pub use species::*;
pub use species_data::*;

pub mod element_types;
pub mod species;
pub mod species_data;
