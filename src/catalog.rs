use crate::errors::{CatalogError, CatalogResult};
use schema::{Species, SpeciesData};
use std::sync::LazyLock;

pub const BUILTIN_SPECIES_CATALOG: &str = include_str!("../data/species.ron");

// Lazy-loaded catalog data
static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_ron_str(BUILTIN_SPECIES_CATALOG).expect("builtin species catalog should parse")
});

/// Immutable species table, indexed in `Species` declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<SpeciesData>,
}

impl Catalog {
    /// Parse and validate a catalog. Every species must appear exactly once.
    pub fn from_ron_str(text: &str) -> CatalogResult<Self> {
        let parsed: Vec<SpeciesData> = ron::from_str(text)?;

        let mut entries = Vec::with_capacity(parsed.len());
        for species in Species::all() {
            let mut matching = parsed.iter().filter(|entry| entry.species == species);
            let entry = matching
                .next()
                .ok_or(CatalogError::MissingSpecies(species))?;
            if matching.next().is_some() {
                return Err(CatalogError::DuplicateSpecies(species));
            }
            entry.validate().map_err(CatalogError::InvalidEntry)?;
            entries.push(entry.clone());
        }

        Ok(Self { entries })
    }

    pub fn get(&self, species: Species) -> &SpeciesData {
        // Construction guarantees one entry per variant, in declaration order.
        &self.entries[species as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesData> {
        self.entries.iter()
    }
}

/// The compiled-in catalog.
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

/// Get the catalog template for a species.
pub fn get_species_data(species: Species) -> &'static SpeciesData {
    catalog().get(species)
}
