use super::ModelError;
use super::ids::SpeciesId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    pub name: String,            // Unique identifier (e.g., "A", "ABD")
    composition: Vec<String>,    // Monomer labels making up this species
}

impl Species {
    /// Creates a species whose composition is read from the characters of its name,
    /// so that `"ABD"` is made of the monomers `A`, `B` and `D`.
    pub fn new(name: &str) -> Self {
        let composition = name.chars().map(|c| c.to_string()).collect();
        Self {
            name: name.to_string(),
            composition,
        }
    }

    pub fn with_composition(name: &str, composition: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            composition,
        }
    }

    pub fn composition(&self) -> &[String] {
        &self.composition
    }

    /// Number of monomer units composing this species.
    #[inline]
    pub fn size(&self) -> usize {
        self.composition.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesCatalog {
    species: Vec<Species>,
    name_map: HashMap<String, usize>,
}

impl SpeciesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, species: Species) -> Result<SpeciesId, ModelError> {
        if self.name_map.contains_key(&species.name) {
            return Err(ModelError::DuplicateSpecies(species.name));
        }
        let index = self.species.len();
        self.name_map.insert(species.name.clone(), index);
        self.species.push(species);
        Ok(SpeciesId(index))
    }

    pub fn id_of(&self, name: &str) -> Option<SpeciesId> {
        self.name_map.get(name).copied().map(SpeciesId)
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(id.0)
    }

    pub fn name(&self, id: SpeciesId) -> &str {
        self.species
            .get(id.0)
            .map(|s| s.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.species.iter().map(Species::size).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &Species)> {
        self.species
            .iter()
            .enumerate()
            .map(|(i, s)| (SpeciesId(i), s))
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Distinct monomer labels in first-appearance order.
    pub fn monomer_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for species in &self.species {
            for label in &species.composition {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_composition_defaults_to_name_characters() {
        let species = Species::new("ABD");
        assert_eq!(species.composition(), &["A", "B", "D"]);
        assert_eq!(species.size(), 3);
    }

    #[test]
    fn explicit_composition_supports_multi_character_labels() {
        let species = Species::with_composition("1-2", vec!["1".into(), "2".into()]);
        assert_eq!(species.size(), 2);
    }

    #[test]
    fn catalog_assigns_stable_dense_indices() {
        let mut catalog = SpeciesCatalog::new();
        let a = catalog.add(Species::new("A")).unwrap();
        let b = catalog.add(Species::new("B")).unwrap();
        let ab = catalog.add(Species::new("AB")).unwrap();

        assert_eq!((a.0, b.0, ab.0), (0, 1, 2));
        assert_eq!(catalog.id_of("AB"), Some(ab));
        assert_eq!(catalog.name(b), "B");
        assert_eq!(catalog.sizes(), vec![1, 1, 2]);
    }

    #[test]
    fn catalog_rejects_duplicate_names() {
        let mut catalog = SpeciesCatalog::new();
        catalog.add(Species::new("A")).unwrap();
        let result = catalog.add(Species::new("A"));
        assert_eq!(result, Err(ModelError::DuplicateSpecies("A".to_string())));
    }

    #[test]
    fn monomer_labels_are_collected_in_first_appearance_order() {
        let mut catalog = SpeciesCatalog::new();
        catalog.add(Species::new("B")).unwrap();
        catalog.add(Species::new("A")).unwrap();
        catalog.add(Species::new("AB")).unwrap();
        assert_eq!(catalog.monomer_labels(), vec!["B", "A"]);
    }
}
