use super::ModelError;
use super::ids::SpeciesId;
use super::network::require_species;
use super::species::SpeciesCatalog;
use std::collections::HashMap;

/// Non-negative molecule counts, one per species in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State(Vec<u64>);

impl State {
    pub fn new(counts: Vec<u64>) -> Self {
        Self(counts)
    }

    pub fn zeros(n_species: usize) -> Self {
        Self(vec![0; n_species])
    }

    /// Builds a state from named counts; species that are not mentioned start at zero.
    pub fn from_named(
        catalog: &SpeciesCatalog,
        counts: &HashMap<String, u64>,
    ) -> Result<Self, ModelError> {
        let mut state = Self::zeros(catalog.len());
        for (name, &count) in counts {
            let id = require_species(catalog, name, "initial counts")?;
            state.0[id.0] = count;
        }
        Ok(state)
    }

    pub fn counts(&self) -> &[u64] {
        &self.0
    }

    pub fn into_counts(self) -> Vec<u64> {
        self.0
    }

    #[inline]
    pub fn get(&self, species: SpeciesId) -> u64 {
        self.0[species.0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies a sparse stoichiometric delta in place.
    ///
    /// The state is left untouched when any count would become negative.
    pub fn apply_delta(
        &mut self,
        delta: &[(SpeciesId, i64)],
        catalog: &SpeciesCatalog,
    ) -> Result<(), ModelError> {
        for &(species, change) in delta {
            if self.0[species.0].checked_add_signed(change).is_none() {
                return Err(ModelError::NegativeCount {
                    species: catalog.name(species).to_string(),
                });
            }
        }
        for &(species, change) in delta {
            self.0[species.0] = self.0[species.0].wrapping_add_signed(change);
        }
        Ok(())
    }

    /// `Σ weights[s] · count[s]`, e.g. the total monomer mass when weights are species sizes.
    /// `Σ count·weight`, widened so that no product of a `u64` count can overflow.
    pub fn weighted_total(&self, weights: &[usize]) -> u128 {
        self.0
            .iter()
            .zip(weights)
            .map(|(&count, &weight)| count as u128 * weight as u128)
            .sum()
    }

    /// Total number of each monomer label bound anywhere in the system.
    pub fn monomer_totals(&self, catalog: &SpeciesCatalog) -> HashMap<String, u64> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for (id, species) in catalog.iter() {
            for label in species.composition() {
                *totals.entry(label.clone()).or_default() += self.0[id.0];
            }
        }
        totals
    }

    pub fn check_len(&self, catalog: &SpeciesCatalog) -> Result<(), ModelError> {
        if self.0.len() != catalog.len() {
            return Err(ModelError::StateLength {
                expected: catalog.len(),
                actual: self.0.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<u64>> for State {
    fn from(counts: Vec<u64>) -> Self {
        Self(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::species::Species;

    fn catalog() -> SpeciesCatalog {
        let mut catalog = SpeciesCatalog::new();
        for name in ["A", "B", "AB"] {
            catalog.add(Species::new(name)).unwrap();
        }
        catalog
    }

    #[test]
    fn from_named_fills_unspecified_species_with_zero() {
        let counts = HashMap::from([("A".to_string(), 5), ("AB".to_string(), 2)]);
        let state = State::from_named(&catalog(), &counts).unwrap();
        assert_eq!(state.counts(), &[5, 0, 2]);
    }

    #[test]
    fn from_named_rejects_unknown_species() {
        let counts = HashMap::from([("C".to_string(), 1)]);
        let result = State::from_named(&catalog(), &counts);
        assert!(matches!(result, Err(ModelError::UnknownSpecies { .. })));
    }

    #[test]
    fn apply_delta_updates_counts() {
        let mut state = State::new(vec![3, 2, 0]);
        let delta = [(SpeciesId(0), -1), (SpeciesId(1), -1), (SpeciesId(2), 1)];
        state.apply_delta(&delta, &catalog()).unwrap();
        assert_eq!(state.counts(), &[2, 1, 1]);
    }

    #[test]
    fn apply_delta_refuses_negative_counts_without_partial_update() {
        let mut state = State::new(vec![1, 0, 0]);
        let delta = [(SpeciesId(0), -1), (SpeciesId(1), -1), (SpeciesId(2), 1)];
        let result = state.apply_delta(&delta, &catalog());
        assert_eq!(
            result,
            Err(ModelError::NegativeCount {
                species: "B".to_string()
            })
        );
        assert_eq!(state.counts(), &[1, 0, 0]);
    }

    #[test]
    fn weighted_total_and_monomer_totals_count_bound_units() {
        let catalog = catalog();
        let state = State::new(vec![4, 1, 3]);
        assert_eq!(state.weighted_total(&catalog.sizes()), 4 + 1 + 6);
        let totals = state.monomer_totals(&catalog);
        assert_eq!(totals["A"], 7);
        assert_eq!(totals["B"], 4);
    }

    #[test]
    fn weighted_total_does_not_overflow_for_large_counts() {
        let state = State::new(vec![u64::MAX, 0, u64::MAX]);
        let expected = u64::MAX as u128 + 2 * u64::MAX as u128;
        assert_eq!(state.weighted_total(&catalog().sizes()), expected);
    }
}
