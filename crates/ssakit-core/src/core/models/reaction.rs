use super::ids::SpeciesId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoichTerm {
    pub species: SpeciesId,
    pub coefficient: u32,
}

impl StoichTerm {
    pub fn new(species: SpeciesId, coefficient: u32) -> Self {
        Self {
            species,
            coefficient,
        }
    }
}

/// An immutable reaction channel.
///
/// The net stoichiometric change is derived once in [`Reaction::new`]; the stepper only
/// ever reads [`Reaction::delta`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub label: String,
    reactants: Vec<StoichTerm>,
    products: Vec<StoichTerm>,
    rate_key: String,
    delta: Vec<(SpeciesId, i64)>,
}

impl Reaction {
    pub fn new(
        label: String,
        reactants: Vec<StoichTerm>,
        products: Vec<StoichTerm>,
        rate_key: String,
    ) -> Self {
        let reactants = merge_terms(reactants);
        let products = merge_terms(products);

        let mut net: BTreeMap<SpeciesId, i64> = BTreeMap::new();
        for term in &products {
            *net.entry(term.species).or_default() += term.coefficient as i64;
        }
        for term in &reactants {
            *net.entry(term.species).or_default() -= term.coefficient as i64;
        }
        let delta = net.into_iter().filter(|&(_, d)| d != 0).collect();

        Self {
            label,
            reactants,
            products,
            rate_key,
            delta,
        }
    }

    pub fn reactants(&self) -> &[StoichTerm] {
        &self.reactants
    }

    pub fn products(&self) -> &[StoichTerm] {
        &self.products
    }

    pub fn rate_key(&self) -> &str {
        &self.rate_key
    }

    /// Sparse stoichiometric delta, sorted by species index.
    #[inline]
    pub fn delta(&self) -> &[(SpeciesId, i64)] {
        &self.delta
    }

    /// Total number of reactant molecules consumed by one firing.
    pub fn order(&self) -> u32 {
        self.reactants.iter().map(|t| t.coefficient).sum()
    }

    pub fn product_count(&self) -> u32 {
        self.products.iter().map(|t| t.coefficient).sum()
    }

    pub fn is_spontaneous(&self) -> bool {
        self.reactants.is_empty()
    }

    /// Whether `other` undoes this reaction exactly.
    pub fn is_reverse_of(&self, other: &Reaction) -> bool {
        self.reactants == other.products && self.products == other.reactants
    }
}

fn merge_terms(terms: Vec<StoichTerm>) -> Vec<StoichTerm> {
    let mut merged: BTreeMap<SpeciesId, u32> = BTreeMap::new();
    for term in terms {
        *merged.entry(term.species).or_default() += term.coefficient;
    }
    merged
        .into_iter()
        .map(|(species, coefficient)| StoichTerm::new(species, coefficient))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(species: usize, coefficient: u32) -> StoichTerm {
        StoichTerm::new(SpeciesId(species), coefficient)
    }

    #[test]
    fn delta_is_products_minus_reactants() {
        let reaction = Reaction::new(
            "bind".into(),
            vec![term(0, 1), term(1, 1)],
            vec![term(2, 1)],
            "k1".into(),
        );
        assert_eq!(
            reaction.delta(),
            &[(SpeciesId(0), -1), (SpeciesId(1), -1), (SpeciesId(2), 1)]
        );
        assert_eq!(reaction.order(), 2);
    }

    #[test]
    fn catalytic_species_cancel_out_of_delta() {
        let reaction = Reaction::new(
            "autocatalysis".into(),
            vec![term(0, 1), term(1, 1)],
            vec![term(0, 2)],
            "k".into(),
        );
        assert_eq!(reaction.delta(), &[(SpeciesId(0), 1), (SpeciesId(1), -1)]);
    }

    #[test]
    fn repeated_terms_are_merged() {
        let reaction = Reaction::new(
            "dimerize".into(),
            vec![term(0, 1), term(0, 1)],
            vec![term(1, 1)],
            "k".into(),
        );
        assert_eq!(reaction.reactants(), &[term(0, 2)]);
        assert_eq!(reaction.delta(), &[(SpeciesId(0), -2), (SpeciesId(1), 1)]);
    }

    #[test]
    fn spontaneous_reaction_has_no_reactants() {
        let reaction = Reaction::new("birth".into(), vec![], vec![term(0, 1)], "k".into());
        assert!(reaction.is_spontaneous());
        assert_eq!(reaction.order(), 0);
    }

    #[test]
    fn reverse_detection_matches_swapped_sides() {
        let forward = Reaction::new("f".into(), vec![term(0, 1), term(1, 1)], vec![term(2, 1)], "k1".into());
        let backward = Reaction::new("b".into(), vec![term(2, 1)], vec![term(1, 1), term(0, 1)], "k2".into());
        assert!(forward.is_reverse_of(&backward));
        assert!(backward.is_reverse_of(&forward));
        assert!(!forward.is_reverse_of(&forward));
    }
}
