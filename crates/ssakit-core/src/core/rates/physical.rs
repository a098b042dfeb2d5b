use super::RateError;
use super::table::RateTable;
use crate::core::models::network::{ReactionNetwork, ReversiblePair};
use crate::core::models::reaction::Reaction;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Pairwise bond energies between monomer labels. Lookups are order-independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondEnergyTable {
    energies: HashMap<(String, String), f64>,
}

impl BondEnergyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: &str, b: &str, energy: f64) {
        self.energies.insert(Self::key(a, b), energy);
    }

    pub fn with_bond(mut self, a: &str, b: &str, energy: f64) -> Self {
        self.insert(a, b, energy);
        self
    }

    /// Energy of the `a`–`b` contact, zero when the pair does not bond.
    pub fn get(&self, a: &str, b: &str) -> f64 {
        self.energies.get(&Self::key(a, b)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}

/// Sign applied to the bond energy in `k_off = k_on · exp(sign · ΔU)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergySign {
    /// `k_off = k_on · exp(+ΔU)`: bonds speed up dissociation.
    #[default]
    Destabilizing,
    /// `k_off = k_on · exp(−ΔU)`: bonds slow down dissociation.
    Stabilizing,
}

impl EnergySign {
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            Self::Destabilizing => 1.0,
            Self::Stabilizing => -1.0,
        }
    }
}

/// Diffusion-limited association combined with a bond-energy dependent dissociation.
///
/// `k_on = Σ 1/√size(s) / L²` over the association's reactant molecules, and the backward
/// rate of the pair is `k_on · exp(sign · ΔU)`, where `ΔU` sums the bond energies of every
/// monomer pair brought together by the association.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalRateRule {
    pub length_scale_squared: f64,
    pub sign: EnergySign,
    pub bond_energies: BondEnergyTable,
}

impl PhysicalRateRule {
    pub fn new(
        length_scale_squared: f64,
        sign: EnergySign,
        bond_energies: BondEnergyTable,
    ) -> Result<Self, RateError> {
        if !length_scale_squared.is_finite() || length_scale_squared <= 0.0 {
            return Err(RateError::InvalidParameter(format!(
                "length scale squared must be positive, got {}",
                length_scale_squared
            )));
        }
        Ok(Self {
            length_scale_squared,
            sign,
            bond_energies,
        })
    }

    pub fn association_rate(
        &self,
        network: &ReactionNetwork,
        association: &Reaction,
    ) -> Result<f64, RateError> {
        let mut diffusion_sum = 0.0;
        for composition in reactant_molecules(network, association) {
            if composition.is_empty() {
                return Err(RateError::InvalidParameter(format!(
                    "reaction '{}' involves a species without monomer units",
                    association.label
                )));
            }
            diffusion_sum += 1.0 / (composition.len() as f64).sqrt();
        }
        Ok(diffusion_sum / self.length_scale_squared)
    }

    /// Bond energy released by bringing the reactant molecules of `association` together.
    pub fn binding_energy(&self, network: &ReactionNetwork, association: &Reaction) -> f64 {
        reactant_molecules(network, association)
            .iter()
            .tuple_combinations()
            .map(|(left, right)| {
                left.iter()
                    .cartesian_product(right.iter())
                    .map(|(a, b)| self.bond_energies.get(a, b))
                    .sum::<f64>()
            })
            .sum()
    }

    pub fn pair_rates(
        &self,
        network: &ReactionNetwork,
        pair: ReversiblePair,
    ) -> Result<(f64, f64), RateError> {
        let association = network
            .reaction(pair.forward)
            .ok_or_else(|| RateError::UnpairedReaction(pair.forward.to_string()))?;
        let k_on = self.association_rate(network, association)?;
        let delta_u = self.binding_energy(network, association);
        let k_off = k_on * (self.sign.factor() * delta_u).exp();
        Ok((k_on, k_off))
    }

    /// Builds a full rate table. Every reaction must belong to a reversible pair.
    pub fn derive(&self, network: &ReactionNetwork) -> Result<RateTable, RateError> {
        let mut values: Vec<Option<f64>> = vec![None; network.reaction_count()];
        for pair in network.reversible_pairs() {
            let (k_on, k_off) = self.pair_rates(network, pair)?;
            debug!(
                forward = %network.describe(pair.forward),
                k_on,
                k_off,
                "Derived physical rates for reversible pair."
            );
            values[pair.forward.0] = Some(k_on);
            values[pair.backward.0] = Some(k_off);
        }

        let values = values
            .into_iter()
            .zip(network.reactions())
            .map(|(value, reaction)| {
                value.ok_or_else(|| RateError::UnpairedReaction(reaction.label.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        RateTable::from_values(network, values)
    }

    /// Distance of `ln(k_on / k_off)` from the value `−sign · ΔU` the rule guarantees.
    ///
    /// Returns infinity when either rate of the pair is zero.
    pub fn detailed_balance_violation(
        &self,
        network: &ReactionNetwork,
        rates: &RateTable,
        pair: ReversiblePair,
    ) -> f64 {
        let k_on = rates.get(pair.forward);
        let k_off = rates.get(pair.backward);
        if k_on <= 0.0 || k_off <= 0.0 {
            return f64::INFINITY;
        }
        let Some(association) = network.reaction(pair.forward) else {
            return f64::INFINITY;
        };
        let expected = -self.sign.factor() * self.binding_energy(network, association);
        ((k_on / k_off).ln() - expected).abs()
    }
}

/// Compositions of every reactant molecule, repeated by stoichiometric coefficient.
fn reactant_molecules<'a>(network: &'a ReactionNetwork, reaction: &Reaction) -> Vec<&'a [String]> {
    let catalog = network.catalog();
    reaction
        .reactants()
        .iter()
        .flat_map(|term| {
            let composition = catalog
                .get(term.species)
                .map(|s| s.composition())
                .unwrap_or(&[]);
            std::iter::repeat_n(composition, term.coefficient as usize)
        })
        .collect()
}
