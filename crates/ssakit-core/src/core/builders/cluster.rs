use crate::core::models::ModelError;
use crate::core::models::ids::SpeciesId;
use crate::core::models::network::ReactionNetwork;
use crate::core::models::reaction::{Reaction, StoichTerm};
use crate::core::models::species::{Species, SpeciesCatalog};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

const MAX_MONOMERS: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("Monomer '{0}' is declared more than once")]
    DuplicateMonomer(String),

    #[error("Bond references unknown monomer '{0}'")]
    UnknownMonomer(String),

    #[error("Monomer '{0}' cannot bond to itself")]
    SelfBond(String),

    #[error("At most {MAX_MONOMERS} monomers are supported, got {0}")]
    TooManyMonomers(usize),

    #[error("Maximum cluster size must be at least 2, got {0}")]
    InvalidMaxSize(usize),

    #[error("Network construction failed: {0}")]
    Model(#[from] ModelError),
}

/// Generates the cluster-forming network of a monomer bond graph.
///
/// Species are the connected monomer subsets up to the maximum cluster size. Every way of
/// splitting a cluster into two connected parts contributes an association `X + Y -> XY`
/// immediately followed by its dissociation `XY -> X + Y` (unless the network is
/// forward-only). Rate keys are numbered `k1, k2, ...` in reaction order.
#[derive(Debug, Clone, Default)]
pub struct ClusterNetworkBuilder {
    monomers: Vec<String>,
    bonds: Vec<(String, String)>,
    max_cluster_size: Option<usize>,
    forward_only: bool,
}

impl ClusterNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-monomer square `A–B`, `A–C`, `B–D`, `C–D`: 13 species, 36 reactions.
    pub fn four_square() -> Self {
        Self::new()
            .monomers(["A", "B", "C", "D"])
            .bond("A", "B")
            .bond("A", "C")
            .bond("B", "D")
            .bond("C", "D")
    }

    pub fn monomer(mut self, label: &str) -> Self {
        self.monomers.push(label.to_string());
        self
    }

    pub fn monomers<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.monomers
            .extend(labels.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn bond(mut self, a: &str, b: &str) -> Self {
        self.bonds.push((a.to_string(), b.to_string()));
        self
    }

    pub fn max_cluster_size(mut self, size: usize) -> Self {
        self.max_cluster_size = Some(size);
        self
    }

    pub fn forward_only(mut self, forward_only: bool) -> Self {
        self.forward_only = forward_only;
        self
    }

    pub fn build(self) -> Result<ReactionNetwork, BuilderError> {
        let n = self.monomers.len();
        if n > MAX_MONOMERS {
            return Err(BuilderError::TooManyMonomers(n));
        }
        let max_size = self.max_cluster_size.unwrap_or(n);
        if max_size < 2 {
            return Err(BuilderError::InvalidMaxSize(max_size));
        }

        let mut index_of: HashMap<&str, usize> = HashMap::new();
        for (i, label) in self.monomers.iter().enumerate() {
            if index_of.insert(label.as_str(), i).is_some() {
                return Err(BuilderError::DuplicateMonomer(label.clone()));
            }
        }

        let mut adjacency = vec![0u64; n];
        for (a, b) in &self.bonds {
            let ia = *index_of
                .get(a.as_str())
                .ok_or_else(|| BuilderError::UnknownMonomer(a.clone()))?;
            let ib = *index_of
                .get(b.as_str())
                .ok_or_else(|| BuilderError::UnknownMonomer(b.clone()))?;
            if ia == ib {
                return Err(BuilderError::SelfBond(a.clone()));
            }
            adjacency[ia] |= 1 << ib;
            adjacency[ib] |= 1 << ia;
        }

        let clusters = enumerate_connected_clusters(&adjacency, max_size);
        debug!(clusters = clusters.len(), "Enumerated connected clusters.");

        let separator = if self.monomers.iter().any(|m| m.chars().count() > 1) {
            "-"
        } else {
            ""
        };
        let mut catalog = SpeciesCatalog::new();
        let mut species_of: HashMap<u64, SpeciesId> = HashMap::new();
        for &mask in &clusters {
            let composition: Vec<String> = members(mask)
                .map(|i| self.monomers[i].clone())
                .collect();
            let name = composition.join(separator);
            let id = catalog.add(Species::with_composition(&name, composition))?;
            species_of.insert(mask, id);
        }

        let mut reactions = Vec::new();
        for &product in clusters.iter().filter(|m| m.count_ones() >= 2) {
            for (left, right) in connected_splits(product, &species_of) {
                let forward_key = format!("k{}", reactions.len() + 1);
                let reactants = vec![
                    StoichTerm::new(species_of[&left], 1),
                    StoichTerm::new(species_of[&right], 1),
                ];
                let products = vec![StoichTerm::new(species_of[&product], 1)];
                reactions.push(Reaction::new(
                    format!("r{}_{}", reactions.len() + 1, forward_key),
                    reactants.clone(),
                    products.clone(),
                    forward_key,
                ));

                if !self.forward_only {
                    let backward_key = format!("k{}", reactions.len() + 1);
                    reactions.push(Reaction::new(
                        format!("r{}_{}", reactions.len() + 1, backward_key),
                        products,
                        reactants,
                        backward_key,
                    ));
                }
            }
        }

        info!(
            species = catalog.len(),
            reactions = reactions.len(),
            forward_only = self.forward_only,
            "Built cluster reaction network."
        );
        Ok(ReactionNetwork::new(catalog, reactions)?)
    }
}

fn members(mask: u64) -> impl Iterator<Item = usize> {
    (0..MAX_MONOMERS).filter(move |&i| mask & (1 << i) != 0)
}

/// Connected vertex subsets of at most `max_size` vertices, ordered by size and then by
/// their sorted member indices.
fn enumerate_connected_clusters(adjacency: &[u64], max_size: usize) -> Vec<u64> {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut frontier: Vec<u64> = (0..adjacency.len()).map(|i| 1u64 << i).collect();
    seen.extend(frontier.iter().copied());

    for _ in 1..max_size {
        let mut next = Vec::new();
        for &mask in &frontier {
            let neighbours = members(mask).fold(0u64, |acc, i| acc | adjacency[i]) & !mask;
            for v in members(neighbours) {
                let grown = mask | (1 << v);
                if seen.insert(grown) {
                    next.push(grown);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    let mut clusters: Vec<u64> = seen.into_iter().collect();
    clusters.sort_by_key(|&mask| (mask.count_ones(), members(mask).collect::<Vec<_>>()));
    clusters
}

/// Unordered splits of `product` into two connected clusters; the first part always holds
/// the lowest-indexed monomer.
fn connected_splits(product: u64, species_of: &HashMap<u64, SpeciesId>) -> Vec<(u64, u64)> {
    let lowest = product & product.wrapping_neg();
    let mut splits = Vec::new();
    let mut sub = product;
    while sub != 0 {
        let left = sub;
        let right = product & !left;
        if left & lowest != 0
            && right != 0
            && species_of.contains_key(&left)
            && species_of.contains_key(&right)
        {
            splits.push((left, right));
        }
        sub = (sub - 1) & product;
    }
    splits.sort_by_key(|&(left, right)| {
        (
            left.count_ones().min(right.count_ones()),
            members(left).collect::<Vec<_>>(),
        )
    });
    splits
}
