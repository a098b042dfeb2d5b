use crate::core::builders::cluster::{BuilderError, ClusterNetworkBuilder};
use crate::core::models::ModelError;
use crate::core::models::network::{NetworkBuilder, ReactionNetwork};
use crate::core::rates::RateError;
use crate::core::rates::physical::{BondEnergyTable, EnergySign, PhysicalRateRule};
use crate::core::rates::table::RateTable;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NetworkLoadError {
    #[error("Failed to read network file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse network file '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Network file '{path}' is incomplete: {reason}")]
    Layout { path: PathBuf, reason: String },

    #[error("Invalid network in '{path}': {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("Invalid cluster definition in '{path}': {source}")]
    Builder {
        path: PathBuf,
        #[source]
        source: BuilderError,
    },

    #[error("Invalid rates in '{path}': {source}")]
    Rate {
        path: PathBuf,
        #[source]
        source: RateError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpeciesEntry {
    Name(String),
    Detailed {
        name: String,
        composition: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReactionEntry {
    #[serde(default)]
    pub reactants: BTreeMap<String, u32>,
    #[serde(default)]
    pub products: BTreeMap<String, u32>,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BondEnergyEntry {
    pub pair: (String, String),
    pub energy: f64,
}

fn default_length_scale_squared() -> f64 {
    1.0
}

fn default_bond_energy() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum ClusterRates {
    Physical {
        #[serde(default = "default_length_scale_squared")]
        length_scale_squared: f64,
        #[serde(default)]
        sign: EnergySign,
        /// Energy of every declared bond not listed in `bond_energies`.
        #[serde(default = "default_bond_energy")]
        default_bond_energy: f64,
        #[serde(default)]
        bond_energies: Vec<BondEnergyEntry>,
    },
    Uniform {
        forward: f64,
        backward: f64,
    },
    Named {
        values: HashMap<String, f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClusterSection {
    pub monomers: Vec<String>,
    pub bonds: Vec<(String, String)>,
    pub max_size: Option<usize>,
    #[serde(default)]
    pub forward_only: bool,
    pub rates: ClusterRates,
}

/// On-disk description of a reaction network and its rate constants.
///
/// Either `species` + `reactions` + `rates` (explicit form) or a `[cluster]` section
/// must be present, never both.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkFile {
    #[serde(default)]
    pub species: Vec<SpeciesEntry>,
    #[serde(default)]
    pub reactions: Vec<ReactionEntry>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
    pub cluster: Option<ClusterSection>,
}

impl NetworkFile {
    pub fn load(path: &Path) -> Result<(ReactionNetwork, RateTable), NetworkLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| NetworkLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: NetworkFile = toml::from_str(&content).map_err(|e| NetworkLoadError::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;
        let (network, rates) = file.resolve(path)?;
        info!(
            path = %path.display(),
            species = network.species_count(),
            reactions = network.reaction_count(),
            "Loaded reaction network."
        );
        Ok((network, rates))
    }

    /// Builds the network and rate table; `path` is only used for error reporting.
    pub fn resolve(self, path: &Path) -> Result<(ReactionNetwork, RateTable), NetworkLoadError> {
        let explicit = !self.species.is_empty() || !self.reactions.is_empty();
        match self.cluster {
            Some(_) if explicit || !self.rates.is_empty() => Err(NetworkLoadError::Layout {
                path: path.to_path_buf(),
                reason: "a [cluster] section cannot be combined with explicit species, reactions or rates"
                    .to_string(),
            }),
            Some(cluster) => resolve_cluster(cluster, path),
            None => resolve_explicit(self.species, self.reactions, &self.rates, path),
        }
    }
}

fn resolve_explicit(
    species: Vec<SpeciesEntry>,
    reactions: Vec<ReactionEntry>,
    rates: &HashMap<String, f64>,
    path: &Path,
) -> Result<(ReactionNetwork, RateTable), NetworkLoadError> {
    let mut builder = NetworkBuilder::new();
    for entry in species {
        builder = match entry {
            SpeciesEntry::Name(name) => builder.species(&name),
            SpeciesEntry::Detailed { name, composition } => {
                builder.species_with_composition(&name, composition)
            }
        };
    }
    for entry in &reactions {
        let reactants: Vec<(&str, u32)> = entry
            .reactants
            .iter()
            .map(|(name, &n)| (name.as_str(), n))
            .collect();
        let products: Vec<(&str, u32)> = entry
            .products
            .iter()
            .map(|(name, &n)| (name.as_str(), n))
            .collect();
        builder = builder.reaction(&reactants, &products, &entry.rate);
    }

    let network = builder.build().map_err(|e| NetworkLoadError::Model {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rates = RateTable::from_named(&network, rates).map_err(|e| NetworkLoadError::Rate {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok((network, rates))
}

fn resolve_cluster(
    cluster: ClusterSection,
    path: &Path,
) -> Result<(ReactionNetwork, RateTable), NetworkLoadError> {
    let mut builder = ClusterNetworkBuilder::new()
        .monomers(&cluster.monomers)
        .forward_only(cluster.forward_only);
    for (a, b) in &cluster.bonds {
        builder = builder.bond(a, b);
    }
    if let Some(max_size) = cluster.max_size {
        builder = builder.max_cluster_size(max_size);
    }
    let network = builder.build().map_err(|e| NetworkLoadError::Builder {
        path: path.to_path_buf(),
        source: e,
    })?;

    let rate_error = |e: RateError| NetworkLoadError::Rate {
        path: path.to_path_buf(),
        source: e,
    };
    let rates = match cluster.rates {
        ClusterRates::Physical {
            length_scale_squared,
            sign,
            default_bond_energy,
            bond_energies,
        } => {
            let mut table = BondEnergyTable::new();
            for (a, b) in &cluster.bonds {
                table.insert(a, b, default_bond_energy);
            }
            for entry in &bond_energies {
                table.insert(&entry.pair.0, &entry.pair.1, entry.energy);
            }
            PhysicalRateRule::new(length_scale_squared, sign, table)
                .and_then(|rule| rule.derive(&network))
                .map_err(rate_error)?
        }
        ClusterRates::Uniform { forward, backward } => {
            RateTable::uniform(&network, forward, backward).map_err(rate_error)?
        }
        ClusterRates::Named { values } => {
            RateTable::from_named(&network, &values).map_err(rate_error)?
        }
    };
    Ok((network, rates))
}
