use super::ModelError;
use super::ids::{ReactionId, SpeciesId};
use super::reaction::{Reaction, StoichTerm};
use super::species::{Species, SpeciesCatalog};

/// A forward/backward reaction pair whose sides are swapped copies of each other.
///
/// `forward` is the association direction (more reactant molecules); for pairs with equal
/// molecularity it is the one declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReversiblePair {
    pub forward: ReactionId,
    pub backward: ReactionId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionNetwork {
    catalog: SpeciesCatalog,
    reactions: Vec<Reaction>,
}

impl ReactionNetwork {
    /// Assembles a network from already-resolved parts, checking that every referenced
    /// species index lies inside the catalog.
    pub fn new(catalog: SpeciesCatalog, reactions: Vec<Reaction>) -> Result<Self, ModelError> {
        if catalog.is_empty() || reactions.is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        for reaction in &reactions {
            for term in reaction.reactants().iter().chain(reaction.products()) {
                if term.species.0 >= catalog.len() {
                    return Err(ModelError::UnknownSpecies {
                        name: term.species.to_string(),
                        context: format!("reaction '{}'", reaction.label),
                    });
                }
                if term.coefficient == 0 {
                    return Err(ModelError::ZeroCoefficient {
                        reaction: reaction.label.clone(),
                        species: catalog.name(term.species).to_string(),
                    });
                }
            }
            if reaction.reactants().is_empty() && reaction.products().is_empty() {
                return Err(ModelError::EmptyReaction(reaction.label.clone()));
            }
        }
        Ok(Self { catalog, reactions })
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn reaction(&self, id: ReactionId) -> Option<&Reaction> {
        self.reactions.get(id.0)
    }

    pub fn species_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn rate_keys(&self) -> Vec<&str> {
        self.reactions.iter().map(Reaction::rate_key).collect()
    }

    /// Dense `reactions × species` stoichiometric change matrix.
    pub fn delta_matrix(&self) -> Vec<Vec<i64>> {
        self.reactions
            .iter()
            .map(|reaction| {
                let mut row = vec![0i64; self.catalog.len()];
                for &(species, change) in reaction.delta() {
                    row[species.0] = change;
                }
                row
            })
            .collect()
    }

    pub fn reversible_pairs(&self) -> Vec<ReversiblePair> {
        let mut paired = vec![false; self.reactions.len()];
        let mut pairs = Vec::new();

        for i in 0..self.reactions.len() {
            if paired[i] {
                continue;
            }
            let partner = (i + 1..self.reactions.len())
                .find(|&j| !paired[j] && self.reactions[j].is_reverse_of(&self.reactions[i]));
            if let Some(j) = partner {
                paired[i] = true;
                paired[j] = true;
                let (forward, backward) = if self.reactions[j].order() > self.reactions[i].order() {
                    (j, i)
                } else {
                    (i, j)
                };
                pairs.push(ReversiblePair {
                    forward: ReactionId(forward),
                    backward: ReactionId(backward),
                });
            }
        }
        pairs
    }

    /// Human-readable equation such as `A + B -> AB`.
    pub fn describe(&self, id: ReactionId) -> String {
        let Some(reaction) = self.reaction(id) else {
            return String::new();
        };
        let side = |terms: &[StoichTerm]| {
            if terms.is_empty() {
                return "0".to_string();
            }
            terms
                .iter()
                .map(|t| {
                    let name = self.catalog.name(t.species);
                    if t.coefficient == 1 {
                        name.to_string()
                    } else {
                        format!("{} {}", t.coefficient, name)
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        format!("{} -> {}", side(reaction.reactants()), side(reaction.products()))
    }
}

#[derive(Debug, Clone)]
struct PendingReaction {
    reactants: Vec<(String, u32)>,
    products: Vec<(String, u32)>,
    rate_key: String,
}

/// Builds a [`ReactionNetwork`] from species names, resolving and validating every
/// reference when [`NetworkBuilder::build`] is called.
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    species: Vec<Species>,
    reactions: Vec<PendingReaction>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(mut self, name: &str) -> Self {
        self.species.push(Species::new(name));
        self
    }

    pub fn species_with_composition(mut self, name: &str, composition: Vec<String>) -> Self {
        self.species.push(Species::with_composition(name, composition));
        self
    }

    pub fn reaction<S: AsRef<str>>(
        mut self,
        reactants: &[(S, u32)],
        products: &[(S, u32)],
        rate_key: &str,
    ) -> Self {
        let owned = |terms: &[(S, u32)]| {
            terms
                .iter()
                .map(|(name, n)| (name.as_ref().to_string(), *n))
                .collect()
        };
        self.reactions.push(PendingReaction {
            reactants: owned(reactants),
            products: owned(products),
            rate_key: rate_key.to_string(),
        });
        self
    }

    pub fn build(self) -> Result<ReactionNetwork, ModelError> {
        let mut catalog = SpeciesCatalog::new();
        for species in self.species {
            catalog.add(species)?;
        }

        let mut reactions = Vec::with_capacity(self.reactions.len());
        for (index, pending) in self.reactions.into_iter().enumerate() {
            let label = format!("r{}_{}", index + 1, pending.rate_key);
            let resolve = |terms: &[(String, u32)]| -> Result<Vec<StoichTerm>, ModelError> {
                terms
                    .iter()
                    .map(|(name, coefficient)| {
                        let species =
                            catalog
                                .id_of(name)
                                .ok_or_else(|| ModelError::UnknownSpecies {
                                    name: name.clone(),
                                    context: format!("reaction '{}'", label),
                                })?;
                        if *coefficient == 0 {
                            return Err(ModelError::ZeroCoefficient {
                                reaction: label.clone(),
                                species: name.clone(),
                            });
                        }
                        Ok(StoichTerm::new(species, *coefficient))
                    })
                    .collect()
            };
            let reactants = resolve(&pending.reactants)?;
            let products = resolve(&pending.products)?;
            reactions.push(Reaction::new(
                label.clone(),
                reactants,
                products,
                pending.rate_key,
            ));
        }

        ReactionNetwork::new(catalog, reactions)
    }
}

/// Looks up a species by name, reporting `context` on failure.
pub fn require_species(
    catalog: &SpeciesCatalog,
    name: &str,
    context: &str,
) -> Result<SpeciesId, ModelError> {
    catalog.id_of(name).ok_or_else(|| ModelError::UnknownSpecies {
        name: name.to_string(),
        context: context.to_string(),
    })
}
