use super::RateError;
use crate::core::models::ids::ReactionId;
use crate::core::models::network::ReactionNetwork;
use std::collections::HashMap;
use std::ops::Index;

/// Rate constants stored densely in reaction order.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    values: Vec<f64>,
}

impl RateTable {
    /// Resolves every reaction's rate key against `named`.
    ///
    /// Keys present in `named` but unused by the network are ignored.
    pub fn from_named(
        network: &ReactionNetwork,
        named: &HashMap<String, f64>,
    ) -> Result<Self, RateError> {
        let values = network
            .reactions()
            .iter()
            .map(|reaction| {
                named
                    .get(reaction.rate_key())
                    .copied()
                    .ok_or_else(|| RateError::MissingRate {
                        key: reaction.rate_key().to_string(),
                        reaction: reaction.label.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_values(network, values)
    }

    pub fn from_values(network: &ReactionNetwork, values: Vec<f64>) -> Result<Self, RateError> {
        if values.len() != network.reaction_count() {
            return Err(RateError::LengthMismatch {
                expected: network.reaction_count(),
                actual: values.len(),
            });
        }
        for (reaction, &value) in network.reactions().iter().zip(&values) {
            if !value.is_finite() || value < 0.0 {
                return Err(RateError::InvalidRate {
                    reaction: reaction.label.clone(),
                    value,
                });
            }
        }
        Ok(Self { values })
    }

    /// Assigns `forward` to every association and `backward` to every dissociation.
    ///
    /// Reactions that belong to no reversible pair are treated as forward reactions, which
    /// is what an all-forward cluster network needs.
    pub fn uniform(
        network: &ReactionNetwork,
        forward: f64,
        backward: f64,
    ) -> Result<Self, RateError> {
        let mut values = vec![forward; network.reaction_count()];
        for pair in network.reversible_pairs() {
            values[pair.backward.0] = backward;
        }
        Self::from_values(network, values)
    }

    #[inline]
    pub fn get(&self, id: ReactionId) -> f64 {
        self.values[id.0]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<ReactionId> for RateTable {
    type Output = f64;

    fn index(&self, id: ReactionId) -> &f64 {
        &self.values[id.0]
    }
}
