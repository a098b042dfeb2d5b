use super::error::EngineError;
use crate::core::models::network::ReactionNetwork;
use crate::core::models::reaction::Reaction;
use crate::core::models::state::State;
use crate::core::rates::table::RateTable;

/// `n (n − 1) ⋯ (n − k + 1)`: the number of ordered ways to pick `k` molecules out of `n`.
#[inline]
pub fn falling_factorial(value: u64, count: u32) -> f64 {
    match count {
        0 => 1.0,
        1 => value as f64,
        _ if value < count as u64 => 0.0,
        2 => value as f64 * (value - 1) as f64,
        _ => (0..count as u64).fold(1.0, |acc, i| acc * (value - i) as f64),
    }
}

/// Combinatorial mass-action propensity of one reaction at `counts`.
///
/// Exactly zero whenever some reactant is present in fewer copies than its coefficient,
/// and equal to `rate` for a reaction without reactants.
#[inline]
pub fn reaction_propensity(reaction: &Reaction, rate: f64, counts: &[u64]) -> f64 {
    let mut propensity = rate;
    for term in reaction.reactants() {
        let available = counts[term.species.0];
        if available < term.coefficient as u64 {
            return 0.0;
        }
        propensity *= falling_factorial(available, term.coefficient);
    }
    propensity
}

/// Evaluates all propensities of a network against a fixed rate table.
#[derive(Debug, Clone, Copy)]
pub struct PropensityEvaluator<'a> {
    network: &'a ReactionNetwork,
    rates: &'a RateTable,
}

impl<'a> PropensityEvaluator<'a> {
    pub fn new(network: &'a ReactionNetwork, rates: &'a RateTable) -> Result<Self, EngineError> {
        if rates.len() != network.reaction_count() {
            return Err(EngineError::InvalidInput(format!(
                "rate table has {} entries but the network has {} reactions",
                rates.len(),
                network.reaction_count()
            )));
        }
        Ok(Self { network, rates })
    }

    #[inline]
    pub fn network(&self) -> &'a ReactionNetwork {
        self.network
    }

    #[inline]
    pub fn rates(&self) -> &'a RateTable {
        self.rates
    }

    /// Writes every propensity into `out` (one slot per reaction) and returns their sum `a0`.
    pub fn evaluate(&self, state: &State, out: &mut [f64]) -> f64 {
        let counts = state.counts();
        let mut total = 0.0;
        for ((slot, reaction), &rate) in out
            .iter_mut()
            .zip(self.network.reactions())
            .zip(self.rates.as_slice())
        {
            *slot = reaction_propensity(reaction, rate, counts);
            total += *slot;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::network::NetworkBuilder;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn falling_factorial_values() {
        assert_eq!(falling_factorial(5, 0), 1.0);
        assert_eq!(falling_factorial(5, 1), 5.0);
        assert_eq!(falling_factorial(5, 2), 20.0);
        assert_eq!(falling_factorial(5, 3), 60.0);
        assert_eq!(falling_factorial(1, 2), 0.0);
        assert_eq!(falling_factorial(0, 1), 0.0);
    }

    #[test]
    fn falling_factorial_stays_exact_for_counts_beyond_u32() {
        let n: u64 = 5_000_000_000;
        assert_eq!(falling_factorial(n, 2), n as f64 * (n - 1) as f64);
        let huge = u64::MAX;
        assert_eq!(falling_factorial(huge, 2), huge as f64 * (huge - 1) as f64);
        assert!(falling_factorial(huge, 3).is_finite());
    }

    fn mixed_network() -> (ReactionNetwork, RateTable) {
        let none: &[(&str, u32)] = &[];
        let network = NetworkBuilder::new()
            .species("A")
            .species("B")
            .species("AB")
            .species("AA")
            .reaction(&[("A", 1), ("B", 1)], &[("AB", 1)], "k_on")
            .reaction(&[("AB", 1)], &[("A", 1), ("B", 1)], "k_off")
            .reaction(&[("A", 2)], &[("AA", 1)], "k_dim")
            .reaction(none, &[("A", 1)], "k_in")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![0.5, 2.0, 0.1, 3.0]).unwrap();
        (network, rates)
    }

    #[test]
    fn evaluate_follows_mass_action_combinatorics() {
        let (network, rates) = mixed_network();
        let evaluator = PropensityEvaluator::new(&network, &rates).unwrap();
        let state = State::new(vec![4, 3, 2, 0]);
        let mut out = vec![0.0; 4];
        let a0 = evaluator.evaluate(&state, &mut out);

        assert!((out[0] - 0.5 * 12.0).abs() < TOLERANCE);
        assert!((out[1] - 2.0 * 2.0).abs() < TOLERANCE);
        assert!((out[2] - 0.1 * 12.0).abs() < TOLERANCE);
        assert!((out[3] - 3.0).abs() < TOLERANCE);
        assert!((a0 - out.iter().sum::<f64>()).abs() < TOLERANCE);
    }

    #[test]
    fn insufficient_reactants_give_exactly_zero() {
        let (network, rates) = mixed_network();
        let evaluator = PropensityEvaluator::new(&network, &rates).unwrap();
        let state = State::new(vec![1, 0, 0, 0]);
        let mut out = vec![f64::NAN; 4];
        evaluator.evaluate(&state, &mut out);

        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 3.0);
    }

    #[test]
    fn zero_rate_never_fires() {
        let (network, _) = mixed_network();
        let rates = RateTable::from_values(&network, vec![0.0, 0.0, 0.0, 0.0]).unwrap();
        let evaluator = PropensityEvaluator::new(&network, &rates).unwrap();
        let mut out = vec![0.0; 4];
        assert_eq!(evaluator.evaluate(&State::new(vec![9, 9, 9, 9]), &mut out), 0.0);
    }
}
