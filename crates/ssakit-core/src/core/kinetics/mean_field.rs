use super::KineticsError;
use crate::core::models::network::ReactionNetwork;
use crate::core::rates::table::RateTable;
use nalgebra::DVector;

#[derive(Debug, Clone)]
struct MassActionTerm {
    rate: f64,
    reactants: Vec<(usize, i32)>,
    delta: Vec<(usize, f64)>,
}

impl MassActionTerm {
    #[inline]
    fn flux(&self, y: &DVector<f64>) -> f64 {
        self.reactants
            .iter()
            .fold(self.rate, |acc, &(s, coefficient)| acc * y[s].powi(coefficient))
    }
}

/// Deterministic mass-action limit of a reaction network.
///
/// `dx/dt = Σ_i delta_i · k_i · Π_s x_s^{coeff_is}`, derived from the same network and
/// rate table the stochastic engine consumes.
#[derive(Debug, Clone)]
pub struct MeanFieldSystem {
    dimension: usize,
    terms: Vec<MassActionTerm>,
}

impl MeanFieldSystem {
    pub fn new(network: &ReactionNetwork, rates: &RateTable) -> Result<Self, KineticsError> {
        if rates.len() != network.reaction_count() {
            return Err(KineticsError::RateLength {
                expected: network.reaction_count(),
                actual: rates.len(),
            });
        }

        let terms = network
            .reactions()
            .iter()
            .zip(rates.as_slice())
            .map(|(reaction, &rate)| MassActionTerm {
                rate,
                reactants: reaction
                    .reactants()
                    .iter()
                    .map(|t| (t.species.0, t.coefficient as i32))
                    .collect(),
                delta: reaction
                    .delta()
                    .iter()
                    .map(|&(s, d)| (s.0, d as f64))
                    .collect(),
            })
            .collect();

        Ok(Self {
            dimension: network.species_count(),
            terms,
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn check_dimension(&self, y: &DVector<f64>) -> Result<(), KineticsError> {
        if y.len() != self.dimension {
            return Err(KineticsError::DimensionMismatch {
                expected: self.dimension,
                actual: y.len(),
            });
        }
        Ok(())
    }

    /// Mass-action flux of every reaction, in reaction order.
    pub fn fluxes(&self, y: &DVector<f64>) -> Vec<f64> {
        self.terms.iter().map(|term| term.flux(y)).collect()
    }

    pub fn derivative(&self, y: &DVector<f64>) -> DVector<f64> {
        let mut dy = DVector::zeros(self.dimension);
        for term in &self.terms {
            let flux = term.flux(y);
            if flux == 0.0 {
                continue;
            }
            for &(s, change) in &term.delta {
                dy[s] += change * flux;
            }
        }
        dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::network::NetworkBuilder;

    const TOLERANCE: f64 = 1e-12;

    fn binding() -> (ReactionNetwork, RateTable) {
        let network = NetworkBuilder::new()
            .species("A")
            .species("B")
            .species("AB")
            .reaction(&[("A", 1), ("B", 1)], &[("AB", 1)], "k_on")
            .reaction(&[("AB", 1)], &[("A", 1), ("B", 1)], "k_off")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![0.05, 0.15]).unwrap();
        (network, rates)
    }

    #[test]
    fn binding_derivative_matches_hand_written_equations() {
        let (network, rates) = binding();
        let system = MeanFieldSystem::new(&network, &rates).unwrap();
        let y = DVector::from_vec(vec![50.0, 30.0, 20.0]);
        let dy = system.derivative(&y);

        let expected_ab = 0.05 * 50.0 * 30.0 - 0.15 * 20.0;
        assert!((dy[2] - expected_ab).abs() < TOLERANCE);
        assert!((dy[0] + expected_ab).abs() < TOLERANCE);
        assert!((dy[1] + expected_ab).abs() < TOLERANCE);
    }

    #[test]
    fn dimerisation_uses_squared_concentration() {
        let network = NetworkBuilder::new()
            .species("A")
            .species("AA")
            .reaction(&[("A", 2)], &[("AA", 1)], "k")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![0.5]).unwrap();
        let system = MeanFieldSystem::new(&network, &rates).unwrap();
        let y = DVector::from_vec(vec![4.0, 0.0]);

        assert!((system.fluxes(&y)[0] - 8.0).abs() < TOLERANCE);
        let dy = system.derivative(&y);
        assert!((dy[0] + 16.0).abs() < TOLERANCE);
        assert!((dy[1] - 8.0).abs() < TOLERANCE);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let (network, rates) = binding();
        let system = MeanFieldSystem::new(&network, &rates).unwrap();
        let y = DVector::from_vec(vec![1.0, 2.0]);
        assert_eq!(
            system.check_dimension(&y),
            Err(KineticsError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
