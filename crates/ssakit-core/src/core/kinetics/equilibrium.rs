use super::KineticsError;
use super::mean_field::MeanFieldSystem;
use crate::core::models::network::{ReactionNetwork, ReversiblePair};
use nalgebra::DVector;

/// Forward and backward mass-action fluxes of one reversible pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairBalance {
    pub pair: ReversiblePair,
    pub forward_flux: f64,
    pub backward_flux: f64,
}

impl PairBalance {
    #[inline]
    pub fn net_flux(&self) -> f64 {
        self.forward_flux - self.backward_flux
    }

    /// `|J⁺ − J⁻| / max(J⁺, J⁻)`, zero when both fluxes vanish.
    pub fn relative_imbalance(&self) -> f64 {
        let scale = self.forward_flux.abs().max(self.backward_flux.abs());
        if scale == 0.0 {
            0.0
        } else {
            self.net_flux().abs() / scale
        }
    }
}

/// Evaluates every reversible pair of `network` at the mean-field state `y`.
pub fn detailed_balance_report(
    network: &ReactionNetwork,
    system: &MeanFieldSystem,
    y: &DVector<f64>,
) -> Result<Vec<PairBalance>, KineticsError> {
    system.check_dimension(y)?;
    let fluxes = system.fluxes(y);
    Ok(network
        .reversible_pairs()
        .into_iter()
        .map(|pair| PairBalance {
            pair,
            forward_flux: fluxes[pair.forward.0],
            backward_flux: fluxes[pair.backward.0],
        })
        .collect())
}

fn check_binding_parameters(values: &[(&str, f64)]) -> Result<(), KineticsError> {
    for &(name, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(KineticsError::InvalidParameter(format!(
                "{} must be finite and non-negative, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

/// Equilibrium complex amount of `A + B ⇌ AB` for totals `A_T = A + AB`, `B_T = B + AB`.
///
/// Returns the root of `k_on (A_T − x)(B_T − x) = k_off x` lying in `[0, min(A_T, B_T)]`.
pub fn reversible_binding_equilibrium(
    a_total: f64,
    b_total: f64,
    k_on: f64,
    k_off: f64,
) -> Result<f64, KineticsError> {
    check_binding_parameters(&[
        ("A total", a_total),
        ("B total", b_total),
        ("k_on", k_on),
        ("k_off", k_off),
    ])?;
    if k_on == 0.0 {
        return Ok(0.0);
    }
    let s = a_total + b_total + k_off / k_on;
    let product = a_total * b_total;
    if product == 0.0 {
        return Ok(0.0);
    }
    let discriminant = (s * s - 4.0 * product).max(0.0);
    // Smaller root, written to avoid cancellation.
    Ok(2.0 * product / (s + discriminant.sqrt()))
}

/// Closed-form mean-field amount of `AB` at time `t` starting from `(a0, b0, ab0)`.
pub fn reversible_binding_trajectory(
    a0: f64,
    b0: f64,
    ab0: f64,
    k_on: f64,
    k_off: f64,
    t: f64,
) -> Result<f64, KineticsError> {
    check_binding_parameters(&[
        ("A", a0),
        ("B", b0),
        ("AB", ab0),
        ("k_on", k_on),
        ("k_off", k_off),
        ("t", t),
    ])?;
    if k_on == 0.0 {
        return Ok(ab0 * (-k_off * t).exp());
    }

    let a_total = a0 + ab0;
    let b_total = b0 + ab0;
    let s = a_total + b_total + k_off / k_on;
    let discriminant = (s * s - 4.0 * a_total * b_total).max(0.0).sqrt();
    let r1 = (s - discriminant) / 2.0;
    let r2 = (s + discriminant) / 2.0;

    if (ab0 - r1).abs() <= f64::EPSILON * s.max(1.0) {
        return Ok(r1);
    }
    if discriminant <= f64::EPSILON * s.max(1.0) {
        // Double root: dx/dt = k_on (x − r)².
        return Ok(r1 - 1.0 / (k_on * t + 1.0 / (r1 - ab0)));
    }

    let k = (ab0 - r1) / (ab0 - r2);
    let growth = k * (k_on * (r1 - r2) * t).exp();
    Ok((r1 - r2 * growth) / (1.0 - growth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::network::NetworkBuilder;
    use crate::core::rates::table::RateTable;

    #[test]
    fn scenario_equilibrium_is_smaller_quadratic_root() {
        let x = reversible_binding_equilibrium(70.0, 50.0, 0.05, 0.15).unwrap();
        let expected = (123.0 - (123.0f64 * 123.0 - 4.0 * 3500.0).sqrt()) / 2.0;
        assert!((x - expected).abs() < 1e-9);
        assert!((x - 44.70).abs() < 0.01);
        assert!(x <= 50.0);
    }

    #[test]
    fn equilibrium_edge_cases() {
        assert_eq!(reversible_binding_equilibrium(0.0, 50.0, 1.0, 1.0).unwrap(), 0.0);
        assert_eq!(reversible_binding_equilibrium(10.0, 5.0, 0.0, 1.0).unwrap(), 0.0);
        let irreversible = reversible_binding_equilibrium(10.0, 5.0, 1.0, 0.0).unwrap();
        assert!((irreversible - 5.0).abs() < 1e-9);
        assert!(reversible_binding_equilibrium(-1.0, 5.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn trajectory_starts_at_initial_value_and_approaches_equilibrium() {
        let start = reversible_binding_trajectory(50.0, 30.0, 20.0, 0.05, 0.15, 0.0).unwrap();
        assert!((start - 20.0).abs() < 1e-9);

        let late = reversible_binding_trajectory(50.0, 30.0, 20.0, 0.05, 0.15, 100.0).unwrap();
        let equilibrium = reversible_binding_equilibrium(70.0, 50.0, 0.05, 0.15).unwrap();
        assert!((late - equilibrium).abs() < 1e-9);
    }

    #[test]
    fn trajectory_without_association_decays() {
        let ab = reversible_binding_trajectory(0.0, 0.0, 10.0, 0.0, 0.5, 2.0).unwrap();
        assert!((ab - 10.0 * (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn report_lists_fluxes_of_each_pair() {
        let network = NetworkBuilder::new()
            .species("A")
            .species("B")
            .species("AB")
            .reaction(&[("A", 1), ("B", 1)], &[("AB", 1)], "k_on")
            .reaction(&[("AB", 1)], &[("A", 1), ("B", 1)], "k_off")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![0.5, 2.0]).unwrap();
        let system = MeanFieldSystem::new(&network, &rates).unwrap();

        let report =
            detailed_balance_report(&network, &system, &DVector::from_vec(vec![2.0, 2.0, 1.0]))
                .unwrap();
        assert_eq!(report.len(), 1);
        assert!((report[0].forward_flux - 2.0).abs() < 1e-12);
        assert!((report[0].backward_flux - 2.0).abs() < 1e-12);
        assert_eq!(report[0].relative_imbalance(), 0.0);
    }
}
