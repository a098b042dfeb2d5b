use super::KineticsError;
use super::mean_field::MeanFieldSystem;
use nalgebra::DVector;
use tracing::{debug, instrument};

/// Sampled solution of an initial value problem.
#[derive(Debug, Clone, PartialEq)]
pub struct OdeSolution {
    pub times: Vec<f64>,
    pub states: Vec<DVector<f64>>,
}

impl OdeSolution {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    pub fn species_series(&self, species: usize) -> Vec<f64> {
        self.states.iter().map(|y| y[species]).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SteadyState {
    pub state: DVector<f64>,
    pub time: f64,
    pub residual: f64,
}

/// Classical fixed-step fourth-order Runge–Kutta integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rk4Integrator {
    dt: f64,
}

impl Rk4Integrator {
    pub fn new(dt: f64) -> Result<Self, KineticsError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(KineticsError::InvalidParameter(format!(
                "step size must be positive, got {}",
                dt
            )));
        }
        Ok(Self { dt })
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn step(&self, system: &MeanFieldSystem, y: &DVector<f64>, h: f64) -> DVector<f64> {
        let k1 = system.derivative(y);
        let k2 = system.derivative(&(y + 0.5 * h * &k1));
        let k3 = system.derivative(&(y + 0.5 * h * &k2));
        let k4 = system.derivative(&(y + h * &k3));
        y + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
    }

    /// Integrates from `t = 0` to `t_end`, reporting `output_points` evenly spaced samples
    /// (both ends included). Steps between samples never exceed the configured step size.
    #[instrument(skip_all, name = "ode_integration")]
    pub fn integrate(
        &self,
        system: &MeanFieldSystem,
        y0: DVector<f64>,
        t_end: f64,
        output_points: usize,
    ) -> Result<OdeSolution, KineticsError> {
        system.check_dimension(&y0)?;
        if !t_end.is_finite() || t_end <= 0.0 {
            return Err(KineticsError::InvalidParameter(format!(
                "end time must be positive, got {}",
                t_end
            )));
        }
        if output_points < 2 {
            return Err(KineticsError::InvalidParameter(format!(
                "at least two output points are required, got {}",
                output_points
            )));
        }

        let interval = t_end / (output_points - 1) as f64;
        let substeps = (interval / self.dt).ceil().max(1.0) as usize;
        let h = interval / substeps as f64;

        let mut times = Vec::with_capacity(output_points);
        let mut states = Vec::with_capacity(output_points);
        let mut y = y0;
        times.push(0.0);
        states.push(y.clone());

        for k in 1..output_points {
            for _ in 0..substeps {
                y = self.step(system, &y, h);
            }
            times.push(interval * k as f64);
            states.push(y.clone());
        }

        debug!(
            t_end,
            output_points,
            substeps,
            step = h,
            "ODE integration complete."
        );
        Ok(OdeSolution { times, states })
    }

    /// Steps forward until `‖dy/dt‖∞ < tolerance`, giving up at `max_time`.
    #[instrument(skip_all, name = "steady_state_relaxation")]
    pub fn relax_to_steady_state(
        &self,
        system: &MeanFieldSystem,
        y0: DVector<f64>,
        tolerance: f64,
        max_time: f64,
    ) -> Result<SteadyState, KineticsError> {
        system.check_dimension(&y0)?;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(KineticsError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                tolerance
            )));
        }

        let mut y = y0;
        let mut t = 0.0;
        loop {
            let residual = system.derivative(&y).amax();
            if residual < tolerance {
                debug!(time = t, residual, "Mean-field system reached steady state.");
                return Ok(SteadyState {
                    state: y,
                    time: t,
                    residual,
                });
            }
            if t >= max_time {
                return Err(KineticsError::NotConverged {
                    time: t,
                    residual,
                    tolerance,
                });
            }
            y = self.step(system, &y, self.dt);
            t += self.dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kinetics::equilibrium::{
        reversible_binding_equilibrium, reversible_binding_trajectory,
    };
    use crate::core::models::network::{NetworkBuilder, ReactionNetwork};
    use crate::core::rates::table::RateTable;

    fn binding_system(k_on: f64, k_off: f64) -> MeanFieldSystem {
        let network: ReactionNetwork = NetworkBuilder::new()
            .species("A")
            .species("B")
            .species("AB")
            .reaction(&[("A", 1), ("B", 1)], &[("AB", 1)], "k_on")
            .reaction(&[("AB", 1)], &[("A", 1), ("B", 1)], "k_off")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![k_on, k_off]).unwrap();
        MeanFieldSystem::new(&network, &rates).unwrap()
    }

    #[test]
    fn exponential_decay_matches_analytic_solution() {
        let network = NetworkBuilder::new()
            .species("A")
            .reaction(&[("A", 1)], &[] as &[(&str, u32)], "k")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![0.5]).unwrap();
        let system = MeanFieldSystem::new(&network, &rates).unwrap();
        let solution = Rk4Integrator::new(0.01)
            .unwrap()
            .integrate(&system, DVector::from_vec(vec![100.0]), 4.0, 5)
            .unwrap();

        assert_eq!(solution.times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        for (t, y) in solution.times.iter().zip(&solution.states) {
            assert!((y[0] - 100.0 * (-0.5 * t).exp()).abs() < 1e-6);
        }
    }

    #[test]
    fn binding_integration_tracks_closed_form_solution() {
        let system = binding_system(0.05, 0.15);
        let solution = Rk4Integrator::new(0.001)
            .unwrap()
            .integrate(&system, DVector::from_vec(vec![50.0, 30.0, 20.0]), 2.0, 21)
            .unwrap();

        for (t, y) in solution.times.iter().zip(&solution.states) {
            let expected = reversible_binding_trajectory(50.0, 30.0, 20.0, 0.05, 0.15, *t).unwrap();
            assert!((y[2] - expected).abs() < 1e-6, "t = {t}: {} vs {expected}", y[2]);
            assert!((y[0] + y[2] - 70.0).abs() < 1e-9);
        }
    }

    #[test]
    fn relaxation_reaches_quadratic_equilibrium() {
        let system = binding_system(0.05, 0.15);
        let steady = Rk4Integrator::new(0.01)
            .unwrap()
            .relax_to_steady_state(&system, DVector::from_vec(vec![50.0, 30.0, 20.0]), 1e-9, 1e4)
            .unwrap();
        let expected = reversible_binding_equilibrium(70.0, 50.0, 0.05, 0.15).unwrap();
        assert!((steady.state[2] - expected).abs() < 1e-6);
    }

    #[test]
    fn relaxation_reports_non_convergence() {
        let system = binding_system(0.05, 0.15);
        let result = Rk4Integrator::new(0.01).unwrap().relax_to_steady_state(
            &system,
            DVector::from_vec(vec![50.0, 30.0, 20.0]),
            1e-9,
            0.05,
        );
        assert!(matches!(result, Err(KineticsError::NotConverged { .. })));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(Rk4Integrator::new(0.0).is_err());
        let system = binding_system(0.05, 0.15);
        let integrator = Rk4Integrator::new(0.1).unwrap();
        assert!(matches!(
            integrator.integrate(&system, DVector::from_vec(vec![1.0, 1.0, 0.0]), 1.0, 1),
            Err(KineticsError::InvalidParameter(_))
        ));
        assert!(matches!(
            integrator.integrate(&system, DVector::from_vec(vec![1.0]), 1.0, 10),
            Err(KineticsError::DimensionMismatch { .. })
        ));
    }
}
