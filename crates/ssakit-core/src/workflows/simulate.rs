use crate::core::models::network::ReactionNetwork;
use crate::core::models::state::State;
use crate::core::rates::table::RateTable;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::rng::seeded_rng;
use crate::engine::stepper::Simulator;
use crate::engine::trajectory::Trajectory;
use tracing::{info, instrument};

#[instrument(skip_all, name = "simulation_workflow")]
pub fn run(
    network: &ReactionNetwork,
    rates: &RateTable,
    initial: &State,
    config: &SimulationConfig,
) -> Result<Trajectory, EngineError> {
    info!(
        species = network.species_count(),
        reactions = network.reaction_count(),
        t_max = config.t_max,
        seed = ?config.seed,
        "Starting stochastic simulation."
    );

    let simulator = Simulator::new(network, rates, initial.clone(), seeded_rng(config.seed))?;
    let trajectory = simulator.run(config)?;

    info!(
        halt = %trajectory.halt(),
        steps = trajectory.steps(),
        final_time = trajectory.final_time(),
        "Simulation complete."
    );
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::network::NetworkBuilder;
    use crate::engine::config::SimulationConfigBuilder;
    use crate::engine::stepper::HaltReason;

    fn birth_death() -> (ReactionNetwork, RateTable) {
        let none: &[(&str, u32)] = &[];
        let network = NetworkBuilder::new()
            .species("X")
            .reaction(none, &[("X", 1)], "birth")
            .reaction(&[("X", 1)], none, "death")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![10.0, 1.0]).unwrap();
        (network, rates)
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let (network, rates) = birth_death();
        let config = SimulationConfigBuilder::new()
            .t_max(5.0)
            .seed(42)
            .build()
            .unwrap();
        let initial = State::new(vec![0]);
        let a = run(&network, &rates, &initial, &config).unwrap();
        let b = run(&network, &rates, &initial, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.halt(), HaltReason::TimeLimit);
        assert!(a.final_time() <= 5.0);
    }

    #[test]
    fn wrong_initial_length_is_rejected_before_running() {
        let (network, rates) = birth_death();
        let config = SimulationConfigBuilder::new().t_max(1.0).build().unwrap();
        let result = run(&network, &rates, &State::new(vec![0, 0]), &config);
        assert!(matches!(result, Err(EngineError::Model { .. })));
    }

    #[test]
    fn empty_system_without_inflow_halts_immediately() {
        let network = NetworkBuilder::new()
            .species("A")
            .species("B")
            .species("AB")
            .reaction(&[("A", 1), ("B", 1)], &[("AB", 1)], "k")
            .build()
            .unwrap();
        let rates = RateTable::from_values(&network, vec![1.0]).unwrap();
        let config = SimulationConfigBuilder::new().t_max(1.0).seed(1).build().unwrap();
        let trajectory = run(&network, &rates, &State::new(vec![3, 0, 0]), &config).unwrap();
        assert_eq!(trajectory.halt(), HaltReason::NoPropensity);
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.steps(), 0);
    }
}
