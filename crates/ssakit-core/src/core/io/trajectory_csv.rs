use crate::core::kinetics::integrator::OdeSolution;
use crate::engine::trajectory::{EventKind, Trajectory};
use crate::workflows::ensemble::EnsembleResult;
use std::io::Write;

/// Writes one `time,<species...>` row per record.
pub fn write_trajectory<W: Write>(trajectory: &Trajectory, writer: W) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["time".to_string()];
    header.extend(trajectory.species_names().iter().cloned());
    csv.write_record(&header)?;

    for (k, &time) in trajectory.times().iter().enumerate() {
        let mut row = vec![time.to_string()];
        row.extend(trajectory.state_at_index(k).iter().map(u64::to_string));
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the event log as `time,event,<species...>`; reactions are named by their label.
///
/// Writes only the header when the trajectory was recorded without events.
pub fn write_events<W: Write>(
    trajectory: &Trajectory,
    reaction_labels: &[String],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["time".to_string(), "event".to_string()];
    header.extend(trajectory.species_names().iter().cloned());
    csv.write_record(&header)?;

    for event in trajectory.events().unwrap_or_default() {
        let name = match event.kind {
            EventKind::Reaction(id) => reaction_labels
                .get(id.0)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            EventKind::Halt(reason) => format!("stop:{}", reason),
        };
        let mut row = vec![event.time.to_string(), name];
        row.extend(event.state.iter().map(u64::to_string));
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes `time,<s>_mean,<s>_sd,...` rows on the ensemble grid.
pub fn write_ensemble<W: Write>(result: &EnsembleResult, writer: W) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["time".to_string()];
    for name in &result.species {
        header.push(format!("{}_mean", name));
        header.push(format!("{}_sd", name));
    }
    csv.write_record(&header)?;

    for ((time, mean), sd) in result.grid.iter().zip(&result.mean).zip(&result.std_dev) {
        let mut row = vec![time.to_string()];
        for (m, s) in mean.iter().zip(sd) {
            row.push(m.to_string());
            row.push(s.to_string());
        }
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_ode<W: Write>(
    solution: &OdeSolution,
    species: &[String],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["time".to_string()];
    header.extend(species.iter().cloned());
    csv.write_record(&header)?;

    for (time, state) in solution.times.iter().zip(&solution.states) {
        let mut row = vec![time.to_string()];
        row.extend(state.iter().map(f64::to_string));
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ReactionId;
    use crate::core::models::state::State;
    use crate::engine::stepper::HaltReason;
    use crate::engine::trajectory::TrajectoryRecorder;
    use crate::workflows::ensemble::HaltCounts;
    use nalgebra::DVector;

    fn trajectory() -> Trajectory {
        let mut recorder =
            TrajectoryRecorder::new(vec!["A".into(), "AB".into()], &State::new(vec![2, 0]), true);
        let state = State::new(vec![1, 1]);
        recorder.record(0.5, &state);
        recorder.log_event(0.5, EventKind::Reaction(ReactionId(0)), &state);
        recorder.record(1.0, &state);
        recorder.log_event(1.0, EventKind::Halt(HaltReason::TimeLimit), &state);
        recorder.finish(HaltReason::TimeLimit, 1.0, 1)
    }

    #[test]
    fn trajectory_rows_follow_records() {
        let mut buffer = Vec::new();
        write_trajectory(&trajectory(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "time,A,AB\n0,2,0\n0.5,1,1\n1,1,1\n");
    }

    #[test]
    fn event_rows_name_reactions_and_stops() {
        let mut buffer = Vec::new();
        write_events(&trajectory(), &["r1_k_on".to_string()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "time,event,A,AB\n0.5,r1_k_on,1,1\n1,stop:time-limit,1,1\n"
        );
    }

    #[test]
    fn ensemble_columns_pair_mean_and_sd() {
        let result = EnsembleResult {
            species: vec!["A".into()],
            runs: 2,
            grid: vec![0.0, 1.0],
            mean: vec![vec![2.0], vec![1.5]],
            std_dev: vec![vec![0.0], vec![0.5]],
            common_horizon: 1.0,
            halt_counts: HaltCounts::default(),
            total_steps: 3,
            compositions: Vec::new(),
        };
        let mut buffer = Vec::new();
        write_ensemble(&result, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "time,A_mean,A_sd\n0,2,0\n1,1.5,0.5\n");
    }

    #[test]
    fn ode_rows_follow_solution() {
        let solution = OdeSolution {
            times: vec![0.0, 0.25],
            states: vec![DVector::from_vec(vec![1.0]), DVector::from_vec(vec![0.75])],
        };
        let mut buffer = Vec::new();
        write_ode(&solution, &["X".to_string()], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "time,X\n0,1\n0.25,0.75\n");
    }
}
