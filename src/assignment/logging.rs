use super::state::AssignmentState;
use super::types::BidStatus;
use std::fmt::Display;

#[macro_export]
macro_rules! hungarian_info {
    ($($arg:tt)+) => {
        tracing::info!(target: "hungarian", $($arg)+)
    }
}

/// Log potentials and partition sizes
pub fn log_state_summary<R, T>(state: &AssignmentState<R, T>)
where
    R: Display,
    T: Display,
{
    hungarian_info!(
        "State: {} loose, {} tight, {} matched; dual value {:.4}, matched cost {:.4}",
        state.bids_with_status(BidStatus::Loose).count(),
        state.bids_with_status(BidStatus::Tight).count(),
        state.bids_with_status(BidStatus::Matched).count(),
        state.dual_value(),
        state.matched_cost()
    );
    for (id, resource) in state.resources() {
        if let Ok(potential) = state.resource_potential(id) {
            hungarian_info!("  {} potential {:.4}", resource, potential);
        }
    }
    for (id, task) in state.tasks() {
        if let Ok(potential) = state.task_potential(id) {
            hungarian_info!("  {} potential {:.4}", task, potential);
        }
    }
}

/// Log the current task assignment table
pub fn log_assignment_table<R, T>(state: &AssignmentState<R, T>)
where
    R: Display,
    T: Display,
{
    hungarian_info!("Task Assignment Table:");
    for (id, task) in state.tasks() {
        let assigned = state
            .task_match(id)
            .and_then(|bid| state.bid(bid).ok())
            .and_then(|bid| state.resource(bid.resource).ok());
        match assigned {
            Some(resource) => hungarian_info!("{}: {}", task, resource),
            None => hungarian_info!("{}: None", task),
        }
    }
}

/// Log the sets reached by the last traversal
pub fn log_reachable<R, T>(state: &AssignmentState<R, T>)
where
    R: Display,
    T: Display,
{
    let names = |parts: Vec<String>| parts.join(", ");
    let tasks: Vec<String> = state
        .reachable_tasks()
        .iter()
        .filter_map(|&id| state.task(id).ok())
        .map(|t| t.to_string())
        .collect();
    let resources: Vec<String> = state
        .reachable_resources()
        .iter()
        .filter_map(|&id| state.resource(id).ok())
        .map(|r| r.to_string())
        .collect();
    hungarian_info!(
        "Reachable tasks: [{}]; reachable resources: [{}]{}",
        names(tasks),
        names(resources),
        if state.is_stale() { " (stale)" } else { "" }
    );
}
