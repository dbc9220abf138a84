use crate::assignment::state::AssignmentState;
use crate::assignment::types::{BidStatus, ResourceId, TaskId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialRecord {
    pub name: String,
    pub potential: f64,
    pub matched_with: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidReport {
    pub bid: u32,
    pub resource: String,
    pub task: String,
    pub cost: f64,
    pub slack: f64,
    pub status: BidStatus,
}

/// Snapshot of an assignment state for offline inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    pub resources: Vec<PotentialRecord>,
    pub tasks: Vec<PotentialRecord>,
    pub bids: Vec<BidReport>,
    pub matched_cost: f64,
    pub dual_value: f64,
    pub unassigned_resources: usize,
    pub unassigned_tasks: usize,
}

pub fn build_report<R, T>(state: &AssignmentState<R, T>) -> StateReport
where
    R: Display,
    T: Display,
{
    let resource_name = |id: ResourceId| {
        state
            .resource(id)
            .map(|r| r.to_string())
            .unwrap_or_else(|_| id.to_string())
    };
    let task_name = |id: TaskId| {
        state
            .task(id)
            .map(|t| t.to_string())
            .unwrap_or_else(|_| id.to_string())
    };

    let mut resources = Vec::with_capacity(state.num_resources());
    for (id, resource) in state.resources() {
        let matched_with = state
            .resource_match(id)
            .and_then(|bid| state.bid(bid).ok())
            .map(|bid| task_name(bid.task));
        resources.push(PotentialRecord {
            name: resource.to_string(),
            potential: state.resource_potential(id).unwrap_or_default(),
            matched_with,
        });
    }

    let mut tasks = Vec::with_capacity(state.num_tasks());
    for (id, task) in state.tasks() {
        let matched_with = state
            .task_match(id)
            .and_then(|bid| state.bid(bid).ok())
            .map(|bid| resource_name(bid.resource));
        tasks.push(PotentialRecord {
            name: task.to_string(),
            potential: state.task_potential(id).unwrap_or_default(),
            matched_with,
        });
    }

    let bids = state
        .bids()
        .map(|(id, bid)| BidReport {
            bid: id.0,
            resource: resource_name(bid.resource),
            task: task_name(bid.task),
            cost: bid.cost,
            slack: state.slack(id).unwrap_or_default(),
            status: state.bid_status(id).unwrap_or(BidStatus::Loose),
        })
        .collect();

    StateReport {
        resources,
        tasks,
        bids,
        matched_cost: state.matched_cost(),
        dual_value: state.dual_value(),
        unassigned_resources: state.unassigned_resources().count(),
        unassigned_tasks: state.unassigned_tasks().count(),
    }
}

pub fn write_report(report: &StateReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(file, report).context("Failed to write report json")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::types::{Bid, BidId};

    fn state() -> AssignmentState<&'static str, &'static str> {
        let mut state = AssignmentState::new(
            vec!["Jim", "Steve"],
            vec!["Bathroom", "Floors"],
            vec![
                Bid::new(ResourceId(0), TaskId(0), 1.0),
                Bid::new(ResourceId(1), TaskId(1), 3.0),
            ],
        )
        .unwrap();
        state.raise_potential(ResourceId(0), 1.0).unwrap();
        state.match_bid(BidId(0)).unwrap();
        state
    }

    #[test]
    fn test_build_report() {
        let report = build_report(&state());
        assert_eq!(report.matched_cost, 1.0);
        assert_eq!(report.dual_value, 1.0);
        assert_eq!(report.unassigned_resources, 1);
        assert_eq!(report.unassigned_tasks, 1);
        assert_eq!(
            report.resources[0],
            PotentialRecord {
                name: "Jim".into(),
                potential: 1.0,
                matched_with: Some("Bathroom".into()),
            }
        );
        assert_eq!(report.tasks[1].matched_with, None);
        assert_eq!(report.bids[0].status, BidStatus::Matched);
        assert_eq!(report.bids[1].status, BidStatus::Loose);
        assert_eq!(report.bids[1].slack, 3.0);
    }

    #[test]
    fn test_write_report() {
        let path = std::env::temp_dir().join(format!("hungarian-report-{}.json", std::process::id()));
        let report = build_report(&state());
        write_report(&report, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let parsed: StateReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(json.contains("\"status\": \"matched\""));
    }
}
