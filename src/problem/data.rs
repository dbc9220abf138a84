use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use rand::Rng;
use anyhow::{Result, Context};
use crate::assignment::state::AssignmentState;
use crate::assignment::types::{Bid, ResourceId, TaskId};
use crate::config::Config;
use crate::error::Error;

/// One candidate pairing, addressed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub resource: String,
    pub task: String,
    pub cost: f64,
}

impl BidRecord {
    pub fn new(resource: impl Into<String>, task: impl Into<String>, cost: f64) -> Self {
        Self {
            resource: resource.into(),
            task: task.into(),
            cost,
        }
    }
}

/// Assignment problem keyed by resource and task names.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub resources: Vec<String>,
    pub tasks: Vec<String>,
    pub bids: Vec<BidRecord>,
}

impl Problem {
    /// Resolve names to handles and build the initial state.
    pub fn into_state(self, config: Config) -> crate::error::Result<AssignmentState<String, String>> {
        let bids = {
            let resource_ids = index_names(&self.resources, ResourceId::from)?;
            let task_ids = index_names(&self.tasks, TaskId::from)?;
            self.bids
                .iter()
                .map(|record| -> crate::error::Result<Bid> {
                    let resource = *resource_ids
                        .get(record.resource.as_str())
                        .ok_or_else(|| Error::UnknownName(record.resource.clone()))?;
                    let task = *task_ids
                        .get(record.task.as_str())
                        .ok_or_else(|| Error::UnknownName(record.task.clone()))?;
                    Ok(Bid::new(resource, task, record.cost))
                })
                .collect::<crate::error::Result<Vec<_>>>()?
        };

        AssignmentState::with_config(self.resources, self.tasks, bids, config)
    }
}

fn index_names<I>(names: &[String], id: impl Fn(usize) -> I) -> crate::error::Result<HashMap<&str, I>> {
    let mut ids = HashMap::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if ids.insert(name.as_str(), id(index)).is_some() {
            return Err(Error::DuplicateName(name.clone()));
        }
    }
    Ok(ids)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomProblemParams {
    pub resources: usize,
    pub tasks: usize,
    /// Probability that a given (resource, task) pair carries a bid
    pub density: f64,
    pub cost_range: Option<(f64, f64)>,
    /// Round costs to whole numbers so ties and exact tightness are common
    #[serde(default)]
    pub integer_costs: bool,
}

impl Default for RandomProblemParams {
    fn default() -> Self {
        Self {
            resources: 5,
            tasks: 5,
            density: 1.0,
            cost_range: None,
            integer_costs: true,
        }
    }
}

pub fn generate_random_problem(params: &RandomProblemParams) -> Problem {
    generate_random_problem_with(params, &mut rand::rng())
}

pub fn generate_random_problem_with<G: Rng + ?Sized>(params: &RandomProblemParams, rng: &mut G) -> Problem {
    let (min_cost, max_cost) = params.cost_range.unwrap_or((0.0, 10.0));
    let density = params.density.clamp(0.0, 1.0);

    let resources: Vec<String> = (1..=params.resources).map(|i| format!("R{}", i)).collect();
    let tasks: Vec<String> = (1..=params.tasks).map(|i| format!("T{}", i)).collect();

    let mut bids = Vec::new();
    for resource in &resources {
        for task in &tasks {
            if !rng.random_bool(density) {
                continue;
            }
            let cost = if max_cost > min_cost {
                rng.random_range(min_cost..max_cost)
            } else {
                min_cost
            };
            let cost = if params.integer_costs { cost.round() } else { cost };
            bids.push(BidRecord::new(resource.clone(), task.clone(), cost));
        }
    }

    Problem {
        resources,
        tasks,
        bids,
    }
}

pub fn load_problem(path: &Path) -> Result<Problem> {
    let json = fs::read_to_string(path).context("Failed to read problem file")?;
    let problem: Problem = serde_json::from_str(&json).context("Failed to parse problem json")?;
    Ok(problem)
}

pub fn save_problem(problem: &Problem, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(problem).context("Failed to serialize problem")?;
    fs::write(path, json).context("Failed to write problem file")?;
    Ok(())
}
