//! Alternating traversal of the equivalence subgraph

use super::state::AssignmentState;
use super::types::{AugmentingPath, BidId, BidStatus, Reached, ResourceId, TaskId};
use crate::error::{Error, Result};
use tracing::trace;

/// Vertices reached by the last traversal, with the bid each was reached by.
#[derive(Debug, Clone)]
pub(crate) struct Reachability {
    resource_via: Vec<Option<Reached>>,
    task_via: Vec<Option<Reached>>,
    /// Reached resources in discovery order
    resources: Vec<ResourceId>,
    /// Reached tasks in discovery order
    tasks: Vec<TaskId>,
    stale: bool,
}

impl Reachability {
    pub(crate) fn new(num_resources: usize, num_tasks: usize) -> Self {
        Self {
            resource_via: vec![None; num_resources],
            task_via: vec![None; num_tasks],
            resources: Vec::new(),
            tasks: Vec::new(),
            stale: true,
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.stale = true;
    }

    fn reset(&mut self) {
        self.resource_via.iter_mut().for_each(|v| *v = None);
        self.task_via.iter_mut().for_each(|v| *v = None);
        self.resources.clear();
        self.tasks.clear();
    }

    fn reach_task(&mut self, task: TaskId, how: Reached) -> bool {
        if self.task_via[task.index()].is_some() {
            return false;
        }
        self.task_via[task.index()] = Some(how);
        self.tasks.push(task);
        true
    }

    fn reach_resource(&mut self, resource: ResourceId, how: Reached) -> bool {
        if self.resource_via[resource.index()].is_some() {
            return false;
        }
        self.resource_via[resource.index()] = Some(how);
        self.resources.push(resource);
        true
    }
}

impl<R, T> AssignmentState<R, T> {
    /// Recompute the vertices reachable from free tasks by alternating paths.
    ///
    /// Tasks expand along tight unmatched bids, resources along their matched
    /// bid. A tight bid whose slack has since dropped out of tolerance is
    /// skipped. The expansion alternates one side at a time and stops once a
    /// round reaches no new task.
    pub fn visit_from_free_tasks(&mut self) {
        let tolerance = self.config.tolerance;
        let in_tolerance = |bid: BidId| {
            let b = &self.bids[bid.index()];
            let slack = b.slack(
                self.resource_potential[b.resource.index()],
                self.task_potential[b.task.index()],
            );
            slack.abs() < tolerance
        };
        let reach = &mut self.reach;
        reach.reset();

        let mut task_frontier: Vec<TaskId> = Vec::new();
        for (index, matched) in self.task_match.iter().enumerate() {
            let task = TaskId::from(index);
            if matched.is_none() && reach.reach_task(task, Reached::Seed) {
                task_frontier.push(task);
            }
        }

        let mut rounds = 0usize;
        while !task_frontier.is_empty() {
            rounds += 1;

            let mut resource_frontier = Vec::new();
            for task in std::mem::take(&mut task_frontier) {
                for &bid in &self.task_bids[task.index()] {
                    if self.status[bid.index()] != BidStatus::Tight || !in_tolerance(bid) {
                        continue;
                    }
                    let resource = self.bids[bid.index()].resource;
                    if reach.reach_resource(resource, Reached::Via(bid)) {
                        resource_frontier.push(resource);
                    }
                }
            }

            for resource in resource_frontier {
                let Some(bid) = self.resource_match[resource.index()] else {
                    continue;
                };
                let task = self.bids[bid.index()].task;
                if reach.reach_task(task, Reached::Via(bid)) {
                    task_frontier.push(task);
                }
            }
        }

        reach.stale = false;
        trace!(
            rounds,
            resources = reach.resources.len(),
            tasks = reach.tasks.len(),
            "visited from free tasks"
        );
    }

    /// Resources reached by the last traversal, in discovery order.
    pub fn reachable_resources(&self) -> &[ResourceId] {
        &self.reach.resources
    }

    /// Tasks reached by the last traversal, free tasks first.
    pub fn reachable_tasks(&self) -> &[TaskId] {
        &self.reach.tasks
    }

    pub fn is_resource_reachable(&self, id: ResourceId) -> bool {
        matches!(self.reach.resource_via.get(id.index()), Some(Some(_)))
    }

    pub fn is_task_reachable(&self, id: TaskId) -> bool {
        matches!(self.reach.task_via.get(id.index()), Some(Some(_)))
    }

    /// True when a mutation happened since the last traversal.
    pub fn is_stale(&self) -> bool {
        self.reach.stale
    }

    /// Shortest alternating path from a free task to the first free resource
    /// the traversal reached, or `None` when no free resource is reachable.
    pub fn augmenting_path(&self) -> Result<Option<AugmentingPath>> {
        self.ensure_fresh()?;

        let Some(&end) = self
            .reach
            .resources
            .iter()
            .find(|resource| self.resource_match[resource.index()].is_none())
        else {
            return Ok(None);
        };

        let mut bids = Vec::new();
        let mut resource = end;
        while let Some(Reached::Via(tight)) = self.reach.resource_via[resource.index()] {
            bids.push(tight);
            let task = self.bids[tight.index()].task;
            match self.reach.task_via[task.index()] {
                Some(Reached::Via(matched)) => {
                    bids.push(matched);
                    resource = self.bids[matched.index()].resource;
                }
                _ => break,
            }
        }
        bids.reverse();

        trace!(%end, len = bids.len(), "augmenting path found");
        Ok(Some(AugmentingPath::new(bids)))
    }

    /// Smallest slack among the loose bids of the reachable tasks.
    ///
    /// Every loose bid incident to a reachable task counts, whether its
    /// resource was reached or not. Raising the potential of one reachable task
    /// by this amount leaves all of that task's loose bids at non-negative
    /// slack. Its tight and matched bids lose the same amount and go negative,
    /// so the step is only safe for the tasks in
    /// [`raisable_tasks`](Self::raisable_tasks). `None` means the reachable
    /// tasks have no loose bid left.
    pub fn frontier_slack(&self) -> Result<Option<f64>> {
        self.ensure_fresh()?;

        let slack = self
            .reach
            .tasks
            .iter()
            .flat_map(|task| self.task_bids[task.index()].iter().copied())
            .filter(|bid| self.status[bid.index()] == BidStatus::Loose)
            .map(|bid| self.slack_of(bid))
            .fold(None, |min: Option<f64>, slack| {
                Some(min.map_or(slack, |m| m.min(slack)))
            });
        Ok(slack)
    }

    /// Reachable tasks whose bids are all loose, in discovery order.
    ///
    /// These are the nodes a [`frontier_slack`](Self::frontier_slack) step can
    /// be applied to without pushing any bid below zero slack.
    pub fn raisable_tasks(&self) -> Result<Vec<TaskId>> {
        self.ensure_fresh()?;

        Ok(self
            .reach
            .tasks
            .iter()
            .copied()
            .filter(|task| {
                self.task_bids[task.index()]
                    .iter()
                    .all(|bid| self.status[bid.index()] == BidStatus::Loose)
            })
            .collect())
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.reach.stale {
            return Err(Error::StaleReachability);
        }
        Ok(())
    }
}
