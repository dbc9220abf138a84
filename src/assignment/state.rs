//! Primal-dual assignment state: potentials, bid partition and matching

use super::reach::Reachability;
use super::types::{Bid, BidId, BidStatus, Node, ResourceId, TaskId};
use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Incremental state of one Kuhn-Munkres solve.
///
/// Resources and tasks are caller identities kept in an arena and addressed by
/// [`ResourceId`] / [`TaskId`]; bids are addressed by [`BidId`], their index in
/// the bid list given at construction. Every bid sits in exactly one of the
/// loose, tight or matched partitions, and a bid only becomes matched while
/// tight.
///
/// The state never runs the optimizer loop itself. A driver alternates
/// [`visit_from_free_tasks`](Self::visit_from_free_tasks), augmentation through
/// [`free_bid`](Self::free_bid) / [`match_bid`](Self::match_bid) and dual steps
/// through [`raise_potential`](Self::raise_potential) until no task is left
/// unassigned.
#[derive(Debug, Clone)]
pub struct AssignmentState<R, T> {
    pub(super) config: Config,
    pub(super) resources: Vec<R>,
    pub(super) tasks: Vec<T>,
    pub(super) bids: Vec<Bid>,
    pub(super) resource_potential: Vec<f64>,
    pub(super) task_potential: Vec<f64>,
    pub(super) status: Vec<BidStatus>,
    /// Bids currently loose, rescanned by `retighten`
    pub(super) loose: Vec<BidId>,
    pub(super) resource_match: Vec<Option<BidId>>,
    pub(super) task_match: Vec<Option<BidId>>,
    /// Bids grouped by task, in bid order
    pub(super) task_bids: Vec<Vec<BidId>>,
    pub(super) reach: Reachability,
}

impl<R, T> AssignmentState<R, T> {
    pub fn new(resources: Vec<R>, tasks: Vec<T>, bids: Vec<Bid>) -> Result<Self> {
        Self::with_config(resources, tasks, bids, Config::default())
    }

    pub fn with_config(
        resources: Vec<R>,
        tasks: Vec<T>,
        bids: Vec<Bid>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        check_handle_space("resources", resources.len())?;
        check_handle_space("tasks", tasks.len())?;
        check_handle_space("bids", bids.len())?;

        let mut task_bids = vec![Vec::new(); tasks.len()];
        let mut seen = HashSet::with_capacity(bids.len());
        for (index, bid) in bids.iter().enumerate() {
            let id = BidId::from(index);
            if bid.resource.index() >= resources.len() {
                return Err(Error::UnknownResource(bid.resource));
            }
            if bid.task.index() >= tasks.len() {
                return Err(Error::UnknownTask(bid.task));
            }
            if !bid.cost.is_finite() || (config.require_non_negative_costs && bid.cost < 0.0) {
                return Err(Error::InvalidCost {
                    bid: id,
                    cost: bid.cost,
                });
            }
            if !seen.insert((bid.resource, bid.task)) {
                return Err(Error::DuplicateBid {
                    resource: bid.resource,
                    task: bid.task,
                });
            }
            task_bids[bid.task.index()].push(id);
        }

        let mut state = Self {
            config,
            resource_potential: vec![0.0; resources.len()],
            task_potential: vec![0.0; tasks.len()],
            status: vec![BidStatus::Loose; bids.len()],
            loose: (0..bids.len()).map(BidId::from).collect(),
            resource_match: vec![None; resources.len()],
            task_match: vec![None; tasks.len()],
            reach: Reachability::new(resources.len(), tasks.len()),
            task_bids,
            resources,
            tasks,
            bids,
        };
        let tight = state.retighten();
        debug!(
            resources = state.resources.len(),
            tasks = state.tasks.len(),
            bids = state.bids.len(),
            tight = tight.len(),
            "assignment state created"
        );
        Ok(state)
    }

    /// Move every loose bid that now passes the tolerance test into the tight
    /// partition. Returns the bids that moved.
    pub fn retighten(&mut self) -> Vec<BidId> {
        let mut tightened = Vec::new();
        let mut still_loose = Vec::with_capacity(self.loose.len());
        for bid in std::mem::take(&mut self.loose) {
            if self.within_tolerance(bid) {
                self.status[bid.index()] = BidStatus::Tight;
                tightened.push(bid);
            } else {
                still_loose.push(bid);
            }
        }
        self.loose = still_loose;
        tightened
    }

    /// Commit a tight bid to the matching. Matching an already matched bid is a
    /// no-op.
    ///
    /// A bid in the tight partition whose slack has since left the tolerance
    /// band is refused like a loose one.
    pub fn match_bid(&mut self, bid: BidId) -> Result<()> {
        let status = self.bid_status(bid)?;
        if status == BidStatus::Matched {
            return Ok(());
        }
        if status == BidStatus::Loose || !self.within_tolerance(bid) {
            let Bid { resource, task, .. } = self.bids[bid.index()];
            let err = Error::LooseBid {
                bid,
                resource_potential: self.resource_potential[resource.index()],
                task_potential: self.task_potential[task.index()],
                slack: self.slack_of(bid),
            };
            warn!("{}", err);
            return Err(err);
        }

        let Bid { resource, task, .. } = self.bids[bid.index()];
        if let Some(other) = self.resource_match[resource.index()] {
            return Err(Error::ResourceAlreadyMatched {
                resource,
                bid: other,
            });
        }
        if let Some(other) = self.task_match[task.index()] {
            return Err(Error::TaskAlreadyMatched { task, bid: other });
        }

        self.status[bid.index()] = BidStatus::Matched;
        self.resource_match[resource.index()] = Some(bid);
        self.task_match[task.index()] = Some(bid);
        self.reach.invalidate();
        debug!(%bid, %resource, %task, "matched");
        Ok(())
    }

    /// Undo a match. The bid returns to the tight or loose partition depending
    /// on the current potentials. Freeing an unmatched bid is a no-op.
    pub fn free_bid(&mut self, bid: BidId) -> Result<()> {
        if self.bid_status(bid)? != BidStatus::Matched {
            return Ok(());
        }

        let Bid { resource, task, .. } = self.bids[bid.index()];
        self.resource_match[resource.index()] = None;
        self.task_match[task.index()] = None;
        if self.within_tolerance(bid) {
            self.status[bid.index()] = BidStatus::Tight;
        } else {
            self.status[bid.index()] = BidStatus::Loose;
            self.loose.push(bid);
        }
        self.reach.invalidate();
        debug!(%bid, %resource, %task, status = ?self.status[bid.index()], "freed");
        Ok(())
    }

    /// Add `delta` to the potential of a resource or task and retighten.
    ///
    /// `delta` must be positive and finite: lowering a potential could leave a
    /// tight bid with negative slack, which the partition never re-examines.
    /// Returns the bids that became tight.
    pub fn raise_potential(&mut self, node: impl Into<Node>, delta: f64) -> Result<Vec<BidId>> {
        let node = node.into();
        if !delta.is_finite() || delta <= 0.0 {
            warn!(%node, delta, "rejected non-positive potential increment");
            return Err(Error::NonPositiveIncrement { delta });
        }

        match node {
            Node::Resource(id) => {
                let potential = self
                    .resource_potential
                    .get_mut(id.index())
                    .ok_or(Error::UnknownResource(id))?;
                *potential += delta;
            }
            Node::Task(id) => {
                let potential = self
                    .task_potential
                    .get_mut(id.index())
                    .ok_or(Error::UnknownTask(id))?;
                *potential += delta;
            }
        }
        self.reach.invalidate();

        let tightened = self.retighten();
        debug!(%node, delta, tightened = tightened.len(), "raised potential");
        Ok(tightened)
    }

    pub fn unassigned_resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.resource_match
            .iter()
            .enumerate()
            .filter(|(_, matched)| matched.is_none())
            .map(|(index, _)| ResourceId::from(index))
    }

    pub fn unassigned_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.task_match
            .iter()
            .enumerate()
            .filter(|(_, matched)| matched.is_none())
            .map(|(index, _)| TaskId::from(index))
    }

    pub fn has_unassigned_tasks(&self) -> bool {
        self.task_match.iter().any(Option::is_none)
    }

    /// Partition the bid sits in. Tight bids are never moved back to loose, so
    /// a tight bid can carry negative slack after a raise; see
    /// [`is_tight`](Self::is_tight).
    pub fn bid_status(&self, bid: BidId) -> Result<BidStatus> {
        self.status
            .get(bid.index())
            .copied()
            .ok_or(Error::UnknownBid(bid))
    }

    /// Whether the slack is within tolerance under the current potentials,
    /// regardless of partition. Only such bids can be matched or traversed.
    pub fn is_tight(&self, bid: BidId) -> Result<bool> {
        self.bid(bid)?;
        Ok(self.within_tolerance(bid))
    }

    /// `cost - resource potential - task potential` under current potentials.
    pub fn slack(&self, bid: BidId) -> Result<f64> {
        self.bid(bid)?;
        Ok(self.slack_of(bid))
    }

    pub fn bid(&self, bid: BidId) -> Result<&Bid> {
        self.bids.get(bid.index()).ok_or(Error::UnknownBid(bid))
    }

    pub fn resource(&self, id: ResourceId) -> Result<&R> {
        self.resources
            .get(id.index())
            .ok_or(Error::UnknownResource(id))
    }

    pub fn task(&self, id: TaskId) -> Result<&T> {
        self.tasks.get(id.index()).ok_or(Error::UnknownTask(id))
    }

    pub fn resource_potential(&self, id: ResourceId) -> Result<f64> {
        self.resource_potential
            .get(id.index())
            .copied()
            .ok_or(Error::UnknownResource(id))
    }

    pub fn task_potential(&self, id: TaskId) -> Result<f64> {
        self.task_potential
            .get(id.index())
            .copied()
            .ok_or(Error::UnknownTask(id))
    }

    /// Bid currently matching the resource, if any.
    pub fn resource_match(&self, id: ResourceId) -> Option<BidId> {
        self.resource_match.get(id.index()).copied().flatten()
    }

    /// Bid currently matching the task, if any.
    pub fn task_match(&self, id: TaskId) -> Option<BidId> {
        self.task_match.get(id.index()).copied().flatten()
    }

    /// Look up the bid pairing a resource with a task.
    pub fn find_bid(&self, resource: ResourceId, task: TaskId) -> Option<BidId> {
        self.task_bids
            .get(task.index())?
            .iter()
            .copied()
            .find(|bid| self.bids[bid.index()].resource == resource)
    }

    pub fn bids_with_status(&self, status: BidStatus) -> impl Iterator<Item = BidId> + '_ {
        self.status
            .iter()
            .enumerate()
            .filter(move |(_, s)| **s == status)
            .map(|(index, _)| BidId::from(index))
    }

    pub fn loose_bids(&self) -> impl Iterator<Item = BidId> + '_ {
        self.bids_with_status(BidStatus::Loose)
    }

    pub fn tight_bids(&self) -> impl Iterator<Item = BidId> + '_ {
        self.bids_with_status(BidStatus::Tight)
    }

    pub fn matched_bids(&self) -> impl Iterator<Item = BidId> + '_ {
        self.bids_with_status(BidStatus::Matched)
    }

    /// Matched (resource, task) pairs, ordered by resource.
    pub fn matching(&self) -> impl Iterator<Item = (ResourceId, TaskId)> + '_ {
        self.resource_match
            .iter()
            .flatten()
            .map(|bid| {
                let bid = &self.bids[bid.index()];
                (bid.resource, bid.task)
            })
    }

    /// Total cost of the matched bids.
    pub fn matched_cost(&self) -> f64 {
        self.matched_bids()
            .map(|bid| self.bids[bid.index()].cost)
            .sum()
    }

    /// Dual objective: sum of all potentials. Equals `matched_cost` at optimum
    /// for a perfect matching.
    pub fn dual_value(&self) -> f64 {
        self.resource_potential.iter().sum::<f64>() + self.task_potential.iter().sum::<f64>()
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn num_bids(&self) -> usize {
        self.bids.len()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &R)> + '_ {
        self.resources
            .iter()
            .enumerate()
            .map(|(index, r)| (ResourceId::from(index), r))
    }

    pub fn tasks(&self) -> impl Iterator<Item = (TaskId, &T)> + '_ {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, t)| (TaskId::from(index), t))
    }

    pub fn bids(&self) -> impl Iterator<Item = (BidId, &Bid)> + '_ {
        self.bids
            .iter()
            .enumerate()
            .map(|(index, b)| (BidId::from(index), b))
    }

    // Callers guarantee `bid` is in range.
    pub(super) fn slack_of(&self, bid: BidId) -> f64 {
        let b = &self.bids[bid.index()];
        b.slack(
            self.resource_potential[b.resource.index()],
            self.task_potential[b.task.index()],
        )
    }

    fn within_tolerance(&self, bid: BidId) -> bool {
        self.slack_of(bid).abs() < self.config.tolerance
    }
}

/// Handles are `u32`, so every arena must index within that range.
fn check_handle_space(kind: &str, len: usize) -> Result<()> {
    if u32::try_from(len).is_err() {
        return Err(Error::ConfigurationError(format!(
            "too many {}: {} exceeds the {} handle limit",
            kind,
            len,
            u32::MAX
        )));
    }
    Ok(())
}
