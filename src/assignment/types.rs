//! Handles and value types shared by the assignment state

use serde::{Deserialize, Serialize};

/// Absolute tolerance used to decide whether a bid is tight.
pub const TIGHTNESS_TOLERANCE: f64 = 1e-14;

macro_rules! define_handle {
    ($name:ident, $prefix:literal) => {
        /// Stable arena index handed out by the assignment state.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        /// Indices come from arenas whose length the state checked against
        /// `u32::MAX` at construction.
        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize);
                Self(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_handle!(ResourceId, "R");
define_handle!(TaskId, "T");
define_handle!(BidId, "B");

/// A candidate pairing of a resource with a task at a given cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub resource: ResourceId,
    pub task: TaskId,
    pub cost: f64,
}

impl Bid {
    pub fn new(resource: ResourceId, task: TaskId, cost: f64) -> Self {
        Self {
            resource,
            task,
            cost,
        }
    }

    /// Reduced cost of the bid under the given potentials.
    pub fn slack(&self, resource_potential: f64, task_potential: f64) -> f64 {
        self.cost - resource_potential - task_potential
    }
}

/// Which of the three disjoint partitions a bid currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Loose,
    Tight,
    Matched,
}

/// Either side of the bipartite graph, used to address a potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Resource(ResourceId),
    Task(TaskId),
}

impl From<ResourceId> for Node {
    fn from(id: ResourceId) -> Self {
        Node::Resource(id)
    }
}

impl From<TaskId> for Node {
    fn from(id: TaskId) -> Self {
        Node::Task(id)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Resource(id) => write!(f, "{}", id),
            Node::Task(id) => write!(f, "{}", id),
        }
    }
}

/// How a vertex entered the reachable set during the last traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reached {
    /// Seeded as a free task.
    Seed,
    /// Reached through the given bid (tight for resources, matched for tasks).
    Via(BidId),
}

/// Alternating path from a free task to a free resource.
///
/// Bids alternate tight, matched, tight, ..., tight, starting at the free task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentingPath {
    bids: Vec<BidId>,
}

impl AugmentingPath {
    pub(crate) fn new(bids: Vec<BidId>) -> Self {
        Self { bids }
    }

    pub fn bids(&self) -> &[BidId] {
        &self.bids
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    /// Bids currently matched along the path; free these first.
    pub fn matched_bids(&self) -> impl Iterator<Item = BidId> + '_ {
        self.bids.iter().skip(1).step_by(2).copied()
    }

    /// Tight bids along the path; match these once the matched ones are freed.
    pub fn unmatched_bids(&self) -> impl Iterator<Item = BidId> + '_ {
        self.bids.iter().step_by(2).copied()
    }
}
