//! Error types for assignment state operations

use crate::assignment::types::{BidId, ResourceId, TaskId};
use thiserror::Error;

/// Errors raised by the assignment state.
///
/// Every variant except the loader-facing ones signals a caller bug: the
/// driver asked for a transition the primal-dual invariants forbid. The state
/// is left untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown bid: {0}")]
    UnknownBid(BidId),
    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),
    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),
    #[error(
        "Cannot match loose bid {bid} (resource potential = {resource_potential}, task potential = {task_potential}, slack = {slack})"
    )]
    LooseBid {
        bid: BidId,
        resource_potential: f64,
        task_potential: f64,
        slack: f64,
    },
    #[error("Resource {resource} already matched by bid {bid}")]
    ResourceAlreadyMatched { resource: ResourceId, bid: BidId },
    #[error("Task {task} already matched by bid {bid}")]
    TaskAlreadyMatched { task: TaskId, bid: BidId },
    #[error("Potential increment must be positive and finite, got {delta}")]
    NonPositiveIncrement { delta: f64 },
    #[error("Duplicate bid for resource {resource} and task {task}")]
    DuplicateBid { resource: ResourceId, task: TaskId },
    #[error("Invalid cost {cost} for bid {bid}")]
    InvalidCost { bid: BidId, cost: f64 },
    #[error("Reachable sets are stale; call visit_from_free_tasks first")]
    StaleReachability,
    #[error("Unknown name: {0}")]
    UnknownName(String),
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// A specialized Result type for assignment operations
pub type Result<T> = std::result::Result<T, Error>;
