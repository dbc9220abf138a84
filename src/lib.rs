//! # hungarian - primal-dual assignment state for Rust
//!
//! hungarian holds the incremental state of a Kuhn-Munkres solve of the
//! weighted bipartite assignment problem: dual potentials for resources and
//! tasks, the partition of bids into loose, tight and matched, and the
//! alternating traversal of the tight subgraph used to find augmenting paths.
//! The optimizer loop that drives these primitives belongs to the caller.
//!
//! ## Modules
//!
//! - [`assignment`] - Assignment state, handles and traversal
//! - [`problem`] - Named problem files, random generation and state reports
//! - [`error`] - Error types and handling
//! - [`config`] - Configuration structures
//! - [`logger`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use hungarian::*;
//!
//! let mut state = AssignmentState::new(
//!     vec!["Jim", "Steve"],
//!     vec!["Bathroom", "Floors"],
//!     vec![
//!         Bid::new(ResourceId(0), TaskId(0), 1.0),
//!         Bid::new(ResourceId(1), TaskId(1), 3.0),
//!     ],
//! )
//! .unwrap();
//!
//! // Jim's bid on the bathroom becomes tight once his potential covers its cost
//! state.raise_potential(ResourceId(0), 1.0).unwrap();
//! state.visit_from_free_tasks();
//!
//! let path = state.augmenting_path().unwrap().expect("free resource reachable");
//! for bid in path.matched_bids() {
//!     state.free_bid(bid).unwrap();
//! }
//! for bid in path.unmatched_bids() {
//!     state.match_bid(bid).unwrap();
//! }
//! assert_eq!(state.unassigned_tasks().collect::<Vec<_>>(), vec![TaskId(1)]);
//! ```

pub mod assignment;
pub mod config;
pub mod error;
pub mod logger;
pub mod problem;

pub use assignment::*;
pub use config::Config;
pub use error::*;
pub use problem::*;
