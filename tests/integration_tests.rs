//! Integration tests for the hungarian library

use hungarian::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Three cleaners bidding on three chores.
struct Situation {
    jim: ResourceId,
    steve: ResourceId,
    alan: ResourceId,
    bathroom: TaskId,
    floors: TaskId,
    windows: TaskId,
    jim_bathroom: BidId,
}

impl Situation {
    fn new() -> Self {
        Self {
            jim: ResourceId(0),
            steve: ResourceId(1),
            alan: ResourceId(2),
            bathroom: TaskId(0),
            floors: TaskId(1),
            windows: TaskId(2),
            jim_bathroom: BidId(0),
        }
    }

    fn create_initial_state(&self) -> AssignmentState<&'static str, &'static str> {
        let costs = [
            (self.jim, self.bathroom, 1.0),
            (self.jim, self.floors, 2.0),
            (self.jim, self.windows, 3.0),
            (self.steve, self.bathroom, 3.0),
            (self.steve, self.floors, 3.0),
            (self.steve, self.windows, 3.0),
            (self.alan, self.bathroom, 3.0),
            (self.alan, self.floors, 3.0),
            (self.alan, self.windows, 2.0),
        ];
        AssignmentState::new(
            vec!["Jim", "Steve", "Alan"],
            vec!["Clean bathroom", "Sweep floors", "Wash windows"],
            costs
                .iter()
                .map(|&(resource, task, cost)| Bid::new(resource, task, cost))
                .collect(),
        )
        .unwrap()
    }

    fn create_with_one_tight_bid(&self) -> AssignmentState<&'static str, &'static str> {
        let mut state = self.create_initial_state();
        state.raise_potential(self.jim, 1.0).unwrap();
        state
    }

    fn create_with_one_match(&self) -> AssignmentState<&'static str, &'static str> {
        let mut state = self.create_with_one_tight_bid();
        state.match_bid(self.jim_bathroom).unwrap();
        state
    }
}

fn set<I: IntoIterator>(items: I) -> HashSet<I::Item>
where
    I::Item: Eq + std::hash::Hash,
{
    items.into_iter().collect()
}

#[test]
fn test_find_unassigned_resources() {
    let s = Situation::new();
    let state = s.create_with_one_match();
    assert_eq!(set(state.unassigned_resources()), set([s.steve, s.alan]));
}

#[test]
fn test_find_unassigned_tasks() {
    let s = Situation::new();
    let state = s.create_with_one_match();
    assert_eq!(set(state.unassigned_tasks()), set([s.floors, s.windows]));
}

#[test]
fn test_reachable_tasks_with_one_tight_bid() {
    let s = Situation::new();
    let mut state = s.create_with_one_tight_bid();
    state.visit_from_free_tasks();
    assert_eq!(
        set(state.reachable_tasks().iter().copied()),
        set([s.bathroom, s.floors, s.windows])
    );
}

#[test]
fn test_reachable_resources_with_one_tight_bid() {
    let s = Situation::new();
    let mut state = s.create_with_one_tight_bid();
    state.visit_from_free_tasks();
    assert_eq!(set(state.reachable_resources().iter().copied()), set([s.jim]));

    let path = state.augmenting_path().unwrap().unwrap();
    assert_eq!(path.bids(), &[s.jim_bathroom]);
}

#[test]
fn test_reachable_tasks_with_one_match() {
    let s = Situation::new();
    let mut state = s.create_with_one_match();
    state.visit_from_free_tasks();
    assert_eq!(
        set(state.reachable_tasks().iter().copied()),
        set([s.floors, s.windows])
    );
}

#[test]
fn test_reachable_resources_with_one_match() {
    let s = Situation::new();
    let mut state = s.create_with_one_match();
    state.visit_from_free_tasks();
    assert!(state.reachable_resources().is_empty());
    assert_eq!(state.augmenting_path().unwrap(), None);
    // Jim already covers half of his floors bid
    assert_eq!(state.frontier_slack().unwrap(), Some(1.0));
}

#[test]
fn test_match_free_inverse() {
    let s = Situation::new();
    let mut state = s.create_with_one_match();
    state.free_bid(s.jim_bathroom).unwrap();
    assert_eq!(state.bid_status(s.jim_bathroom).unwrap(), BidStatus::Tight);
    assert_eq!(state.unassigned_resources().count(), 3);
    assert_eq!(state.unassigned_tasks().count(), 3);

    state.match_bid(s.jim_bathroom).unwrap();
    assert_eq!(state.bid_status(s.jim_bathroom).unwrap(), BidStatus::Matched);
}

#[test]
fn test_errors_leave_state_unchanged() {
    let s = Situation::new();
    let mut state = s.create_with_one_match();
    let before = build_report(&state);

    let jim_floors = state.find_bid(s.jim, s.floors).unwrap();
    assert!(matches!(
        state.match_bid(jim_floors),
        Err(Error::LooseBid { slack, .. }) if slack == 1.0
    ));
    assert_eq!(
        state.raise_potential(s.alan, -1.0),
        Err(Error::NonPositiveIncrement { delta: -1.0 })
    );
    assert_eq!(state.match_bid(BidId(42)), Err(Error::UnknownBid(BidId(42))));

    state.raise_potential(s.steve, 3.0).unwrap();
    let steve_bathroom = state.find_bid(s.steve, s.bathroom).unwrap();
    let before_double = build_report(&state);
    assert_eq!(
        state.match_bid(steve_bathroom),
        Err(Error::TaskAlreadyMatched {
            task: s.bathroom,
            bid: s.jim_bathroom
        })
    );
    assert_eq!(build_report(&state), before_double);
    assert_ne!(before, before_double);
}

#[test]
fn test_problem_file_drives_state() {
    let problem = Problem {
        resources: vec!["Jim".into(), "Alan".into()],
        tasks: vec!["Floors".into(), "Windows".into()],
        bids: vec![
            BidRecord::new("Jim", "Floors", 2.0),
            BidRecord::new("Alan", "Windows", 2.0),
            BidRecord::new("Alan", "Floors", 3.0),
        ],
    };
    let path = std::env::temp_dir().join(format!("hungarian-it-{}.json", std::process::id()));
    save_problem(&problem, &path).unwrap();
    let loaded = load_problem(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let mut state = loaded.into_state(Config::default()).unwrap();
    state.raise_potential(TaskId(0), 2.0).unwrap();
    state.raise_potential(TaskId(1), 2.0).unwrap();
    assert_eq!(state.tight_bids().count(), 2);

    state.visit_from_free_tasks();
    while let Some(path) = state.augmenting_path().unwrap() {
        for bid in path.matched_bids() {
            state.free_bid(bid).unwrap();
        }
        for bid in path.unmatched_bids() {
            state.match_bid(bid).unwrap();
        }
        state.visit_from_free_tasks();
    }

    assert!(!state.has_unassigned_tasks());
    assert_eq!(state.matched_cost(), 4.0);
    assert_eq!(state.dual_value(), state.matched_cost());
    log_assignment_table(&state);
    log_state_summary(&state);
    log_reachable(&state);
}

#[test]
fn test_logger_init() {
    let guard = logger::init("debug", None).unwrap();
    assert!(guard.is_none());
    hungarian_info!("logger installed");
}

fn assert_invariants<R, T>(state: &AssignmentState<R, T>) {
    let loose = set(state.loose_bids());
    let tight = set(state.tight_bids());
    let matched = set(state.matched_bids());
    assert!(loose.is_disjoint(&tight));
    assert!(loose.is_disjoint(&matched));
    assert!(tight.is_disjoint(&matched));
    assert_eq!(loose.len() + tight.len() + matched.len(), state.num_bids());

    let mut resources = HashSet::new();
    let mut tasks = HashSet::new();
    for bid in &matched {
        let bid = state.bid(*bid).unwrap();
        assert!(resources.insert(bid.resource), "resource matched twice");
        assert!(tasks.insert(bid.task), "task matched twice");
    }
    assert_eq!(
        state.unassigned_resources().count() + resources.len(),
        state.num_resources()
    );
    assert_eq!(state.unassigned_tasks().count() + tasks.len(), state.num_tasks());
}

fn assert_path_alternates<R, T>(state: &AssignmentState<R, T>, path: &AugmentingPath) {
    for (position, &bid) in path.bids().iter().enumerate() {
        let expected = if position % 2 == 0 {
            BidStatus::Tight
        } else {
            BidStatus::Matched
        };
        assert_eq!(state.bid_status(bid).unwrap(), expected);
    }
    let first = state.bid(path.bids()[0]).unwrap();
    let last = state.bid(*path.bids().last().unwrap()).unwrap();
    assert_eq!(state.task_match(first.task), None);
    assert_eq!(state.resource_match(last.resource), None);
}

#[test]
fn test_random_operations_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let params = RandomProblemParams {
            resources: rng.random_range(1..6),
            tasks: rng.random_range(1..6),
            density: 0.7,
            cost_range: Some((0.0, 4.0)),
            integer_costs: true,
        };
        let problem = generate_random_problem_with(&params, &mut rng);
        let mut state = problem.into_state(Config::default()).unwrap();
        assert_invariants(&state);

        for _ in 0..200 {
            match rng.random_range(0..4) {
                0 => {
                    let delta = rng.random_range(1..3) as f64;
                    let before: HashSet<_> = state.tight_bids().chain(state.matched_bids()).collect();
                    let node: Node = if rng.random_bool(0.5) {
                        ResourceId(rng.random_range(0..params.resources as u32)).into()
                    } else {
                        TaskId(rng.random_range(0..params.tasks as u32)).into()
                    };
                    state.raise_potential(node, delta).unwrap();
                    let after: HashSet<_> = state.tight_bids().chain(state.matched_bids()).collect();
                    assert!(before.is_subset(&after), "raise loosened a bid");
                }
                1 if state.num_bids() > 0 => {
                    let bid = BidId(rng.random_range(0..state.num_bids() as u32));
                    let before = build_report(&state);
                    if state.match_bid(bid).is_err() {
                        assert_eq!(build_report(&state), before);
                    } else {
                        assert_eq!(state.bid_status(bid).unwrap(), BidStatus::Matched);
                    }
                }
                2 => {
                    let matched: Vec<_> = state.matched_bids().collect();
                    if !matched.is_empty() {
                        let bid = matched[rng.random_range(0..matched.len())];
                        state.free_bid(bid).unwrap();
                        assert_ne!(state.bid_status(bid).unwrap(), BidStatus::Matched);
                    }
                }
                _ => {
                    state.visit_from_free_tasks();
                    let reachable = set(state.reachable_tasks().iter().copied());
                    assert!(set(state.unassigned_tasks()).is_subset(&reachable));
                    if let Some(path) = state.augmenting_path().unwrap() {
                        assert_path_alternates(&state, &path);
                    }
                }
            }
            assert_invariants(&state);
        }
    }
}
