//! # behavior-tree-runtime
//!
//! A behavior tree execution engine for game and agent AI.
//!
//!
//! ## Overview
//!
//! A tree of decision nodes is ticked once per frame.
//! Each node reports one of three outcomes: `Success`, `Failure` or `Running`.
//! `Running` is the only way for work to span multiple frames: a node that
//! returns it remembers where to resume, and the caller ticks again next frame.
//! There are no threads, tasks or fibers inside the engine.
//!
//! The node graph is built once, usually by generated code, by composing
//! constructors on [`Node`].
//! This crate does not parse any source text.
//!
//!
//! ## How it looks like
//!
//! Leaves are closures over an agent type of your choice.
//! Conditions take `&A` and return a `bool`, actions take `&mut A` and the
//! [`TickContext`] and return a [`Status`].
//!
//! ```rust
//! use behavior_tree_runtime::{Node, Status, TickContext};
//!
//! struct Guard {
//!     sees_enemy: bool,
//!     steps: u32,
//! }
//!
//! let mut root = Node::selector(vec![
//!     Node::condition(|guard: &Guard| guard.sees_enemy),
//!     Node::action(|guard: &mut Guard, _ctx: &TickContext| {
//!         guard.steps += 1;
//!         if guard.steps < 2 {
//!             Status::Running
//!         } else {
//!             Status::Success
//!         }
//!     }),
//! ]);
//!
//! let mut guard = Guard { sees_enemy: false, steps: 0 };
//! assert_eq!(root.tick(&mut guard, TickContext::new(0.016, 0)), Status::Running);
//! assert_eq!(root.tick(&mut guard, TickContext::new(0.016, 1)), Status::Success);
//! ```
//!
//! The second tick does not evaluate the condition again, because the selector
//! resumes from the child that returned `Running`.
//!
//!
//! ## Owning a tree
//!
//! [`BehaviorTree`] wraps a root node with a frame counter, node identities for
//! debuggers, an optional [`DebugSink`] and a [`TreeConfig`].
//!
//! ```rust
//! use behavior_tree_runtime::{BehaviorTree, Node, Status, TreeConfig};
//!
//! let config = TreeConfig::from_yaml("name: idle\nmax_delta_time: 0.25").unwrap();
//! let mut tree = BehaviorTree::with_config(
//!     Node::timeout(1.0, Node::action(|_: &mut (), _| Status::Running)),
//!     config,
//! );
//!
//! // Large frame spikes are clamped, so it takes 4 frames to time out.
//! for _ in 0..3 {
//!     assert_eq!(tree.tick(&mut (), 5.0), Status::Running);
//! }
//! assert_eq!(tree.tick(&mut (), 5.0), Status::Failure);
//! ```
//!
//!
//! ## Node kinds
//!
//! * Leaves: `Condition`, `Action`, `AsyncAction`
//! * Composites: `Selector`, `Sequence`, `Parallel`
//! * Decorators: `Guard`, `IfElse`, `Invert`, `ForceSuccess`, `ForceFailure`,
//!   `Repeat`, `Retry`, `Timeout`, `Cooldown`, `While`
//! * Reactive nodes: `ReactiveGuard`, `ReactiveSelector`, `ReactiveSequence`
//!
//! Reactive nodes re-evaluate their conditions every tick and abort subtrees
//! that were left `Running` but are no longer selected.
//! Plain `Guard` only stops progressing such a subtree.
//!
//!
//! ## Reset and abort
//!
//! Between ticks every node is either idle or suspended-running.
//! [`Node::reset`] recursively forgets resumption state.
//! [`Node::abort`] additionally cancels in-flight asynchronous work
//! (see [`AsyncOperation`]) before resetting.
//!
//! Malformed graphs are rejected at construction time: `try_*` constructors
//! return a [`error::BuildError`], the plain ones panic with it.
//! Ticking never panics on its own; panics from user closures or a debug sink
//! are not caught.

mod async_op;
mod config;
mod context;
mod debug;
pub mod error;
mod node;
mod nodes;
mod snapshot;
mod symbol;
mod tree;

use serde::{Deserialize, Serialize};

pub use crate::async_op::{channel, AsyncOperation, ChannelOperation, Completion};
pub use crate::config::TreeConfig;
pub use crate::context::TickContext;
pub use crate::debug::{Breakpoints, DebugSink, NodeId, NodeInfo, TracingSink};
pub use crate::node::Node;
pub use crate::nodes::{
    Action, AsyncAction, BranchSwitch, Condition, Cooldown, ForceFailure, ForceSuccess, Guard,
    IfElse, Invert, NodeKind, Parallel, ParallelPolicy, ReactiveGuard, ReactiveSelector,
    ReactiveSequence, Repeat, Retry, Selector, Sequence, Timeout, While,
};
pub use crate::snapshot::NodeSnapshot;
pub use crate::symbol::Symbol;
pub use crate::tree::BehaviorTree;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Status {
    Success,
    Failure,
    /// The node should keep running in the next tick
    Running,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Swaps `Success` and `Failure`. `Running` is left untouched.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

pub type Predicate<A> = Box<dyn FnMut(&A) -> bool>;
pub type ActionFn<A> = Box<dyn FnMut(&mut A, &TickContext) -> Status>;
pub type AsyncStart<A> = Box<dyn FnMut(&mut A) -> Box<dyn AsyncOperation>>;
