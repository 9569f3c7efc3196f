//! Debug instrumentation.
//!
//! A [`DebugSink`] is normally absent; every hook is behind an `Option` check in
//! [`crate::Node::tick`], so an unset sink costs a branch per node and nothing else.

use crate::{Status, Symbol, TickContext};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Identity of a node within its tree, assigned in pre-order when the tree is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The debug descriptor of a node, handed to the sink on every event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub kind: &'static str,
    pub label: Option<Symbol>,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{}({}) {}", self.kind, label, self.id),
            None => write!(f, "{} {}", self.kind, self.id),
        }
    }
}

/// Observer of tick execution.
///
/// All hooks are called on the ticking thread. They are infallible: a panicking
/// sink unwinds through `tick` like a panicking leaf closure would.
pub trait DebugSink {
    fn before_tick(&self, _node: &NodeInfo, _ctx: &TickContext) {}

    fn after_tick(&self, _node: &NodeInfo, _status: Status, _ctx: &TickContext) {}

    /// Value of a leaf condition or a decorator's predicate.
    fn on_expr_evaluated(&self, _node: &NodeInfo, _value: bool) {}

    /// A suspended-running node was cancelled by its parent during a tick, or
    /// the root by [`crate::BehaviorTree::abort`]. Descendants cancelled along
    /// with it and direct [`crate::Node::abort`] calls are not reported.
    fn on_abort(&self, _node: &NodeInfo) {}

    fn should_break(&self, _node: &NodeInfo) -> bool {
        false
    }

    /// Blocks the ticking thread until an external actor resumes execution.
    /// Only called right after `should_break` returned `true`.
    fn wait_for_continue(&self) {}
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn before_tick(&self, node: &NodeInfo, ctx: &TickContext) {
        tracing::trace!(frame = ctx.frame, "enter {node}");
    }

    fn after_tick(&self, node: &NodeInfo, status: Status, ctx: &TickContext) {
        tracing::trace!(frame = ctx.frame, ?status, "leave {node}");
    }

    fn on_expr_evaluated(&self, node: &NodeInfo, value: bool) {
        tracing::trace!(value, "expression of {node}");
    }

    fn on_abort(&self, node: &NodeInfo) {
        tracing::debug!("aborted {node}");
    }
}

#[derive(Default)]
struct BreakState {
    breakpoints: HashSet<NodeId>,
    paused_at: Option<NodeId>,
}

/// Breakpoint controller.
///
/// Share it between the ticking thread (installed as the tree's sink) and a
/// controller thread that calls [`Breakpoints::resume`]. Without a controller a
/// hit breakpoint blocks the tick loop forever.
#[derive(Default)]
pub struct Breakpoints {
    state: Mutex<BreakState>,
    resumed: Condvar,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BreakState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, id: NodeId) {
        self.lock().breakpoints.insert(id);
    }

    pub fn clear(&self, id: NodeId) -> bool {
        self.lock().breakpoints.remove(&id)
    }

    pub fn clear_all(&self) {
        self.lock().breakpoints.clear();
    }

    /// The node the ticking thread is currently paused before, if any.
    pub fn paused_at(&self) -> Option<NodeId> {
        self.lock().paused_at
    }

    pub fn resume(&self) {
        self.lock().paused_at = None;
        self.resumed.notify_all();
    }
}

impl DebugSink for Breakpoints {
    fn should_break(&self, node: &NodeInfo) -> bool {
        let mut state = self.lock();
        if state.breakpoints.contains(&node.id) {
            state.paused_at = Some(node.id);
            true
        } else {
            false
        }
    }

    fn wait_for_continue(&self) {
        let mut state = self.lock();
        if let Some(id) = state.paused_at {
            tracing::debug!("paused before {id}");
        }
        while state.paused_at.is_some() {
            state = self
                .resumed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
