//! Nodes that re-evaluate from scratch every tick and abort stale `Running` subtrees.

use super::report_expr;
use crate::{Node, NodeInfo, Predicate, Status, TickContext};
use std::collections::BTreeSet;

/// Like [`super::Guard`], but a body left `Running` is aborted as soon as the
/// condition turns false.
pub struct ReactiveGuard<A> {
    condition: Predicate<A>,
    pub(crate) body: Box<Node<A>>,
}

impl<A> ReactiveGuard<A> {
    pub(crate) fn new(condition: Predicate<A>, body: Node<A>) -> Self {
        Self {
            condition,
            body: Box::new(body),
        }
    }

    pub(super) fn tick(&mut self, info: &NodeInfo, agent: &mut A, ctx: TickContext) -> Status {
        let pass = (self.condition)(&*agent);
        report_expr(info, pass, &ctx);
        if !pass {
            if self.body.is_running() {
                self.body.abort_in(&ctx);
            }
            return Status::Failure;
        }

        let status = self.body.tick(agent, ctx);
        if status != Status::Running {
            self.body.reset();
        }
        status
    }
}

/// A selector that scans from the first child on every tick.
///
/// A higher-priority child becoming viable preempts the one that was running:
/// every child that was `Running` on the previous tick but is not the child
/// selected now is aborted.
pub struct ReactiveSelector<A> {
    pub(crate) children: Vec<Node<A>>,
    /// Children left `Running` by the previous tick. A set rather than a
    /// single index, so preemption stays correct if a kind ever leaves more
    /// than one child running; it holds at most one entry today.
    running: BTreeSet<usize>,
}

impl<A> ReactiveSelector<A> {
    pub(crate) fn new(children: Vec<Node<A>>) -> Self {
        Self {
            children,
            running: BTreeSet::new(),
        }
    }

    pub fn running_children(&self) -> &BTreeSet<usize> {
        &self.running
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        let mut selected = None;
        for (i, node) in self.children.iter_mut().enumerate() {
            match node.tick(agent, ctx) {
                Status::Failure => (),
                status => {
                    selected = Some((i, status));
                    break;
                }
            }
        }

        let keep = match selected {
            Some((i, Status::Running)) => Some(i),
            _ => None,
        };
        for &i in &self.running {
            if selected.map(|(selected, _)| selected) != Some(i) {
                self.children[i].abort_in(&ctx);
            }
        }
        // Not `clear`: it frees the set's root node, and a child parked in
        // `Running` must not allocate on every tick.
        self.running.retain(|&i| Some(i) == keep);

        match selected {
            Some((i, Status::Running)) => {
                self.running.insert(i);
                Status::Running
            }
            Some((_, status)) => status,
            None => Status::Failure,
        }
    }

    pub(super) fn reset(&mut self) {
        self.running.retain(|_| false);
        self.children.iter_mut().for_each(Node::reset);
    }
}

/// A sequence that re-checks every preceding child on every tick.
///
/// If an earlier child stops succeeding, the child that was running further
/// down the sequence is aborted.
pub struct ReactiveSequence<A> {
    pub(crate) children: Vec<Node<A>>,
    running: Option<usize>,
}

impl<A> ReactiveSequence<A> {
    pub(crate) fn new(children: Vec<Node<A>>) -> Self {
        Self {
            children,
            running: None,
        }
    }

    pub fn running_index(&self) -> Option<usize> {
        self.running
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        let mut current = None;
        for (i, node) in self.children.iter_mut().enumerate() {
            match node.tick(agent, ctx) {
                Status::Success => (),
                status => {
                    current = Some((i, status));
                    break;
                }
            }
        }

        if let Some(previous) = self.running.take() {
            if current.map(|(i, _)| i) != Some(previous) {
                self.children[previous].abort_in(&ctx);
            }
        }

        match current {
            Some((i, Status::Running)) => {
                self.running = Some(i);
                Status::Running
            }
            Some((_, status)) => status,
            None => Status::Success,
        }
    }

    pub(super) fn reset(&mut self) {
        self.running = None;
        self.children.iter_mut().for_each(Node::reset);
    }
}
