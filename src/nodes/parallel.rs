use crate::{error::BuildError, Node, Status, TickContext};
use serde::{Deserialize, Serialize};

/// When a [`Parallel`] node finalizes with `Success`.
///
/// Failure mirrors it: the node fails as soon as the success threshold can no
/// longer be reached by the children that have not failed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParallelPolicy {
    /// One child succeeding is enough.
    Any,
    /// Every child has to succeed.
    All,
    /// `k` distinct children have to succeed.
    N(usize),
}

impl ParallelPolicy {
    pub fn success_threshold(self, children: usize) -> usize {
        match self {
            Self::Any => 1,
            Self::All => children,
            Self::N(k) => k,
        }
    }
}

/// Ticks every unfinished child on every tick.
///
/// A child that completed earlier in the current run keeps its outcome and is
/// not ticked again until the parallel node itself finalizes. On finalization
/// the children still `Running` are aborted.
pub struct Parallel<A> {
    policy: ParallelPolicy,
    pub(crate) children: Vec<Node<A>>,
    /// Outcome of each child in the current run, `None` while unfinished.
    outcomes: Vec<Option<Status>>,
}

impl<A> Parallel<A> {
    pub(crate) fn new(policy: ParallelPolicy, children: Vec<Node<A>>) -> Result<Self, BuildError> {
        if let ParallelPolicy::N(k) = policy {
            if k == 0 || children.len() < k {
                return Err(BuildError::InvalidPolicy {
                    policy,
                    children: children.len(),
                });
            }
        }
        Ok(Self {
            policy,
            outcomes: vec![None; children.len()],
            children,
        })
    }

    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        // Children may have been appended since the last run.
        self.outcomes.resize(self.children.len(), None);

        let mut successes = 0;
        let mut failures = 0;
        for (child, outcome) in self.children.iter_mut().zip(self.outcomes.iter_mut()) {
            if outcome.is_none() {
                match child.tick(agent, ctx) {
                    Status::Running => (),
                    done => *outcome = Some(done),
                }
            }
            match outcome {
                Some(Status::Success) => successes += 1,
                Some(Status::Failure) => failures += 1,
                _ => (),
            }
        }

        let threshold = self.policy.success_threshold(self.children.len());
        let status = if successes >= threshold {
            Status::Success
        } else if self.children.len() - failures < threshold {
            Status::Failure
        } else {
            return Status::Running;
        };

        tracing::trace!(
            ?status,
            successes,
            failures,
            policy = ?self.policy,
            "parallel finalized"
        );
        for (child, outcome) in self.children.iter_mut().zip(self.outcomes.iter_mut()) {
            if outcome.take().is_none() {
                child.abort_in(&ctx);
            }
        }
        status
    }

    pub(super) fn reset(&mut self) {
        self.outcomes.iter_mut().for_each(|outcome| *outcome = None);
        self.children.iter_mut().for_each(Node::reset);
    }
}
