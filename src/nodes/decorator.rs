//! Nodes wrapping one child (or two, for [`IfElse`]) to change its status or timing.

use super::report_expr;
use crate::{error::BuildError, Node, NodeInfo, Predicate, Status, TickContext};

fn check_duration(kind: &'static str, seconds: f32) -> Result<f32, BuildError> {
    if seconds.is_finite() && seconds >= 0. {
        Ok(seconds)
    } else {
        Err(BuildError::InvalidDuration { kind, seconds })
    }
}

/// Ticks the child only while the condition holds.
///
/// A child left `Running` when the condition turns false is not aborted; it is
/// simply no longer progressed. Use [`super::ReactiveGuard`] to cancel it.
pub struct Guard<A> {
    condition: Predicate<A>,
    pub(crate) child: Box<Node<A>>,
}

impl<A> Guard<A> {
    pub(crate) fn new(condition: Predicate<A>, child: Node<A>) -> Self {
        Self {
            condition,
            child: Box::new(child),
        }
    }

    pub(super) fn tick(&mut self, info: &NodeInfo, agent: &mut A, ctx: TickContext) -> Status {
        let pass = (self.condition)(&*agent);
        report_expr(info, pass, &ctx);
        if pass {
            self.child.tick(agent, ctx)
        } else {
            Status::Failure
        }
    }
}

/// What an [`IfElse`] does with a branch left `Running` when the condition
/// routes the next tick to the other branch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BranchSwitch {
    /// Abort the abandoned branch, like reactive nodes do.
    #[default]
    Abort,
    /// Leave it suspended, like [`Guard`] does. It resumes where it stopped
    /// if the condition routes back to it.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Then,
    Else,
}

pub struct IfElse<A> {
    condition: Predicate<A>,
    pub(crate) then: Box<Node<A>>,
    pub(crate) otherwise: Option<Box<Node<A>>>,
    switch: BranchSwitch,
    /// The branch that returned `Running` on the previous tick.
    active: Option<Branch>,
}

impl<A> IfElse<A> {
    pub(crate) fn new(
        condition: Predicate<A>,
        then: Node<A>,
        otherwise: Option<Node<A>>,
        switch: BranchSwitch,
    ) -> Self {
        Self {
            condition,
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
            switch,
            active: None,
        }
    }

    pub fn branch_switch(&self) -> BranchSwitch {
        self.switch
    }

    fn branch_mut(&mut self, branch: Branch) -> Option<&mut Node<A>> {
        match branch {
            Branch::Then => Some(&mut *self.then),
            Branch::Else => self.otherwise.as_deref_mut(),
        }
    }

    pub(super) fn tick(&mut self, info: &NodeInfo, agent: &mut A, ctx: TickContext) -> Status {
        let value = (self.condition)(&*agent);
        report_expr(info, value, &ctx);
        let branch = if value { Branch::Then } else { Branch::Else };

        if let Some(previous) = self.active.take() {
            if previous != branch && self.switch == BranchSwitch::Abort {
                if let Some(abandoned) = self.branch_mut(previous) {
                    abandoned.abort_in(&ctx);
                }
            }
        }

        let status = match self.branch_mut(branch) {
            Some(node) => node.tick(agent, ctx),
            None => Status::Failure,
        };
        if status == Status::Running {
            self.active = Some(branch);
        }
        status
    }

    pub(super) fn reset(&mut self) {
        self.active = None;
        self.then.reset();
        if let Some(otherwise) = self.otherwise.as_deref_mut() {
            otherwise.reset();
        }
    }
}

/// Swaps `Success` and `Failure`, passing `Running` through.
pub struct Invert<A> {
    pub(crate) child: Box<Node<A>>,
}

impl<A> Invert<A> {
    pub(crate) fn new(child: Node<A>) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        self.child.tick(agent, ctx).invert()
    }
}

pub struct ForceSuccess<A> {
    pub(crate) child: Box<Node<A>>,
}

impl<A> ForceSuccess<A> {
    pub(crate) fn new(child: Node<A>) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        match self.child.tick(agent, ctx) {
            Status::Running => Status::Running,
            _ => Status::Success,
        }
    }
}

pub struct ForceFailure<A> {
    pub(crate) child: Box<Node<A>>,
}

impl<A> ForceFailure<A> {
    pub(crate) fn new(child: Node<A>) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        match self.child.tick(agent, ctx) {
            Status::Running => Status::Running,
            _ => Status::Failure,
        }
    }
}

/// Succeeds once the child has succeeded `n` times.
///
/// Each success short of `n` resets the child and returns `Running`, so the
/// next iteration starts on the next tick. A failure at any iteration fails
/// the node and restarts the count.
pub struct Repeat<A> {
    n: usize,
    count: usize,
    pub(crate) child: Box<Node<A>>,
}

impl<A> Repeat<A> {
    pub(crate) fn new(n: usize, child: Node<A>) -> Self {
        Self {
            n,
            count: 0,
            child: Box::new(child),
        }
    }

    /// Successes counted so far in the current run.
    pub fn count(&self) -> usize {
        self.count
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        if self.n == 0 {
            return Status::Success;
        }
        match self.child.tick(agent, ctx) {
            Status::Running => Status::Running,
            Status::Failure => {
                self.count = 0;
                Status::Failure
            }
            Status::Success => {
                self.count += 1;
                if self.count >= self.n {
                    self.count = 0;
                    Status::Success
                } else {
                    self.child.reset();
                    Status::Running
                }
            }
        }
    }

    pub(super) fn reset(&mut self) {
        self.count = 0;
        self.child.reset();
    }
}

/// Gives a failing child up to `n` attempts.
pub struct Retry<A> {
    n: usize,
    attempts: usize,
    pub(crate) child: Box<Node<A>>,
}

impl<A> Retry<A> {
    pub(crate) fn new(n: usize, child: Node<A>) -> Self {
        Self {
            n,
            attempts: 0,
            child: Box::new(child),
        }
    }

    /// Failed attempts so far in the current run.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        if self.n == 0 {
            return Status::Failure;
        }
        match self.child.tick(agent, ctx) {
            Status::Running => Status::Running,
            Status::Success => {
                self.attempts = 0;
                Status::Success
            }
            Status::Failure => {
                self.attempts += 1;
                if self.attempts >= self.n {
                    self.attempts = 0;
                    Status::Failure
                } else {
                    self.child.reset();
                    Status::Running
                }
            }
        }
    }

    pub(super) fn reset(&mut self) {
        self.attempts = 0;
        self.child.reset();
    }
}

/// Fails if the child has not finished within `seconds` of accumulated tick time.
pub struct Timeout<A> {
    seconds: f32,
    elapsed: f32,
    pub(crate) child: Box<Node<A>>,
}

impl<A> Timeout<A> {
    pub(crate) fn new(seconds: f32, child: Node<A>) -> Result<Self, BuildError> {
        Ok(Self {
            seconds: check_duration("Timeout", seconds)?,
            elapsed: 0.,
            child: Box::new(child),
        })
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        self.elapsed += ctx.delta_time;
        if self.elapsed >= self.seconds {
            tracing::debug!(
                frame = ctx.frame,
                elapsed = self.elapsed,
                seconds = self.seconds,
                "timeout expired"
            );
            self.elapsed = 0.;
            self.child.abort_in(&ctx);
            return Status::Failure;
        }
        let status = self.child.tick(agent, ctx);
        if status != Status::Running {
            self.elapsed = 0.;
        }
        status
    }

    pub(super) fn reset(&mut self) {
        self.elapsed = 0.;
        self.child.reset();
    }
}

/// Blocks the child for `seconds` after each success.
///
/// The remaining time is a rate limit rather than resumption state, so it
/// survives `reset` and `abort`.
pub struct Cooldown<A> {
    seconds: f32,
    remaining: f32,
    pub(crate) child: Box<Node<A>>,
}

impl<A> Cooldown<A> {
    pub(crate) fn new(seconds: f32, child: Node<A>) -> Result<Self, BuildError> {
        Ok(Self {
            seconds: check_duration("Cooldown", seconds)?,
            remaining: 0.,
            child: Box::new(child),
        })
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub(super) fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        if self.remaining > 0. {
            self.remaining -= ctx.delta_time;
            return Status::Failure;
        }
        let status = self.child.tick(agent, ctx);
        if status == Status::Success {
            self.remaining = self.seconds;
        }
        status
    }
}

/// Ticks the body while the condition holds, passing its status through.
pub struct While<A> {
    condition: Predicate<A>,
    pub(crate) body: Box<Node<A>>,
}

impl<A> While<A> {
    pub(crate) fn new(condition: Predicate<A>, body: Node<A>) -> Self {
        Self {
            condition,
            body: Box::new(body),
        }
    }

    pub(super) fn tick(&mut self, info: &NodeInfo, agent: &mut A, ctx: TickContext) -> Status {
        let holds = (self.condition)(&*agent);
        report_expr(info, holds, &ctx);
        if holds {
            self.body.tick(agent, ctx)
        } else {
            Status::Failure
        }
    }
}
