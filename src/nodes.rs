use crate::{ActionFn, AsyncOperation, AsyncStart, Node, NodeInfo, Predicate, Status, TickContext};

mod decorator;
mod parallel;
mod reactive;

pub use self::decorator::{
    BranchSwitch, Cooldown, ForceFailure, ForceSuccess, Guard, IfElse, Invert, Repeat, Retry,
    Timeout, While,
};
pub use self::parallel::{Parallel, ParallelPolicy};
pub use self::reactive::{ReactiveGuard, ReactiveSelector, ReactiveSequence};

/// The closed set of node behaviors.
///
/// Dispatch is an exhaustive `match`, so adding a kind forces every operation
/// (tick, reset, abort, child enumeration) to handle it.
pub enum NodeKind<A> {
    Condition(Condition<A>),
    Action(Action<A>),
    AsyncAction(AsyncAction<A>),
    Selector(Selector<A>),
    Sequence(Sequence<A>),
    Parallel(Parallel<A>),
    Guard(Guard<A>),
    IfElse(IfElse<A>),
    Invert(Invert<A>),
    ForceSuccess(ForceSuccess<A>),
    ForceFailure(ForceFailure<A>),
    Repeat(Repeat<A>),
    Retry(Retry<A>),
    Timeout(Timeout<A>),
    Cooldown(Cooldown<A>),
    While(While<A>),
    ReactiveGuard(ReactiveGuard<A>),
    ReactiveSelector(ReactiveSelector<A>),
    ReactiveSequence(ReactiveSequence<A>),
}

impl<A> NodeKind<A> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Condition(_) => "Condition",
            Self::Action(_) => "Action",
            Self::AsyncAction(_) => "AsyncAction",
            Self::Selector(_) => "Selector",
            Self::Sequence(_) => "Sequence",
            Self::Parallel(_) => "Parallel",
            Self::Guard(_) => "Guard",
            Self::IfElse(_) => "IfElse",
            Self::Invert(_) => "Invert",
            Self::ForceSuccess(_) => "ForceSuccess",
            Self::ForceFailure(_) => "ForceFailure",
            Self::Repeat(_) => "Repeat",
            Self::Retry(_) => "Retry",
            Self::Timeout(_) => "Timeout",
            Self::Cooldown(_) => "Cooldown",
            Self::While(_) => "While",
            Self::ReactiveGuard(_) => "ReactiveGuard",
            Self::ReactiveSelector(_) => "ReactiveSelector",
            Self::ReactiveSequence(_) => "ReactiveSequence",
        }
    }

    pub(crate) fn tick(&mut self, info: &NodeInfo, agent: &mut A, ctx: TickContext) -> Status {
        match self {
            Self::Condition(node) => node.tick(info, agent, ctx),
            Self::Action(node) => node.tick(agent, ctx),
            Self::AsyncAction(node) => node.tick(agent),
            Self::Selector(node) => node.tick(agent, ctx),
            Self::Sequence(node) => node.tick(agent, ctx),
            Self::Parallel(node) => node.tick(agent, ctx),
            Self::Guard(node) => node.tick(info, agent, ctx),
            Self::IfElse(node) => node.tick(info, agent, ctx),
            Self::Invert(node) => node.tick(agent, ctx),
            Self::ForceSuccess(node) => node.tick(agent, ctx),
            Self::ForceFailure(node) => node.tick(agent, ctx),
            Self::Repeat(node) => node.tick(agent, ctx),
            Self::Retry(node) => node.tick(agent, ctx),
            Self::Timeout(node) => node.tick(agent, ctx),
            Self::Cooldown(node) => node.tick(agent, ctx),
            Self::While(node) => node.tick(info, agent, ctx),
            Self::ReactiveGuard(node) => node.tick(info, agent, ctx),
            Self::ReactiveSelector(node) => node.tick(agent, ctx),
            Self::ReactiveSequence(node) => node.tick(agent, ctx),
        }
    }

    pub(crate) fn reset(&mut self) {
        match self {
            Self::Condition(_) | Self::Action(_) => (),
            Self::AsyncAction(node) => node.cancel(),
            Self::Selector(node) => node.reset(),
            Self::Sequence(node) => node.reset(),
            Self::Parallel(node) => node.reset(),
            Self::IfElse(node) => node.reset(),
            Self::Repeat(node) => node.reset(),
            Self::Retry(node) => node.reset(),
            Self::Timeout(node) => node.reset(),
            Self::ReactiveSelector(node) => node.reset(),
            Self::ReactiveSequence(node) => node.reset(),
            Self::Guard(_)
            | Self::Invert(_)
            | Self::ForceSuccess(_)
            | Self::ForceFailure(_)
            | Self::Cooldown(_)
            | Self::While(_)
            | Self::ReactiveGuard(_) => self.for_each_child_mut(Node::reset),
        }
    }

    pub(crate) fn abort(&mut self) {
        match self {
            Self::Condition(_) | Self::Action(_) => (),
            Self::AsyncAction(node) => node.cancel(),
            _ => {
                self.for_each_child_mut(Node::abort);
                self.reset();
            }
        }
    }

    pub(crate) fn children(&self) -> Vec<&Node<A>> {
        match self {
            Self::Condition(_) | Self::Action(_) | Self::AsyncAction(_) => vec![],
            Self::Selector(node) => node.children.iter().collect(),
            Self::Sequence(node) => node.children.iter().collect(),
            Self::Parallel(node) => node.children.iter().collect(),
            Self::ReactiveSelector(node) => node.children.iter().collect(),
            Self::ReactiveSequence(node) => node.children.iter().collect(),
            Self::IfElse(node) => std::iter::once(&*node.then)
                .chain(node.otherwise.as_deref())
                .collect(),
            Self::Guard(node) => vec![&*node.child],
            Self::Invert(node) => vec![&*node.child],
            Self::ForceSuccess(node) => vec![&*node.child],
            Self::ForceFailure(node) => vec![&*node.child],
            Self::Repeat(node) => vec![&*node.child],
            Self::Retry(node) => vec![&*node.child],
            Self::Timeout(node) => vec![&*node.child],
            Self::Cooldown(node) => vec![&*node.child],
            Self::While(node) => vec![&*node.body],
            Self::ReactiveGuard(node) => vec![&*node.body],
        }
    }

    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Node<A>)) {
        match self {
            Self::Condition(_) | Self::Action(_) | Self::AsyncAction(_) => (),
            Self::Selector(node) => node.children.iter_mut().for_each(f),
            Self::Sequence(node) => node.children.iter_mut().for_each(f),
            Self::Parallel(node) => node.children.iter_mut().for_each(f),
            Self::ReactiveSelector(node) => node.children.iter_mut().for_each(f),
            Self::ReactiveSequence(node) => node.children.iter_mut().for_each(f),
            Self::IfElse(node) => {
                f(&mut *node.then);
                if let Some(otherwise) = node.otherwise.as_deref_mut() {
                    f(otherwise);
                }
            }
            Self::Guard(node) => f(&mut *node.child),
            Self::Invert(node) => f(&mut *node.child),
            Self::ForceSuccess(node) => f(&mut *node.child),
            Self::ForceFailure(node) => f(&mut *node.child),
            Self::Repeat(node) => f(&mut *node.child),
            Self::Retry(node) => f(&mut *node.child),
            Self::Timeout(node) => f(&mut *node.child),
            Self::Cooldown(node) => f(&mut *node.child),
            Self::While(node) => f(&mut *node.body),
            Self::ReactiveGuard(node) => f(&mut *node.body),
        }
    }

    /// The child list of a list composite, `None` for leaves and decorators.
    pub(crate) fn child_list_mut(&mut self) -> Option<&mut Vec<Node<A>>> {
        match self {
            Self::Selector(node) => Some(&mut node.children),
            Self::Sequence(node) => Some(&mut node.children),
            Self::Parallel(node) => Some(&mut node.children),
            Self::ReactiveSelector(node) => Some(&mut node.children),
            Self::ReactiveSequence(node) => Some(&mut node.children),
            _ => None,
        }
    }
}

pub(crate) fn report_expr(info: &NodeInfo, value: bool, ctx: &TickContext) {
    if let Some(sink) = ctx.debug {
        sink.on_expr_evaluated(info, value);
    }
}

pub struct Condition<A> {
    predicate: Predicate<A>,
}

impl<A> Condition<A> {
    pub(crate) fn new(predicate: Predicate<A>) -> Self {
        Self { predicate }
    }

    fn tick(&mut self, info: &NodeInfo, agent: &mut A, ctx: TickContext) -> Status {
        let value = (self.predicate)(&*agent);
        report_expr(info, value, &ctx);
        value.into()
    }
}

pub struct Action<A> {
    action: ActionFn<A>,
}

impl<A> Action<A> {
    pub(crate) fn new(action: ActionFn<A>) -> Self {
        Self { action }
    }

    fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        (self.action)(agent, &ctx)
    }
}

pub struct AsyncAction<A> {
    start: AsyncStart<A>,
    pending: Option<Box<dyn AsyncOperation>>,
}

impl<A> AsyncAction<A> {
    pub(crate) fn new(start: AsyncStart<A>) -> Self {
        Self {
            start,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn tick(&mut self, agent: &mut A) -> Status {
        let start = &mut self.start;
        let op = self.pending.get_or_insert_with(|| start(agent));
        if !op.is_completed() {
            return Status::Running;
        }
        let success = op.take_result();
        self.pending = None;
        success.into()
    }

    fn cancel(&mut self) {
        if let Some(mut op) = self.pending.take() {
            op.cancel();
        }
    }
}

pub struct Selector<A> {
    pub(crate) children: Vec<Node<A>>,
    running: Option<usize>,
}

impl<A> Selector<A> {
    pub(crate) fn new(children: Vec<Node<A>>) -> Self {
        Self {
            children,
            running: None,
        }
    }

    /// The child this selector resumes from on the next tick.
    pub fn running_index(&self) -> Option<usize> {
        self.running
    }

    fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        let from = self.running.unwrap_or(0);
        for (i, node) in self.children[from..].iter_mut().enumerate() {
            match node.tick(agent, ctx) {
                Status::Success => {
                    self.running = None;
                    return Status::Success;
                }
                Status::Running => {
                    self.running = Some(i + from);
                    return Status::Running;
                }
                Status::Failure => (),
            }
        }
        self.running = None;
        Status::Failure
    }

    fn reset(&mut self) {
        self.running = None;
        self.children.iter_mut().for_each(Node::reset);
    }
}

pub struct Sequence<A> {
    pub(crate) children: Vec<Node<A>>,
    running: Option<usize>,
}

impl<A> Sequence<A> {
    pub(crate) fn new(children: Vec<Node<A>>) -> Self {
        Self {
            children,
            running: None,
        }
    }

    /// The child this sequence resumes from on the next tick.
    pub fn running_index(&self) -> Option<usize> {
        self.running
    }

    fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        let from = self.running.unwrap_or(0);
        for (i, node) in self.children[from..].iter_mut().enumerate() {
            match node.tick(agent, ctx) {
                Status::Failure => {
                    self.running = None;
                    return Status::Failure;
                }
                Status::Running => {
                    self.running = Some(i + from);
                    return Status::Running;
                }
                Status::Success => (),
            }
        }
        self.running = None;
        Status::Success
    }

    fn reset(&mut self) {
        self.running = None;
        self.children.iter_mut().for_each(Node::reset);
    }
}
