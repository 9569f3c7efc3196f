use crate::{
    error::{AddChildError, AddChildResult, BuildError},
    nodes::{
        Action, AsyncAction, BranchSwitch, Condition, Cooldown, ForceFailure, ForceSuccess,
        Guard, IfElse, Invert, NodeKind, Parallel, ParallelPolicy, ReactiveGuard,
        ReactiveSelector, ReactiveSequence, Repeat, Retry, Selector, Sequence, Timeout, While,
    },
    AsyncOperation, NodeId, NodeInfo, Status, Symbol, TickContext,
};

/// A node of a behavior tree, exclusively owned by its parent.
///
/// The container carries the debug descriptor (identity, label and last status)
/// while [`NodeKind`] carries the behavior.
pub struct Node<A = ()> {
    pub(crate) id: NodeId,
    pub(crate) label: Option<Symbol>,
    pub(crate) last_status: Option<Status>,
    pub(crate) kind: NodeKind<A>,
}

impl<A> Node<A> {
    pub fn new(kind: NodeKind<A>) -> Self {
        Self {
            id: NodeId::default(),
            label: None,
            last_status: None,
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<Symbol>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn condition(predicate: impl FnMut(&A) -> bool + 'static) -> Self {
        Self::new(NodeKind::Condition(Condition::new(Box::new(predicate))))
    }

    pub fn action(action: impl FnMut(&mut A, &TickContext) -> Status + 'static) -> Self {
        Self::new(NodeKind::Action(Action::new(Box::new(action))))
    }

    /// A leaf that starts an [`AsyncOperation`] and reports `Running` until it completes.
    pub fn async_action<O>(mut start: impl FnMut(&mut A) -> O + 'static) -> Self
    where
        O: AsyncOperation + 'static,
    {
        Self::new(NodeKind::AsyncAction(AsyncAction::new(Box::new(
            move |agent: &mut A| -> Box<dyn AsyncOperation> { Box::new(start(agent)) },
        ))))
    }

    pub fn selector(children: Vec<Node<A>>) -> Self {
        Self::new(NodeKind::Selector(Selector::new(children)))
    }

    pub fn sequence(children: Vec<Node<A>>) -> Self {
        Self::new(NodeKind::Sequence(Sequence::new(children)))
    }

    /// Fails if `policy` is `N(0)` or `N(k)` with more than `children.len()`.
    pub fn try_parallel(policy: ParallelPolicy, children: Vec<Node<A>>) -> Result<Self, BuildError> {
        Ok(Self::new(NodeKind::Parallel(Parallel::new(policy, children)?)))
    }

    /// # Panics
    ///
    /// If `policy` can never be satisfied by `children`, see [`Node::try_parallel`].
    pub fn parallel(policy: ParallelPolicy, children: Vec<Node<A>>) -> Self {
        Self::try_parallel(policy, children).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn guard(condition: impl FnMut(&A) -> bool + 'static, child: Node<A>) -> Self {
        Self::new(NodeKind::Guard(Guard::new(Box::new(condition), child)))
    }

    /// If/else without an else branch: a false condition fails.
    pub fn if_then(condition: impl FnMut(&A) -> bool + 'static, then: Node<A>) -> Self {
        Self::if_else_with(condition, then, None, BranchSwitch::default())
    }

    pub fn if_else(
        condition: impl FnMut(&A) -> bool + 'static,
        then: Node<A>,
        otherwise: Node<A>,
    ) -> Self {
        Self::if_else_with(condition, then, Some(otherwise), BranchSwitch::default())
    }

    pub fn if_else_with(
        condition: impl FnMut(&A) -> bool + 'static,
        then: Node<A>,
        otherwise: Option<Node<A>>,
        switch: BranchSwitch,
    ) -> Self {
        Self::new(NodeKind::IfElse(IfElse::new(
            Box::new(condition),
            then,
            otherwise,
            switch,
        )))
    }

    pub fn invert(child: Node<A>) -> Self {
        Self::new(NodeKind::Invert(Invert::new(child)))
    }

    pub fn force_success(child: Node<A>) -> Self {
        Self::new(NodeKind::ForceSuccess(ForceSuccess::new(child)))
    }

    pub fn force_failure(child: Node<A>) -> Self {
        Self::new(NodeKind::ForceFailure(ForceFailure::new(child)))
    }

    pub fn repeat(n: usize, child: Node<A>) -> Self {
        Self::new(NodeKind::Repeat(Repeat::new(n, child)))
    }

    pub fn retry(n: usize, child: Node<A>) -> Self {
        Self::new(NodeKind::Retry(Retry::new(n, child)))
    }

    pub fn try_timeout(seconds: f32, child: Node<A>) -> Result<Self, BuildError> {
        Ok(Self::new(NodeKind::Timeout(Timeout::new(seconds, child)?)))
    }

    /// # Panics
    ///
    /// If `seconds` is negative or not finite.
    pub fn timeout(seconds: f32, child: Node<A>) -> Self {
        Self::try_timeout(seconds, child).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_cooldown(seconds: f32, child: Node<A>) -> Result<Self, BuildError> {
        Ok(Self::new(NodeKind::Cooldown(Cooldown::new(seconds, child)?)))
    }

    /// # Panics
    ///
    /// If `seconds` is negative or not finite.
    pub fn cooldown(seconds: f32, child: Node<A>) -> Self {
        Self::try_cooldown(seconds, child).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn while_(condition: impl FnMut(&A) -> bool + 'static, body: Node<A>) -> Self {
        Self::new(NodeKind::While(While::new(Box::new(condition), body)))
    }

    pub fn reactive_guard(condition: impl FnMut(&A) -> bool + 'static, body: Node<A>) -> Self {
        Self::new(NodeKind::ReactiveGuard(ReactiveGuard::new(
            Box::new(condition),
            body,
        )))
    }

    pub fn reactive_selector(children: Vec<Node<A>>) -> Self {
        Self::new(NodeKind::ReactiveSelector(ReactiveSelector::new(children)))
    }

    pub fn reactive_sequence(children: Vec<Node<A>>) -> Self {
        Self::new(NodeKind::ReactiveSequence(ReactiveSequence::new(children)))
    }

    /// Appends a child to a list composite.
    ///
    /// A [`ParallelPolicy::N`] is validated against the children passed to
    /// [`Node::try_parallel`], so a `Parallel` with `N(k)` has to start with at
    /// least `k` children. Appending more only makes the quorum easier to reach.
    pub fn add_child(&mut self, child: Node<A>) -> AddChildResult {
        let kind = self.kind.name();
        self.kind
            .child_list_mut()
            .map(|children| children.push(child))
            .ok_or(AddChildError::TooManyNodes { kind })
    }

    /// Evaluates one step of this node for the current frame.
    pub fn tick(&mut self, agent: &mut A, ctx: TickContext) -> Status {
        let info = self.info();
        if let Some(sink) = ctx.debug {
            sink.before_tick(&info, &ctx);
            if sink.should_break(&info) {
                sink.wait_for_continue();
            }
        }

        let status = self.kind.tick(&info, agent, ctx);
        self.last_status = Some(status);

        if let Some(sink) = ctx.debug {
            sink.after_tick(&info, status, &ctx);
        }
        status
    }

    /// Recursively clears resumption state down the subtree. Idempotent.
    pub fn reset(&mut self) {
        self.last_status = None;
        self.kind.reset();
    }

    /// Cancels in-flight work in the subtree, then resets it.
    /// Safe to call on an idle node.
    ///
    /// There is no [`TickContext`] outside a tick, so no [`crate::DebugSink::on_abort`]
    /// is reported. Use [`crate::BehaviorTree::abort`] to have the tree's sink
    /// notified for the root.
    pub fn abort(&mut self) {
        self.last_status = None;
        self.kind.abort();
    }

    /// Aborts this node on behalf of its parent during a tick, reporting the
    /// cancellation if the node was actually suspended.
    pub(crate) fn abort_in(&mut self, ctx: &TickContext) {
        if self.is_running() {
            let info = self.info();
            tracing::debug!(frame = ctx.frame, "aborting {info}");
            if let Some(sink) = ctx.debug {
                sink.on_abort(&info);
            }
        }
        self.abort();
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> Option<Symbol> {
        self.label
    }

    /// Name of the node kind, e.g. `"Selector"`.
    pub fn kind(&self) -> &'static str {
        self.kind.name()
    }

    pub fn node_kind(&self) -> &NodeKind<A> {
        &self.kind
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    /// Whether the node returned `Running` on its last tick and has not been reset since.
    pub fn is_running(&self) -> bool {
        self.last_status == Some(Status::Running)
    }

    pub fn children(&self) -> Vec<&Node<A>> {
        self.kind.children()
    }

    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            id: self.id,
            kind: self.kind.name(),
            label: self.label,
        }
    }

    /// Numbers this subtree in pre-order starting from `next`, returning the next free id.
    pub(crate) fn assign_ids(&mut self, mut next: u32) -> u32 {
        self.id = NodeId(next);
        next += 1;
        self.kind
            .for_each_child_mut(|child| next = child.assign_ids(next));
        next
    }

    /// Pre-order search by identity.
    pub fn find(&self, id: NodeId) -> Option<&Node<A>> {
        if self.id == id {
            return Some(self);
        }
        self.kind
            .children()
            .into_iter()
            .find_map(|child| child.find(id))
    }
}

impl<A> std::fmt::Debug for Node<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("label", &self.label)
            .field("last_status", &self.last_status)
            .field("children", &self.children())
            .finish()
    }
}
