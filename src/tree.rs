use crate::{
    error::ConfigError, DebugSink, Node, NodeId, NodeSnapshot, Status, Symbol, TickContext,
    TracingSink, TreeConfig,
};
use std::sync::Arc;

/// Owner of a root node.
///
/// It numbers the nodes for debuggers, keeps the frame counter, feeds the
/// configured [`DebugSink`] into every tick and starts each run clean.
/// A tree must be ticked from one thread at a time, which `&mut self` enforces.
pub struct BehaviorTree<A = ()> {
    name: Symbol,
    root: Node<A>,
    config: TreeConfig,
    frame: u64,
    debug: Option<Arc<dyn DebugSink>>,
}

impl<A> BehaviorTree<A> {
    pub fn new(root: Node<A>) -> Self {
        Self::with_config(root, TreeConfig::default())
    }

    /// # Panics
    ///
    /// If `config` does not pass [`TreeConfig::validate`], see [`BehaviorTree::try_with_config`].
    pub fn with_config(root: Node<A>, config: TreeConfig) -> Self {
        Self::try_with_config(root, config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_with_config(mut root: Node<A>, config: TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let count = root.assign_ids(0);
        let debug: Option<Arc<dyn DebugSink>> = if config.trace_ticks {
            Some(Arc::new(TracingSink))
        } else {
            None
        };
        tracing::debug!(tree = %config.name, nodes = count, "behavior tree built");
        Ok(Self {
            name: Symbol::from(&config.name),
            root,
            config,
            frame: 0,
            debug,
        })
    }

    pub fn name(&self) -> Symbol {
        self.name
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of ticks performed so far, which is also the frame number of the next tick.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn root(&self) -> &Node<A> {
        &self.root
    }

    pub fn find(&self, id: NodeId) -> Option<&Node<A>> {
        self.root.find(id)
    }

    pub fn set_debug_sink(&mut self, sink: Arc<dyn DebugSink>) {
        self.debug = Some(sink);
    }

    pub fn clear_debug_sink(&mut self) -> Option<Arc<dyn DebugSink>> {
        self.debug.take()
    }

    /// Ticks the root once for the current frame.
    pub fn tick(&mut self, agent: &mut A, delta_time: f32) -> Status {
        let ctx = TickContext {
            delta_time: self.config.clamp_delta_time(delta_time),
            frame: self.frame,
            debug: self.debug.as_deref(),
        };
        let status = self.root.tick(agent, ctx);
        tracing::trace!(tree = %self.name, frame = self.frame, ?status, "tree ticked");
        self.frame += 1;

        if status != Status::Running && self.config.reset_on_complete {
            self.root.reset();
        }
        status
    }

    /// Cancels whatever the tree is in the middle of.
    pub fn abort(&mut self) {
        let ctx = TickContext {
            delta_time: 0.,
            frame: self.frame,
            debug: self.debug.as_deref(),
        };
        self.root.abort_in(&ctx);
    }

    pub fn reset(&mut self) {
        self.root.reset();
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::capture(&self.root)
    }
}
