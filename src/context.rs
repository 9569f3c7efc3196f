use crate::DebugSink;
use std::fmt;

/// Per-tick input bundle.
///
/// It is a cheap `Copy` value that lives only for the duration of one `tick` call.
/// Nodes that need elapsed time across ticks accumulate `delta_time` themselves.
#[derive(Clone, Copy, Default)]
pub struct TickContext<'a> {
    /// Seconds since the previous tick.
    pub delta_time: f32,
    /// Frame counter, for diagnostics only.
    pub frame: u64,
    pub debug: Option<&'a dyn DebugSink>,
}

impl<'a> TickContext<'a> {
    pub fn new(delta_time: f32, frame: u64) -> Self {
        Self {
            delta_time,
            frame,
            debug: None,
        }
    }

    pub fn with_debug(self, sink: &'a dyn DebugSink) -> Self {
        Self {
            debug: Some(sink),
            ..self
        }
    }
}

impl fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickContext")
            .field("delta_time", &self.delta_time)
            .field("frame", &self.frame)
            .field("debug", &self.debug.is_some())
            .finish()
    }
}
