//! Poll-based bridge for work that outlives a single tick.
//!
//! A leaf created with [`crate::Node::async_action`] starts an operation on its
//! first tick and polls it on every following tick, reporting `Running` until it
//! completes. The tick thread never blocks on the operation.

use futures::channel::oneshot;

pub trait AsyncOperation {
    /// Polls the operation without blocking.
    fn is_completed(&mut self) -> bool;

    /// Consumes the outcome. Called exactly once, after `is_completed` returned `true`.
    fn take_result(&mut self) -> bool;

    /// Requests cancellation. Does not wait for the work to actually stop.
    fn cancel(&mut self);
}

/// Creates a one-shot operation completed from another thread or task.
pub fn channel() -> (Completion, ChannelOperation) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion { sender },
        ChannelOperation {
            receiver,
            result: None,
        },
    )
}

/// The worker side of [`channel`].
#[derive(Debug)]
pub struct Completion {
    sender: oneshot::Sender<bool>,
}

impl Completion {
    /// Delivers the outcome. Returns `false` if the operation was cancelled or dropped.
    pub fn complete(self, success: bool) -> bool {
        self.sender.send(success).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.sender.is_canceled()
    }
}

/// The node side of [`channel`]. A dropped [`Completion`] counts as a failure.
#[derive(Debug)]
pub struct ChannelOperation {
    receiver: oneshot::Receiver<bool>,
    result: Option<bool>,
}

impl AsyncOperation for ChannelOperation {
    fn is_completed(&mut self) -> bool {
        if self.result.is_some() {
            return true;
        }
        match self.receiver.try_recv() {
            Ok(Some(success)) => self.result = Some(success),
            Ok(None) => return false,
            Err(oneshot::Canceled) => self.result = Some(false),
        }
        true
    }

    fn take_result(&mut self) -> bool {
        self.result.take().unwrap_or(false)
    }

    fn cancel(&mut self) {
        self.receiver.close();
    }
}
