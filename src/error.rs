use std::alloc::Layout;
use thiserror::Error;

/// Errors reported by fallible queue operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The heap could not satisfy a node or text buffer allocation.
    ///
    /// The queue is left exactly as it was before the call.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    Alloc { layout: Layout },
}

impl QueueError {
    /// The layout of the allocation that failed.
    pub fn layout(&self) -> Layout {
        match self {
            QueueError::Alloc { layout } => *layout,
        }
    }
}
