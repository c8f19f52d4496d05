//! Sequential task queue
//!
//! Later operations depend on the filesystem effects of earlier ones
//! (install needs the clone), so at most one operation runs at a time.

use tracing::Instrument;

use crate::error::OperationError;
use crate::host::Host;
use crate::operation::{Operation, Step};

/// An ordered list of operations, run one at a time until the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQueue {
    operations: Vec<Operation>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Builder form of [`TaskQueue::push`].
    pub fn then(mut self, operation: Operation) -> Self {
        self.push(operation);
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn steps(&self) -> Vec<Step> {
        self.operations.iter().map(Operation::step).collect()
    }

    /// Run every operation in order. Stops at, and returns, the first
    /// failure; operations after it never start. An empty queue succeeds.
    pub async fn run(self, host: &Host) -> Result<(), OperationError> {
        for operation in self.operations {
            let span = tracing::debug_span!("operation", step = %operation.step());
            operation.execute(host).instrument(span).await?;
        }
        Ok(())
    }
}

impl FromIterator<Operation> for TaskQueue {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl Extend<Operation> for TaskQueue {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        self.operations.extend(iter);
    }
}
