//! Model layer
//!
//! Types delivered by the object source and the status vocabulary shared by
//! the graph code.

mod automation_kind;
mod object_status;
mod reconciled_object;

pub use automation_kind::AutomationKind;
pub use object_status::{Condition, ObjectStatus};
pub use reconciled_object::{GroupVersionKind, ReconciledObject, RootDescriptor, Snapshot};
