//! Document execution seam
//!
//! Executors walk a parsed query document against a context value and
//! consult the [`SchemaRegistry`](crate::SchemaRegistry) to interpret member
//! maps and call resolver bindings. No executor ships with this crate.

use crate::error::Result;

/// Executes query documents against a context of type `T`
pub trait DocumentExecutor<T> {
    /// Parsed query document
    type Document;

    fn execute(&self, document: &Self::Document, context: T) -> Result<()>;
}
