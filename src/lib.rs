//! Familiar Class Map Registry
//!
//! Declares which members of a Rust type take part in an external (GraphQL
//! style) schema, and with what metadata.
//!
//! ## Features
//!
//! - **Explicit type tables**: types publish their members through [`Reflect`]
//! - **Interface indirection**: members selected through an implemented
//!   interface resolve to the concrete class member via declared accessor
//!   bindings
//! - **Identity-based dedup**: a member is mapped at most once per class map
//! - **Append-only registry**: each class is registered exactly once
//! - **Snapshots**: export everything registered as JSON with a SHA256 fingerprint
//!
//! ## Example
//!
//! ```text
//! registry.register_with::<Droid, _>(|cm| {
//!     cm.map_property(Selector::<Droid, String>::member("id"))?.set_nullable(true);
//!     cm.map_property(Selector::<Droid, String>::through::<dyn Character>("name"))?;
//!     cm.map_interface::<dyn Character>()
//! })?;
//! ```

pub mod checksum;
pub mod class_map;
pub mod config;
pub mod error;
pub mod executor;
pub mod member_map;
pub mod reflect;
pub mod registry;
pub mod selector;
pub mod snapshot;
pub mod starwars;

pub use checksum::Checksum;
pub use class_map::{ClassMap, ClassMapInfo};
pub use config::{ClassMapConfig, ExportConfig, OutputFormat, RegistryConfig};
pub use error::{MappingError, Result};
pub use executor::DocumentExecutor;
pub use member_map::{MemberMap, MemberMapMut, ResolverBinding, ResolverFn};
pub use reflect::{
    Accessor, AccessorRole, InterfaceBinding, InterfaceBindingBuilder, MemberDescriptor,
    MemberKind, Reflect, TypeInfo, TypeKey, TypeKind,
};
pub use registry::SchemaRegistry;
pub use selector::{Selector, SelectorBody};
pub use snapshot::{ClassSnapshot, MemberSnapshot, RegistrySnapshot};
