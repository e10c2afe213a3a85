//! Schema introspection for the harvester.
//!
//! Asks a GraphQL endpoint about its own schema and turns the answers into
//! [`QueryDescriptor`]s: one record per top-level query with its arguments,
//! its return type and, for object return types, the fields of that object.

mod descriptor;
mod error;
pub mod introspection;

pub use descriptor::{ArgDescriptor, FieldDescriptor, QueryDescriptor, TypeKind, TypeRef};
pub use error::IntrospectionError;
pub use introspection::{Introspector, QueryField};
