//! Builds argument-free query text from a [`QueryDescriptor`]

use harvest_client::{FieldDescriptor, QueryDescriptor};

/// The fields of `descriptor` that can be selected without a nested
/// selection set, in declaration order
pub fn scalar_fields(descriptor: &QueryDescriptor) -> impl Iterator<Item = &FieldDescriptor> {
    descriptor.fields.iter().filter(|field| field.is_leaf())
}

/// Renders a query selecting every scalar field of `descriptor`, or `None`
/// when it has none to select
pub fn synthesize(descriptor: &QueryDescriptor) -> Option<String> {
    let selection: String = scalar_fields(descriptor)
        .map(|field| format!("    {}\n", field.name))
        .collect();
    if selection.is_empty() {
        return None;
    }

    let query = format!("query {{\n  {} {{\n{selection}  }}\n}}\n", descriptor.name);
    tracing::trace!(name = %descriptor.name, %query, "synthesized query");
    Some(query)
}
