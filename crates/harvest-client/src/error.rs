use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// IntrospectionError represents a failed or malformed introspection exchange.
#[derive(Error, Debug)]
pub enum IntrospectionError {
    /// The `__schema.queryType.fields` request failed or could not be read.
    #[error("could not list the top-level queries")]
    QueryType {
        /// What went wrong underneath
        source: BoxError,
    },

    /// The `__type(name:)` request for a query's return type failed or could not be read.
    #[error("could not list the fields of type \"{type_name}\"")]
    TypeFields {
        /// The object type being introspected
        type_name: String,
        /// What went wrong underneath
        source: BoxError,
    },
}
