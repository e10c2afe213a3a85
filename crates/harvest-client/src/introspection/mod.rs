use std::fmt::Debug;

use harvest_graphql::{GraphQLLayer, GraphQLRequest, GraphQLService, GraphQLServiceError};
use harvest_http::{
    error_on_status::{ErrorOnStatus, ErrorOnStatusLayer},
    HttpService,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tower::{Service, ServiceBuilder, ServiceExt};
use url::Url;

use crate::{ArgDescriptor, FieldDescriptor, IntrospectionError, QueryDescriptor, TypeRef};

/// Lists every top-level query with its arguments and return type
pub const QUERY_TYPE_QUERY: &str = include_str!("query_type.graphql");
/// Lists the fields of one named type, passed as the `$name` variable
pub const TYPE_FIELDS_QUERY: &str = include_str!("type_fields.graphql");

/// One entry of `__schema.queryType.fields`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QueryField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgDescriptor>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

#[derive(Debug, Deserialize)]
struct QueryTypeData {
    #[serde(rename = "__schema")]
    schema: SchemaData,
}

#[derive(Debug, Deserialize)]
struct SchemaData {
    #[serde(rename = "queryType")]
    query_type: QueryTypeFields,
}

#[derive(Debug, Deserialize)]
struct QueryTypeFields {
    fields: Vec<QueryField>,
}

#[derive(Debug, Deserialize)]
struct TypeFieldsData {
    #[serde(rename = "__type")]
    named_type: Option<NamedTypeFields>,
}

#[derive(Debug, Deserialize)]
struct NamedTypeFields {
    #[serde(default)]
    fields: Option<Vec<FieldDescriptor>>,
}

/// Describes top-level queries by introspecting a GraphQL endpoint.
///
/// Every call issues its own requests; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct Introspector {
    service: GraphQLService<ErrorOnStatus<HttpService>>,
}

impl Introspector {
    pub fn new(endpoint: Url, http_service: HttpService) -> Introspector {
        let service = ServiceBuilder::new()
            .layer(GraphQLLayer::new(endpoint))
            .layer(ErrorOnStatusLayer)
            .service(http_service);
        Introspector { service }
    }

    async fn execute<T>(&mut self, request: GraphQLRequest<T>) -> Result<T, GraphQLServiceError<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug + 'static,
    {
        let service = ServiceExt::<GraphQLRequest<T>>::ready(&mut self.service).await?;
        service.call(request).await
    }

    /// Fetches every top-level query the schema exposes, in schema order
    pub async fn query_fields(&mut self) -> Result<Vec<QueryField>, IntrospectionError> {
        let data = self
            .execute(GraphQLRequest::<QueryTypeData>::new(QUERY_TYPE_QUERY))
            .await
            .map_err(|err| IntrospectionError::QueryType {
                source: Box::new(err),
            })?;
        let fields = data.schema.query_type.fields;
        tracing::debug!(count = fields.len(), "listed top-level queries");
        Ok(fields)
    }

    /// Fetches the fields of the type called `type_name`.
    ///
    /// A type the schema does not know, or one without fields, yields no fields.
    pub async fn type_fields(
        &mut self,
        type_name: &str,
    ) -> Result<Vec<FieldDescriptor>, IntrospectionError> {
        let request = GraphQLRequest::<TypeFieldsData>::new(TYPE_FIELDS_QUERY)
            .with_variables(json!({ "name": type_name }));
        let data = self
            .execute(request)
            .await
            .map_err(|err| IntrospectionError::TypeFields {
                type_name: type_name.to_string(),
                source: Box::new(err),
            })?;
        let fields = data
            .named_type
            .and_then(|named_type| named_type.fields)
            .unwrap_or_default();
        tracing::debug!(type_name, count = fields.len(), "listed type fields");
        Ok(fields)
    }

    /// Completes `field` into a [`QueryDescriptor`], looking up the fields of
    /// its return type when that type is an object or a list of objects
    pub async fn describe(
        &mut self,
        field: QueryField,
    ) -> Result<QueryDescriptor, IntrospectionError> {
        let fields = match field.type_ref.object_name() {
            Some(type_name) => self.type_fields(type_name).await?,
            None => Vec::new(),
        };
        Ok(QueryDescriptor {
            name: field.name,
            description: field.description,
            args: field.args,
            return_type: field.type_ref,
            fields,
        })
    }

    /// Describes the top-level query called `name`, or `None` if the schema
    /// has no such query
    pub async fn describe_query(
        &mut self,
        name: &str,
    ) -> Result<Option<QueryDescriptor>, IntrospectionError> {
        let Some(field) = self
            .query_fields()
            .await?
            .into_iter()
            .find(|field| field.name == name)
        else {
            tracing::debug!(name, "query not found in schema");
            return Ok(None);
        };
        self.describe(field).await.map(Some)
    }
}
