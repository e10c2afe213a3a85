use serde::{Deserialize, Serialize};

/// The `kind` of an introspected type reference.
///
/// `ID` is not a kind the introspection schema defines, but descriptors
/// written by hand or by other tools use it for identifier fields, so it is
/// accepted and treated like [`TypeKind::Scalar`] wherever leaf fields matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    #[serde(rename = "ID")]
    Id,
    #[serde(other)]
    Unknown,
}

impl TypeKind {
    /// Whether a field of this kind can be selected without a nested selection set
    pub const fn is_leaf(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Id)
    }
}

/// A type reference as the endpoint reports it: a named type, or a `LIST` /
/// `NON_NULL` wrapper around another reference.
///
/// Introspection only asks for one level of `ofType`, so a reference is at
/// most two levels deep. `NON_NULL(LIST(NON_NULL(SCALAR)))` arrives as
/// `NON_NULL(LIST)` and its leaf kind is never seen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// A named, unwrapped type
    pub fn named(kind: TypeKind, name: impl Into<String>) -> TypeRef {
        TypeRef {
            kind,
            name: Some(name.into()),
            of_type: None,
        }
    }

    /// A `LIST` or `NON_NULL` wrapper around `inner`
    pub fn wrapping(kind: TypeKind, inner: TypeRef) -> TypeRef {
        TypeRef {
            kind,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    /// Kind of the type one level down, if this reference wraps one
    pub fn wrapped_kind(&self) -> Option<TypeKind> {
        self.of_type.as_ref().map(|inner| inner.kind)
    }

    /// Name of the type one level down, if this reference wraps a named type
    pub fn wrapped_name(&self) -> Option<&str> {
        self.of_type.as_ref().and_then(|inner| inner.name.as_deref())
    }

    /// Whether this reference, or the one it wraps, is a leaf kind
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf() || self.wrapped_kind().is_some_and(TypeKind::is_leaf)
    }

    /// The object type whose fields a query returning this reference selects
    /// from: an `OBJECT` itself, or the `OBJECT` inside a `LIST`.
    pub fn object_name(&self) -> Option<&str> {
        match self.kind {
            TypeKind::Object => self.name.as_deref(),
            TypeKind::List if self.wrapped_kind() == Some(TypeKind::Object) => {
                self.wrapped_name()
            }
            _ => None,
        }
    }
}

/// One declared argument of a top-level query
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ArgDescriptor {
    pub fn type_kind(&self) -> TypeKind {
        self.type_ref.kind
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_ref.name.as_deref()
    }

    pub fn wrapped_kind(&self) -> Option<TypeKind> {
        self.type_ref.wrapped_kind()
    }

    pub fn wrapped_name(&self) -> Option<&str> {
        self.type_ref.wrapped_name()
    }

    /// A `NON_NULL` argument must be supplied by the caller
    pub fn is_required(&self) -> bool {
        self.type_kind() == TypeKind::NonNull
    }
}

/// One field of the object a top-level query returns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

impl FieldDescriptor {
    pub fn type_kind(&self) -> TypeKind {
        self.type_ref.kind
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_ref.name.as_deref()
    }

    pub fn wrapped_kind(&self) -> Option<TypeKind> {
        self.type_ref.wrapped_kind()
    }

    pub fn wrapped_name(&self) -> Option<&str> {
        self.type_ref.wrapped_name()
    }

    /// Whether the field can be selected without a nested selection set
    pub fn is_leaf(&self) -> bool {
        self.type_ref.is_leaf()
    }
}

/// Everything the harvester needs to know about one top-level query.
///
/// `fields` is only populated when the return type is an object, directly or
/// inside a list; it is empty for every other return type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgDescriptor>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl QueryDescriptor {
    /// Whether any argument must be supplied by the caller
    pub fn has_required_args(&self) -> bool {
        self.args.iter().any(ArgDescriptor::is_required)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use speculoos::prelude::*;

    use super::*;

    fn list_of(kind: TypeKind, name: &str) -> TypeRef {
        TypeRef::wrapping(TypeKind::List, TypeRef::named(kind, name))
    }

    #[test]
    fn it_reads_an_introspected_descriptor() {
        let descriptor: QueryDescriptor = serde_json::from_value(json!({
            "name": "cityPartnerList",
            "description": null,
            "args": [
                {
                    "name": "cityId",
                    "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "Int" } },
                    "defaultValue": null
                },
                {
                    "name": "peerType",
                    "type": { "kind": "SCALAR", "name": "String", "ofType": null },
                    "defaultValue": "\"global\""
                }
            ],
            "returnType": { "kind": "LIST", "name": null, "ofType": { "kind": "OBJECT", "name": "CityPartner" } },
            "fields": [
                { "name": "id", "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "ID" } } },
                { "name": "city", "type": { "kind": "OBJECT", "name": "City", "ofType": null } }
            ]
        }))
        .unwrap();

        assert_eq!(descriptor.args[0].type_kind(), TypeKind::NonNull);
        assert_eq!(descriptor.args[0].wrapped_kind(), Some(TypeKind::Scalar));
        assert_eq!(descriptor.args[0].wrapped_name(), Some("Int"));
        assert_eq!(descriptor.args[1].default_value.as_deref(), Some("\"global\""));
        assert_eq!(descriptor.return_type.object_name(), Some("CityPartner"));
        assert!(descriptor.has_required_args());
        assert!(descriptor.fields[0].is_leaf());
        assert!(!descriptor.fields[1].is_leaf());
    }

    #[test]
    fn it_fills_defaults_for_missing_lists() {
        let descriptor: QueryDescriptor = serde_json::from_value(json!({
            "name": "metadata",
            "returnType": { "kind": "OBJECT", "name": "Metadata" }
        }))
        .unwrap();

        assert_that!(descriptor.args).is_empty();
        assert_that!(descriptor.fields).is_empty();
        assert_that!(descriptor.description).is_none();
        assert_that!(descriptor.has_required_args()).is_false();
    }

    #[test]
    fn it_keeps_unknown_kinds_readable() {
        let type_ref: TypeRef =
            serde_json::from_value(json!({ "kind": "SOMETHING_NEW", "name": "X" })).unwrap();
        assert_eq!(type_ref.kind, TypeKind::Unknown);
        assert!(!type_ref.is_leaf());
    }

    #[rstest]
    #[case::scalar(TypeRef::named(TypeKind::Scalar, "Float"), true)]
    #[case::id(TypeRef::named(TypeKind::Id, "ID"), true)]
    #[case::non_null_scalar(TypeRef::wrapping(TypeKind::NonNull, TypeRef::named(TypeKind::Scalar, "Int")), true)]
    #[case::list_of_scalar(list_of(TypeKind::Scalar, "Int"), true)]
    #[case::enum_kind(TypeRef::named(TypeKind::Enum, "PeerType"), false)]
    #[case::object(TypeRef::named(TypeKind::Object, "City"), false)]
    #[case::list_of_object(list_of(TypeKind::Object, "City"), false)]
    // the wrapped leaf sits two levels down and is out of reach
    #[case::non_null_list_of_scalar(
        TypeRef::wrapping(TypeKind::NonNull, TypeRef::wrapping(TypeKind::List, TypeRef::named(TypeKind::Scalar, "Int"))),
        false
    )]
    fn it_classifies_leaves_one_level_deep(#[case] type_ref: TypeRef, #[case] leaf: bool) {
        assert_eq!(type_ref.is_leaf(), leaf);
    }

    #[rstest]
    #[case::object(TypeRef::named(TypeKind::Object, "Metadata"), Some("Metadata"))]
    #[case::list_of_object(list_of(TypeKind::Object, "City"), Some("City"))]
    #[case::list_of_scalar(list_of(TypeKind::Scalar, "Int"), None)]
    #[case::scalar(TypeRef::named(TypeKind::Scalar, "JSON"), None)]
    #[case::non_null_object(TypeRef::wrapping(TypeKind::NonNull, TypeRef::named(TypeKind::Object, "City")), None)]
    fn it_finds_the_object_to_select_from(#[case] type_ref: TypeRef, #[case] expected: Option<&str>) {
        assert_eq!(type_ref.object_name(), expected);
    }

    #[test]
    fn it_writes_the_wire_shape() {
        let arg = ArgDescriptor {
            name: "year".to_string(),
            type_ref: TypeRef::named(TypeKind::Scalar, "Int"),
            default_value: None,
        };
        assert_eq!(
            serde_json::to_value(&arg).unwrap(),
            json!({
                "name": "year",
                "type": { "kind": "SCALAR", "name": "Int", "ofType": null },
                "defaultValue": null
            })
        );
    }
}
