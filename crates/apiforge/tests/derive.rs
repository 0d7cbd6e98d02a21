use apiforge::{Describe, Kind, Registry, SchemaError};
use insta::assert_json_snapshot;
use serde::Serialize;
use serde_json::{Value, json};

/// A registered account.
#[derive(Serialize, Describe)]
#[serde(rename_all = "camelCase")]
struct Account {
    #[schema(minimum = 1, read_only)]
    account_id: u64,

    /// Name shown to other users
    #[schema(min_length = 1, max_length = 64)]
    display_name: String,

    #[serde(rename = "mail")]
    #[schema(format = "email", pattern = "^[^@]+@[^@]+$")]
    email_address: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    nickname: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(enum = "admin,editor,viewer", unique_items)]
    roles: Vec<String>,

    #[serde(skip)]
    password_hash: String,

    #[schema(hidden)]
    internal_score: f64,
}

#[derive(Serialize, Describe)]
struct Page<T: Serialize> {
    items: Vec<T>,
    #[schema(maximum = 100)]
    limit: u8,
}

#[derive(Describe)]
#[schema(name = "Marker")]
struct Unit;

#[derive(Describe)]
struct Payment {
    #[schema(json = "card_number,omitempty", dependent_required = "cvc")]
    card: String,
    #[schema(json = "cvc,omitempty")]
    security_code: String,
    #[schema(required)]
    note: Option<String>,
}

#[derive(Describe)]
struct Shadowed {
    #[schema(json = "id")]
    first: String,
    #[schema(json = "id")]
    second: String,
}

#[derive(Serialize, Describe)]
struct Session {
    id: u64,
    #[serde(skip)]
    started: std::time::Instant,
    #[serde(skip_serializing)]
    lock: std::sync::Mutex<()>,
}

#[derive(Describe)]
struct Raw {
    r#type: String,
}

fn schema_of<T: Describe>(name: &str) -> Value {
    let mut registry = Registry::new();
    registry.schema::<T>().unwrap();
    serde_json::to_value(registry.get(name).unwrap()).unwrap()
}

#[test]
fn serde_attributes_shape_the_schema() {
    assert_json_snapshot!(schema_of::<Account>("Account"), @r#"
    {
      "type": "object",
      "description": "A registered account.",
      "properties": {
        "accountId": {
          "type": "integer",
          "format": "uint64",
          "minimum": 1,
          "readOnly": true
        },
        "displayName": {
          "type": "string",
          "description": "Name shown to other users",
          "minLength": 1,
          "maxLength": 64
        },
        "mail": {
          "type": "string",
          "format": "email",
          "pattern": "^[^@]+@[^@]+$"
        },
        "nickname": {
          "type": "string"
        },
        "roles": {
          "type": "array",
          "items": {
            "type": "string",
            "enum": [
              "admin",
              "editor",
              "viewer"
            ]
          },
          "uniqueItems": true
        }
      },
      "required": [
        "accountId",
        "displayName",
        "mail"
      ]
    }
    "#);
}

#[test]
fn generic_instantiations_get_composed_names() {
    let mut registry = Registry::new();
    let accounts = registry.schema::<Page<Account>>().unwrap();
    let counts = registry.schema::<Page<u32>>().unwrap();

    assert_eq!(accounts.ref_path(), Some("#/components/schemas/PageAccount"));
    assert_eq!(counts.ref_path(), Some("#/components/schemas/PageUint32"));

    let page = serde_json::to_value(registry.get("PageAccount").unwrap()).unwrap();
    assert_eq!(
        page["properties"]["items"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/Account"}})
    );
    assert_eq!(
        page["properties"]["limit"],
        json!({"type": "integer", "format": "uint8", "maximum": 100})
    );
}

#[test]
fn container_name_attribute_overrides_the_ident() {
    let descriptor = Unit::descriptor();
    assert_eq!(descriptor.name(), "Marker");
    assert!(matches!(descriptor.kind(), Kind::Struct(fields) if fields.is_empty()));
    assert_eq!(schema_of::<Unit>("Marker"), json!({"type": "object", "properties": {}}));
}

#[test]
fn json_tags_rename_and_relax_required() {
    assert_eq!(
        schema_of::<Payment>("Payment"),
        json!({
            "type": "object",
            "properties": {
                "card_number": {"type": "string"},
                "cvc": {"type": "string"},
                "note": {"type": "string"}
            },
            "required": ["note"],
            "dependentRequired": {"card_number": ["cvc"]}
        })
    );
}

#[test]
fn duplicate_property_names_are_rejected() {
    let err = Registry::new().schema::<Shadowed>().unwrap_err();
    assert!(matches!(err, SchemaError::InvalidConstraint { ref field, .. } if field == "second"));
}

#[test]
fn raw_identifiers_lose_their_prefix() {
    let schema = schema_of::<Raw>("Raw");
    assert_eq!(schema["required"], json!(["type"]));
}

#[test]
fn serde_skipped_fields_need_no_schema() {
    assert_eq!(Session::descriptor().name(), "Session");
    assert_eq!(
        schema_of::<Session>("Session"),
        json!({
            "type": "object",
            "properties": {"id": {"type": "integer", "format": "uint64"}},
            "required": ["id"]
        })
    );
}
