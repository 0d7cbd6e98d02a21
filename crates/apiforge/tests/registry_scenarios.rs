use apiforge::schema::SchemaRef;
use apiforge::{Describe, Registry, STRING_TYPE, SchemaError};
use insta::assert_json_snapshot;
use serde_json::json;

#[derive(Describe)]
struct Category {
    id: isize,
    name: String,
    tags: Vec<String>,
    parent: Option<Box<Category>>,
}

#[derive(Describe)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

#[derive(Describe)]
struct Author {
    name: String,
    books: Vec<Book>,
}

#[derive(Describe)]
struct Book {
    title: String,
    author: Option<Author>,
}

#[derive(Describe)]
struct Address {
    city: String,
}

#[derive(Describe)]
struct Shipment {
    destination: Address,
    return_to: Option<Address>,
}

mod v1 {
    use apiforge::Describe;

    #[derive(Describe)]
    #[schema(name = "Item")]
    pub struct Item {
        pub sku: String,
    }
}

mod v2 {
    use apiforge::Describe;

    #[derive(Describe)]
    #[schema(name = "Item")]
    pub struct Item {
        pub sku: String,
        pub quantity: u32,
    }
}

#[derive(Describe)]
struct Range {
    #[schema(minimum = 10, exclusive_minimum = 20)]
    low: i32,
}

#[derive(Describe)]
struct Valid {
    name: String,
}

#[derive(Describe)]
struct Broken {
    inner: Valid,
    #[schema(min_length = "-3")]
    code: String,
}

fn value(schema: &impl serde::Serialize) -> serde_json::Value {
    serde_json::to_value(schema).unwrap()
}

#[test]
fn scenario_struct_with_self_reference() {
    let mut registry = Registry::new();
    let reference = registry.schema::<Category>().unwrap();

    assert_eq!(reference.ref_path(), Some("#/components/schemas/Category"));
    assert_eq!(registry.len(), 1);
    assert_json_snapshot!(registry.get("Category").unwrap(), @r##"
    {
      "type": "object",
      "properties": {
        "id": {
          "type": "integer"
        },
        "name": {
          "type": "string"
        },
        "tags": {
          "type": "array",
          "items": {
            "type": "string"
          }
        },
        "parent": {
          "$ref": "#/components/schemas/Category"
        }
      },
      "required": [
        "id",
        "name",
        "tags"
      ]
    }
    "##);
}

#[test]
fn scenario_scalar_sentinel_is_inline() {
    let mut registry = Registry::new();
    let schema = registry.resolve(&STRING_TYPE.descriptor(), false, None).unwrap();

    assert_eq!(value(&schema), json!({"type": "string"}));
    assert!(registry.is_empty());
}

#[test]
fn resolving_twice_is_idempotent() {
    let mut registry = Registry::new();
    let first = registry.schema::<Shipment>().unwrap();
    let snapshot = serde_json::to_string(registry.get("Shipment").unwrap()).unwrap();
    let second = registry.schema::<Shipment>().unwrap();

    assert_eq!(first, second);
    assert_eq!(registry.len(), 2);
    assert_eq!(
        serde_json::to_string(registry.get("Shipment").unwrap()).unwrap(),
        snapshot
    );
}

#[test]
fn slice_of_self_terminates() {
    let mut registry = Registry::new();
    registry.schema::<TreeNode>().unwrap();

    assert_eq!(registry.len(), 1);
    let node = value(registry.get("TreeNode").unwrap());
    assert_eq!(
        node["properties"]["children"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/TreeNode"}})
    );
}

#[test]
fn mutual_recursion_yields_two_schemas() {
    let mut registry = Registry::new();
    registry.schema::<Author>().unwrap();

    let names: Vec<&str> = registry.schemas().map(|(name, _)| name).collect();
    assert_eq!(names, ["Author", "Book"]);

    let author = value(registry.get("Author").unwrap());
    let book = value(registry.get("Book").unwrap());
    assert_eq!(
        author["properties"]["books"]["items"],
        json!({"$ref": "#/components/schemas/Book"})
    );
    assert_eq!(
        book["properties"]["author"],
        json!({"$ref": "#/components/schemas/Author"})
    );

    // Starting from the other side changes nothing.
    registry.schema::<Book>().unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn optional_field_is_not_required() {
    let mut registry = Registry::new();
    registry.schema::<Shipment>().unwrap();

    let shipment = value(registry.get("Shipment").unwrap());
    assert_eq!(shipment["required"], json!(["destination"]));
}

#[test]
fn colliding_names_are_stable_across_runs() {
    let run = || {
        let mut registry = Registry::new();
        let a = registry.schema::<v1::Item>().unwrap();
        let b = registry.schema::<v2::Item>().unwrap();
        (a, b, registry.into_schemas())
    };

    let (a, b, schemas) = run();
    assert_eq!(a.ref_path(), Some("#/components/schemas/Item"));
    assert_eq!(b.ref_path(), Some("#/components/schemas/Item2"));

    let (a2, b2, schemas2) = run();
    assert_eq!((a, b), (a2, b2));
    assert_eq!(schemas, schemas2);
}

#[test]
fn bounds_are_accepted_verbatim() {
    let mut registry = Registry::new();
    registry.schema::<Range>().unwrap();

    let low = value(registry.get("Range").unwrap())["properties"]["low"].clone();
    assert_eq!(
        low,
        json!({"type": "integer", "format": "int32", "minimum": 10, "exclusiveMinimum": 20})
    );
}

#[test]
fn failed_resolution_leaves_nothing_behind() {
    let mut registry = Registry::new();
    let err = registry.schema::<Broken>().unwrap_err();

    assert!(matches!(err, SchemaError::InvalidConstraint { ref key, .. } if key == "minLength"));
    assert!(registry.is_empty());
    assert!(!registry.contains::<Valid>());
    assert!(!registry.contains::<Broken>());

    // The registry stays usable.
    assert!(matches!(
        registry.schema::<Valid>().unwrap(),
        SchemaRef::Ref(_)
    ));
}

#[test]
fn nested_failure_rolls_back_completed_siblings() {
    #[derive(Describe)]
    struct Outer {
        first: Valid,
        second: Inner,
    }

    #[derive(Describe)]
    struct Inner {
        lookup: std::collections::HashMap<u32, String>,
    }

    let mut registry = Registry::new();
    let err = registry.schema::<Outer>().unwrap_err();

    assert!(matches!(err, SchemaError::UnsupportedKeyType { .. }));
    assert!(registry.is_empty());
}
