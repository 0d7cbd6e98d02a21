use apiforge::route::{HttpMethod, ParameterLocation};
use apiforge::{BuildError, Builder, Describe, Descriptor, ErrorDetail, FieldDef};
use insta::assert_json_snapshot;
use serde_json::{Value, json};

/// A pet in the store.
#[derive(Describe)]
struct Pet {
    id: u64,
    name: String,
    owner: Option<Owner>,
}

#[derive(Describe)]
struct Owner {
    #[schema(format = "email")]
    email: String,
}

#[derive(Describe)]
struct PetSummary {
    id: u64,
}

fn document(builder: &Builder) -> Value {
    serde_json::to_value(builder.document()).unwrap()
}

fn pet_store() -> Result<Builder, BuildError> {
    let mut builder = Builder::new("Pet Store", "1.0.0");
    builder.description("Pets and their owners").bearer_auth();
    builder
        .server()
        .url("https://{region}.pets.example")
        .add_variable("region")
        .default("eu")
        .enum_values(["eu", "us"]);

    let mut list = builder.register(HttpMethod::Get, "/pets")?;
    list.operation_id("listPets").tag("pets").summary("List pets");
    list.request()
        .query_param::<u32>("limit")?
        .description("Page size")
        .example(20);
    list.response(200).description("All pets").body::<Vec<Pet>>()?;
    list.default_response()
        .description("Unexpected error")
        .content_type("application/problem+json")
        .body::<ErrorDetail>()?;

    let mut get = builder.register(HttpMethod::Get, "/pets/{id}")?;
    get.operation_id("getPet").tag("pets").security("BearerAuth", [] as [&str; 0]);
    get.request().path_param::<u64>("id")?;
    get.response(200)
        .body::<Pet>()?
        .example(json!({"id": 1, "name": "Rex"}));
    get.response(404).description("No such pet");

    Ok(builder)
}

#[test]
fn scenario_pet_store_document() {
    let builder = pet_store().unwrap();
    let doc = document(&builder);

    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["info"]["description"], "Pets and their owners");
    assert_eq!(
        doc["servers"][0]["variables"]["region"],
        json!({"enum": ["eu", "us"], "default": "eu"})
    );

    let schemas = doc["components"]["schemas"].as_object().unwrap();
    let names: Vec<&str> = schemas.keys().map(String::as_str).collect();
    assert_eq!(names, ["ErrorDetail", "Owner", "Pet"]);

    let schemes = doc["components"]["securitySchemes"].as_object().unwrap();
    let requirements = doc["paths"]["/pets/{id}"]["get"]["security"].as_array().unwrap();
    for requirement in requirements {
        for scheme in requirement.as_object().unwrap().keys() {
            assert!(schemes.contains_key(scheme), "undefined security scheme {scheme}");
        }
    }

    assert_json_snapshot!(doc["paths"]["/pets/{id}"], @r##"
    {
      "get": {
        "operationId": "getPet",
        "tags": [
          "pets"
        ],
        "parameters": [
          {
            "name": "id",
            "in": "path",
            "required": true,
            "schema": {
              "type": "integer",
              "format": "uint64"
            }
          }
        ],
        "responses": {
          "200": {
            "description": "",
            "content": {
              "application/json": {
                "schema": {
                  "$ref": "#/components/schemas/Pet"
                },
                "example": {
                  "id": 1,
                  "name": "Rex"
                }
              }
            }
          },
          "404": {
            "description": "No such pet"
          }
        },
        "security": [
          {
            "BearerAuth": []
          }
        ]
      }
    }
    "##);
}

#[test]
fn list_operation_uses_arrays_and_problem_content() {
    let doc = document(&pet_store().unwrap());
    let list = &doc["paths"]["/pets"]["get"];

    assert_eq!(
        list["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}})
    );
    assert_eq!(
        list["responses"]["default"]["content"]["application/problem+json"]["schema"],
        json!({"$ref": "#/components/schemas/ErrorDetail"})
    );
    assert_eq!(list["parameters"][0]["in"], "query");
    assert!(list["parameters"][0].get("required").is_none());
}

#[test]
fn anonymous_bodies_are_named_after_the_operation() {
    struct SearchInput;
    struct SearchOutput;

    let input = Descriptor::anonymous::<SearchInput>(vec![
        FieldDef::new::<String>("query"),
        FieldDef::new::<Owner>("owner"),
    ]);
    let output = Descriptor::anonymous::<SearchOutput>(vec![FieldDef::new::<Vec<Pet>>("pets")]);

    let mut builder = Builder::new("Search", "1.0.0");
    let mut op = builder.register(HttpMethod::Post, "/search").unwrap();
    op.operation_id("searchPets");
    op.request().body_of(&input).unwrap();
    op.response(200).body_of(&output).unwrap();

    let doc = document(&builder);
    let schemas = doc["components"]["schemas"].as_object().unwrap();
    assert!(schemas.contains_key("SearchPetsRequest"));
    assert!(schemas.contains_key("SearchPetsResponse200"));
    assert_eq!(
        doc["paths"]["/search"]["post"]["requestBody"],
        json!({
            "required": true,
            "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/SearchPetsRequest"}}
            }
        })
    );
}

#[test]
fn anonymous_leaf_bodies_are_inlined() {
    struct RenameInput;
    let input = Descriptor::anonymous::<RenameInput>(vec![FieldDef::new::<String>("name")]);

    let mut builder = Builder::new("Inline", "1.0.0");
    builder
        .register(HttpMethod::Patch, "/pets/{id}")
        .unwrap()
        .operation_id("renamePet")
        .request()
        .body_of(&input)
        .unwrap()
        .description("New name");

    let doc = document(&builder);
    assert!(doc.get("components").is_none());
    assert_eq!(
        doc["paths"]["/pets/{id}"]["patch"]["requestBody"]["content"]["application/json"]["schema"],
        json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        })
    );
}

#[test]
fn named_bodies_have_one_representation_regardless_of_order() {
    let mut builder = Builder::new("Order", "1.0.0");
    builder
        .register(HttpMethod::Put, "/owners/a")
        .unwrap()
        .request()
        .body::<Owner>()
        .unwrap();
    builder
        .register(HttpMethod::Put, "/owners/b")
        .unwrap()
        .request()
        .body::<Vec<Owner>>()
        .unwrap();
    builder
        .register(HttpMethod::Put, "/owners/c")
        .unwrap()
        .request()
        .body::<Owner>()
        .unwrap();

    let doc = document(&builder);
    let schema_at = |path: &str| {
        doc["paths"][path]["put"]["requestBody"]["content"]["application/json"]["schema"].clone()
    };
    let reference = json!({"$ref": "#/components/schemas/Owner"});
    assert_eq!(schema_at("/owners/a"), reference);
    assert_eq!(schema_at("/owners/c"), reference);
    assert_eq!(schema_at("/owners/b"), json!({"type": "array", "items": reference}));
    assert_eq!(
        doc["components"]["schemas"]["Owner"],
        json!({
            "type": "object",
            "properties": {"email": {"type": "string", "format": "email"}},
            "required": ["email"]
        })
    );
}

#[test]
fn first_response_body_wins_until_replaced() {
    let mut builder = Builder::new("Bodies", "1.0.0");
    let mut op = builder.register(HttpMethod::Get, "/pets/{id}/summary").unwrap();
    op.response(200).body::<Pet>().unwrap();
    op.response(200).body::<PetSummary>().unwrap();

    let schema_at = |builder: &Builder| {
        document(builder)["paths"]["/pets/{id}/summary"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"]
            .clone()
    };
    assert_eq!(schema_at(&builder), json!({"$ref": "#/components/schemas/Pet"}));

    let mut op = builder.register(HttpMethod::Get, "/pets/{id}/summary").unwrap();
    op.response(200)
        .body::<Pet>()
        .unwrap()
        .schema::<PetSummary>()
        .unwrap();
    assert_eq!(
        schema_at(&builder),
        json!({"$ref": "#/components/schemas/PetSummary"})
    );
}

#[test]
fn request_content_types_apply_per_body() {
    let mut builder = Builder::new("Upload", "1.0.0");
    let mut op = builder.register(HttpMethod::Post, "/pets").unwrap();
    let mut request = op.request();
    request.content_type("application/xml").body::<Pet>().unwrap();
    request.body::<Pet>().unwrap().required(false);

    let doc = document(&builder);
    let body = &doc["paths"]["/pets"]["post"]["requestBody"];
    assert_eq!(body["required"], false);
    let content: Vec<&str> = body["content"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(content, ["application/json", "application/xml"]);
}

#[test]
fn response_headers_and_links() {
    let mut builder = Builder::new("Links", "1.0.0");
    let mut op = builder.register(HttpMethod::Post, "/pets").unwrap();
    let mut created = op.response(201);
    created
        .description("Created")
        .header::<String>("Location")
        .unwrap()
        .description("URL of the new pet")
        .required(true);
    created
        .link("GetPet")
        .operation_id("getPet")
        .unwrap()
        .add_param("id", "$response.body#/id");

    let err = created
        .link("Other")
        .operation_ref("#/paths/~1pets~1{id}/get")
        .unwrap()
        .operation_id("getPet")
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Conflict { first: "operationId", second: "operationRef" }
    ));

    let doc = document(&builder);
    let response = &doc["paths"]["/pets"]["post"]["responses"]["201"];
    assert_eq!(
        response["headers"]["Location"],
        json!({"description": "URL of the new pet", "required": true, "schema": {"type": "string"}})
    );
    assert_eq!(
        response["links"]["GetPet"],
        json!({"operationId": "getPet", "parameters": {"id": "$response.body#/id"}})
    );
}

#[test]
fn callbacks_need_an_event_and_path() {
    let mut builder = Builder::new("Hooks", "1.0.0");
    let mut op = builder.register(HttpMethod::Post, "/subscriptions").unwrap();

    assert!(matches!(
        op.callback("", HttpMethod::Post, "{$request.body#/url}").map(|_| ()),
        Err(BuildError::MissingEvent)
    ));
    assert!(matches!(
        op.callback("petAdded", HttpMethod::Post, "").map(|_| ()),
        Err(BuildError::MissingPath)
    ));

    op.callback("petAdded", HttpMethod::Post, "{$request.body#/url}")
        .unwrap()
        .request()
        .body::<Pet>()
        .unwrap();

    let doc = document(&builder);
    let callback = &doc["paths"]["/subscriptions"]["post"]["callbacks"]["petAdded"];
    let body = &callback["{$request.body#/url}"]["post"]["requestBody"];
    assert_eq!(
        body["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/Pet"})
    );
}

#[test]
fn parameter_location_can_be_overridden() {
    let mut builder = Builder::new("Params", "1.0.0");
    builder
        .register(HttpMethod::Get, "/pets")
        .unwrap()
        .request()
        .query_param::<String>("session")
        .unwrap()
        .location(ParameterLocation::Cookie)
        .deprecated(true);

    let doc = document(&builder);
    let param = &doc["paths"]["/pets"]["get"]["parameters"][0];
    assert_eq!(param["in"], "cookie");
    assert_eq!(param["deprecated"], true);
}

#[test]
fn schema_errors_surface_through_the_builder() {
    #[derive(Describe)]
    struct Bad {
        #[schema(minimum = "low")]
        count: u32,
    }

    let mut builder = Builder::new("Errors", "1.0.0");
    let err = builder
        .register(HttpMethod::Post, "/bad")
        .unwrap()
        .request()
        .body::<Bad>()
        .map(|_| ())
        .unwrap_err();

    assert!(matches!(err, BuildError::Schema(_)));
    assert!(builder.registry().is_empty());
}

#[test]
fn into_document_keeps_registered_schemas() {
    let doc = pet_store().unwrap().into_document();
    let schemas = doc.components.unwrap().schemas.unwrap();
    assert!(schemas.contains_key("Pet"));
    assert!(schemas.contains_key("Owner"));
}
