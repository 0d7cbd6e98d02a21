//! Builds a small pet store document and prints it.
//!
//! ```sh
//! APIFORGE_TITLE="Pet Store" RUST_LOG=apiforge=debug cargo run --example basic
//! cargo run --example basic -- --html > reference.html
//! ```

use anyhow::Context;
use apiforge::route::HttpMethod;
use apiforge::{Builder, Config, Describe, ErrorDetail, scalar_html};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// A pet in the store.
#[derive(Serialize, Deserialize, Describe)]
#[serde(rename_all = "camelCase")]
struct Pet {
    #[schema(read_only)]
    id: u64,
    #[schema(min_length = 1, example = "Rex")]
    name: String,
    #[schema(enum = "dog,cat,bird")]
    species: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    owner: Option<Owner>,
}

#[derive(Serialize, Deserialize, Describe)]
struct Owner {
    #[schema(format = "email")]
    email: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut builder = Builder::with_config(Config::from_env());
    builder.bearer_auth().security("BearerAuth", [] as [&str; 0]);
    builder.license().name("MIT").identifier("MIT")?;

    let mut list = builder.register(HttpMethod::Get, "/pets")?;
    list.operation_id("listPets").tag("pets");
    list.request()
        .query_param::<u32>("limit")?
        .description("Maximum number of pets to return");
    list.response(200).description("All pets").body::<Vec<Pet>>()?;
    list.default_response()
        .description("Unexpected error")
        .content_type("application/problem+json")
        .body::<ErrorDetail>()?;

    let mut create = builder.register(HttpMethod::Post, "/pets")?;
    create.operation_id("createPet").tag("pets");
    create.request().body::<Pet>()?.description("Pet to add");
    let mut created = create.response(201);
    created
        .description("Created")
        .body::<Pet>()?
        .example(serde_json::json!({"id": 1, "name": "Rex", "species": "dog"}));
    created
        .link("GetPet")
        .operation_id("getPet")?
        .add_param("id", "$response.body#/id");

    let mut get = builder.register(HttpMethod::Get, "/pets/{id}")?;
    get.operation_id("getPet").tag("pets");
    get.request().path_param::<u64>("id")?;
    get.response(200).body::<Pet>()?;
    get.response(404).description("No such pet");

    let doc = builder.into_document();
    let output = if std::env::args().any(|arg| arg == "--html") {
        scalar_html(&doc, &serde_json::json!({"theme": "purple"}))
            .context("failed to render the reference page")?
    } else {
        doc.to_json_pretty()
            .context("failed to serialize the document")?
    };
    println!("{output}");
    Ok(())
}
