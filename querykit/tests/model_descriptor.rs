use chrono::{DateTime, Utc};
use querykit::{FieldState, FieldType, Json, Queryable, get_model_by_endpoint, get_model_by_name, registered_models};
use serde::Deserialize;

#[derive(Debug, Queryable)]
#[query(endpoint = "games")]
struct Game {
    id: FieldState<i64>,
    name: FieldState<String>,
    summary: FieldState<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Website {
    url: String,
}

#[derive(Debug, Queryable)]
struct Release {
    #[query(required)]
    id: FieldState<u64>,
    #[query(key = "first_release_date")]
    released_at: FieldState<DateTime<Utc>>,
    platforms: FieldState<Vec<i32>>,
    rating: FieldState<f64>,
    #[query(key = "cover.image_id")]
    cover_image: FieldState<String>,
    website: FieldState<Json<Website>>,
    #[query(skip)]
    note: String,
}

#[test]
fn wire_keys_default_to_field_names() {
    let f = Game::fields();
    assert_eq!(Game::field_name(f.id), Some("id"));
    assert_eq!(Game::field_name(f.name), Some("name"));
    assert_eq!(Game::field_name(f.summary), Some("summary"));
    assert_eq!(f.summary.wire_key(), Some("summary"));
}

#[test]
fn descriptor_lists_registered_fields_in_order() {
    let descriptor = Game::descriptor();
    assert_eq!(descriptor.model, "Game");
    assert_eq!(descriptor.endpoint, Some("games"));
    assert_eq!(descriptor.wire_keys().collect::<Vec<_>>(), ["id", "name", "summary"]);
    assert!(std::ptr::eq(descriptor, Game::descriptor()), "descriptor is built once");
}

#[test]
fn explicit_keys_and_types_are_recorded() {
    let descriptor = Release::descriptor();
    assert_eq!(descriptor.endpoint, None);
    assert_eq!(
        descriptor.wire_keys().collect::<Vec<_>>(),
        ["id", "first_release_date", "platforms", "rating", "cover.image_id", "website"]
    );

    let id = descriptor.field("id").unwrap();
    assert_eq!(id.field_type, FieldType::Integer);
    assert!(!id.optional);

    let released = descriptor.field("released_at").unwrap();
    assert_eq!(released.wire_key, "first_release_date");
    assert_eq!(released.field_type, FieldType::DateTime);
    assert!(released.optional);

    let platforms = descriptor.field_by_wire_key("platforms").unwrap();
    assert_eq!(platforms.field_type, FieldType::Array);
    assert_eq!(platforms.element_type, Some(FieldType::Integer));

    assert_eq!(descriptor.field("rating").unwrap().field_type, FieldType::Float);
    assert_eq!(descriptor.field("website").unwrap().field_type, FieldType::Any);
}

#[test]
fn skipped_fields_resolve_to_none() {
    let f = Release::fields();
    assert_eq!(f.note.name(), "note");
    assert_eq!(Release::field_name(f.note), None);
    assert!(Release::descriptor().field("note").is_none());
}

#[test]
fn same_wire_key_may_appear_in_several_models() {
    assert_eq!(Game::fields().id.wire_key(), Some("id"));
    assert_eq!(Release::fields().id.wire_key(), Some("id"));
}

#[derive(Debug, Queryable)]
#[query(endpoint = "franchises")]
struct Franchise {
    name: FieldState<String>,
    games: FieldState<Vec<i64>>,
}

#[test]
fn derived_models_are_registered() {
    let franchise = get_model_by_name("Franchise").expect("Franchise is registered");
    assert_eq!(franchise.endpoint, Some("franchises"));
    assert!(std::ptr::eq(franchise.descriptor(), Franchise::descriptor()));
    assert_eq!(franchise.descriptor().wire_keys().collect::<Vec<_>>(), ["name", "games"]);

    assert_eq!(get_model_by_endpoint("franchises").map(|m| m.type_name), Some("Franchise"));
    assert!(registered_models().any(|m| m.type_name == "Release" && m.endpoint.is_none()));
    assert!(registered_models().any(|m| m.type_name == "Game"));
    assert!(get_model_by_name("Unknown").is_none());
}
