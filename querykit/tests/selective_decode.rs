use chrono::{TimeZone, Utc};
use querykit::{DecodeError, FieldState, Queryable, RawRecord, decode_json, decode_records};
use serde_json::{Value, json};

#[derive(Debug, PartialEq, Queryable)]
#[query(endpoint = "games")]
struct Game {
    id: FieldState<i64>,
    name: FieldState<String>,
    summary: FieldState<String>,
}

#[derive(Debug, Queryable)]
struct Character {
    #[query(required)]
    id: FieldState<i64>,
    akas: FieldState<Vec<String>>,
    #[query(key = "mug_shot")]
    mugshot: FieldState<i64>,
    created_at: FieldState<chrono::DateTime<Utc>>,
    #[query(skip)]
    seen: bool,
}

fn record(value: Value) -> RawRecord {
    value.as_object().cloned().expect("record literal must be an object")
}

#[test]
fn only_returned_fields_are_populated() {
    let game = Game::decode(&record(json!({"name": "Chess"}))).unwrap();
    assert_eq!(game.name, FieldState::Value("Chess".to_string()));
    assert_eq!(game.id, FieldState::Unset);
    assert_eq!(game.summary, FieldState::Unset);
}

#[test]
fn explicit_null_is_not_unset() {
    let game = Game::decode(&record(json!({"id": 1, "summary": null}))).unwrap();
    assert_eq!(game.id, FieldState::Value(1));
    assert!(game.summary.is_null());
    assert!(game.name.is_unset());
}

#[test]
fn unknown_payload_keys_are_ignored() {
    let game = Game::decode(&record(json!({"id": 3, "cover": 99, "url": "https://example.com"}))).unwrap();
    assert_eq!(game.id.value(), Some(&3));
}

#[test]
fn type_mismatch_reports_key_and_shape() {
    let err = Game::decode(&record(json!({"name": 42}))).unwrap_err();
    assert_eq!(err.key(), Some("name"));
    assert_eq!(err.to_string(), "field 'name' type mismatch: expected String, got integer");
}

#[test]
fn renamed_and_nested_values_decode() {
    let character = Character::decode(&record(json!({
        "id": 7,
        "akas": ["Gwynbleidd"],
        "mug_shot": 12,
        "created_at": 1_704_067_200
    })))
    .unwrap();
    assert_eq!(character.akas.value().map(Vec::len), Some(1));
    assert_eq!(character.mugshot, FieldState::Value(12));
    assert_eq!(
        character.created_at.into_value(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single()
    );
    assert!(!character.seen);
}

#[test]
fn required_field_rejects_null_but_allows_absence() {
    let err = Character::decode(&record(json!({"id": null}))).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedNull { ref key } if key == "id"));

    let character = Character::decode(&record(json!({"akas": []}))).unwrap();
    assert!(character.id.is_unset());
}

#[test]
fn decode_records_reports_failing_index() {
    let records = vec![record(json!({"id": 1})), record(json!({"id": "two"}))];
    let err = decode_records::<Game>(&records).unwrap_err();
    match &err {
        DecodeError::Record { index, source } => {
            assert_eq!(*index, 1);
            assert!(matches!(**source, DecodeError::TypeMismatch { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.key(), Some("id"));
}

#[test]
fn decode_json_handles_response_bodies() {
    let games: Vec<Game> = decode_json(r#"[{"id": 1, "name": "Chess"}, {"id": 2}]"#).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[1].name, FieldState::Unset);

    assert!(decode_json::<Game>("[]").unwrap().is_empty());
    assert!(matches!(decode_json::<Game>(r#"[1]"#), Err(DecodeError::NotAnObject { index: 0, .. })));
    assert!(matches!(decode_json::<Game>("not json"), Err(DecodeError::Json(_))));
}

#[test]
fn dynamic_decode_checks_declared_types() {
    let descriptor = Character::descriptor();

    let decoded = descriptor
        .decode_dynamic(&record(json!({"id": 7, "mug_shot": 12, "extra": true})))
        .unwrap();
    assert_eq!(decoded.model(), "Character");
    assert_eq!(decoded.get("mugshot"), Some(&FieldState::Value(json!(12))));
    assert_eq!(decoded.get("akas"), Some(&FieldState::Unset));
    assert_eq!(decoded.get("seen"), None);
    assert_eq!(decoded.present().collect::<Vec<_>>(), ["id", "mugshot"]);

    let err = descriptor
        .decode_dynamic(&record(json!({"akas": ["ok", 5]})))
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch { ref key, expected: "string", actual: "integer" } if key == "akas"
    ));
}

#[derive(Debug, Queryable)]
struct Edition {
    released: FieldState<chrono::DateTime<Utc>>,
    rank: FieldState<u8>,
    tags: FieldState<Vec<String>>,
    ports: FieldState<Vec<Option<i32>>>,
}

#[test]
fn dynamic_and_typed_decode_agree() {
    let payloads = [
        (json!({"released": "yesterday"}), false),
        (json!({"rank": 300}), false),
        (json!({"tags": ["a", null]}), false),
        (json!({"released": "2024-01-01T00:00:00Z", "rank": 255}), true),
        (json!({"tags": ["a"], "ports": [1, null]}), true),
    ];
    for (payload, ok) in payloads {
        let rec = record(payload.clone());
        let typed = Edition::decode(&rec);
        let dynamic = Edition::descriptor().decode_dynamic(&rec);
        assert_eq!(typed.is_ok(), ok, "typed decode of {payload}");
        assert_eq!(dynamic.is_ok(), ok, "dynamic decode of {payload}");
    }

    let err = Edition::descriptor()
        .decode_dynamic(&record(json!({"rank": 300})))
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch { ref key, expected: "u8", actual: "integer" } if key == "rank"
    ));

    let err = Edition::descriptor()
        .decode_dynamic(&record(json!({"tags": ["a", null]})))
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch { ref key, expected: "String", actual: "null" } if key == "tags"
    ));
}
