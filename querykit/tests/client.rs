use querykit::examples::support::{self, MemoryTransport, MemoryTransportError};
use querykit::{Client, ClientConfig, ClientError, DecodeError, FieldState, Fetchable, QueryBuilder, Queryable, SortOrder};

#[derive(Debug, Queryable)]
#[query(endpoint = "games")]
struct Game {
    id: FieldState<i64>,
    name: FieldState<String>,
    summary: FieldState<String>,
}

impl Fetchable for Game {
    type Model = Game;

    fn id_field(fields: GameFields) -> querykit::Field<Game> {
        fields.id
    }

    fn build_query(query: QueryBuilder<Game>) -> QueryBuilder<Game> {
        query.select(|f| [f.id, f.name]).sort_by(Game::fields().name, SortOrder::Asc)
    }
}

/// Declared without an endpoint; one must come from the config.
#[derive(Debug, Queryable)]
struct Platform {
    id: FieldState<i64>,
    abbreviation: FieldState<String>,
}

fn games_transport() -> MemoryTransport {
    MemoryTransport::new()
        .with_response("games", r#"[{"id": 1, "name": "Chess"}, {"id": 2, "name": "Go", "summary": null}]"#)
        .expect("canned body is valid")
}

#[tokio::test]
async fn query_sends_built_text_to_model_endpoint() {
    support::init_logging();
    let client = Client::new(games_transport());

    let games = client
        .query::<Game>(|q| q.select(|f| [f.name, f.summary]).filter_by(|f| f.id.eq(1)).limit(1))
        .await
        .unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].name, FieldState::Value("Chess".to_string()));
    assert!(games[1].summary.is_null());
    assert!(games[0].summary.is_unset());

    let requests = client.transport().requests().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].endpoint, "games");
    assert_eq!(requests[0].query, "fields name,summary;\nwhere id = 1;\nlimit 1;");
}

#[tokio::test]
async fn fetch_puts_id_filter_first() {
    let client = Client::new(games_transport());
    let games = client.fetch::<Game>(&[1, 2]).await.unwrap();
    assert_eq!(games.len(), 2);

    let requests = client.transport().requests().unwrap();
    assert_eq!(requests[0].query, "where id = (1,2);\nfields id,name;\nsort name asc;");
    assert_eq!(Game::fetch_query(&[1, 2]).build(), requests[0].query);
}

#[tokio::test]
async fn fetch_with_no_ids_skips_the_transport() {
    let client = Client::new(games_transport());
    let games = client.fetch::<Game>(&[]).await.unwrap();
    assert!(games.is_empty());
    assert!(client.transport().requests().unwrap().is_empty());
}

#[tokio::test]
async fn fetch_one_returns_first_record() {
    let client = Client::new(games_transport());
    let game = client.fetch_one::<Game>(1).await.unwrap().expect("a record is returned");
    assert_eq!(game.id, FieldState::Value(1));
}

#[tokio::test]
async fn config_supplies_missing_endpoint() {
    let transport = MemoryTransport::new()
        .with_response("platforms", r#"[{"id": 6, "abbreviation": "PC"}]"#)
        .unwrap();

    let unconfigured = Client::new(transport);
    let err = unconfigured.query::<Platform>(|q| q.select(|f| [f.abbreviation])).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingEndpoint { model: "Platform" }));

    let transport = MemoryTransport::new()
        .with_response("platforms", r#"[{"id": 6, "abbreviation": "PC"}]"#)
        .unwrap();
    let config = ClientConfig::default().with_endpoint("Platform", "platforms");
    let client = Client::with_config(transport, config);
    let platforms = client.query::<Platform>(|q| q.select(|f| [f.abbreviation])).await.unwrap();
    assert_eq!(platforms[0].abbreviation.value().map(String::as_str), Some("PC"));
}

#[tokio::test]
async fn config_override_wins_over_declared_endpoint() {
    let transport = MemoryTransport::new()
        .with_response("games_v2", r#"[{"id": 9}]"#)
        .unwrap();
    let config = ClientConfig::from_toml_str("[endpoints]\nGame = \"games_v2\"\n").unwrap();
    let client = Client::with_config(transport, config);
    let games = client.query::<Game>(|q| q.select(|f| [f.id])).await.unwrap();
    assert_eq!(games[0].id, FieldState::Value(9));
    assert_eq!(client.transport().requests().unwrap()[0].endpoint, "games_v2");
}

#[tokio::test]
async fn transport_errors_pass_through() {
    let client = Client::new(MemoryTransport::new());
    let err = client.query_at::<Game>("nowhere", |q| q.limit(1)).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(MemoryTransportError::UnknownEndpoint(ref endpoint)) if endpoint == "nowhere"
    ));
}

#[tokio::test]
async fn decode_errors_carry_record_index() {
    let transport = MemoryTransport::new()
        .with_response("games", r#"[{"id": 1}, {"id": 2}, {"name": false}]"#)
        .unwrap();
    let client = Client::new(transport);
    let err = client.query::<Game>(|q| q.select(|f| [f.name])).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(DecodeError::Record { index: 2, .. })));
}
