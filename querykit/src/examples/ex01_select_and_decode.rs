//! Example 01 – Select and Decode
//!
//! Demonstrates:
//! - selecting a subset of fields with typed references
//! - decoding a response that carries only those fields
//! - telling an absent field apart from an explicit null
//! - descriptor-driven decoding without a concrete model type

use anyhow::{Result, ensure};

use super::models::{Game, GameCharacter};
use super::support::{self, MemoryTransport};
use crate::client::Client;
use crate::decode::{FieldState, decode_json};
use crate::Queryable;

pub async fn run() -> Result<()> {
    support::init_logging();

    let transport = MemoryTransport::new().with_response("games", r#"[{"name": "Chess"}]"#)?;
    let client = Client::new(transport);

    let games: Vec<Game> = client
        .query::<Game>(|q| q.select(|f| [f.name, f.summary]).filter_by(|f| f.id.eq(1)).limit(1))
        .await?;

    let requests = client.transport().requests()?;
    ensure!(requests.len() == 1, "exactly one request is sent");
    ensure!(requests[0].endpoint == "games");
    ensure!(
        requests[0].query == "fields name,summary;\nwhere id = 1;\nlimit 1;",
        "unexpected query text: {}",
        requests[0].query
    );

    let [game] = games.as_slice() else {
        anyhow::bail!("expected one game, got {}", games.len());
    };
    ensure!(game.name == FieldState::Value("Chess".to_string()));
    ensure!(game.id.is_unset(), "id was not returned");
    ensure!(game.summary.is_unset(), "summary was requested but not returned");
    log::info!("decoded {game:?}");

    // Explicit nulls are kept apart from absent keys.
    let characters: Vec<GameCharacter> =
        decode_json(r#"[{"id": 9, "name": "Ciri", "country_name": null}]"#)?;
    let ciri = &characters[0];
    ensure!(ciri.country_name.is_null());
    ensure!(ciri.description.is_unset());
    ensure!(ciri.name.value().map(String::as_str) == Some("Ciri"));

    // The same record decoded against the descriptor alone.
    let record = serde_json::json!({"id": 9, "mug_shot": 12, "games": [1, 2]});
    let record = record.as_object().cloned().unwrap_or_default();
    let dynamic = GameCharacter::descriptor().decode_dynamic(&record)?;
    ensure!(dynamic.model() == "GameCharacter");
    ensure!(dynamic.present().collect::<Vec<_>>() == ["id", "games", "mugshot"]);
    ensure!(dynamic.get("url") == Some(&FieldState::Unset));

    Ok(())
}
