//! Example 03 – Character Profile
//!
//! Assembles a character profile from four endpoints:
//! 1. the character itself, fetched by id
//! 2. its mugshot and its games, fetched concurrently
//! 3. the artworks of those games, grouped per game

use std::collections::HashMap;

use anyhow::{Result, ensure};

use super::models::{Artwork, CharacterMugshot, Game, GameCharacter};
use super::support;
use crate::client::{Client, Fetchable, Transport};
use crate::config::ClientConfig;
use crate::errors::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub struct GameWithArtwork {
    pub game: Game,
    pub artworks: Vec<Artwork>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterProfile {
    pub character: GameCharacter,
    pub mugshot: Option<CharacterMugshot>,
    pub games: Vec<GameWithArtwork>,
}

/// Load a character with its mugshot, games and their artworks.
///
/// Returns `Ok(None)` when no character has the given id.
pub async fn load_character_profile<T: Transport>(
    client: &Client<T>,
    id: i64,
) -> Result<Option<CharacterProfile>, ClientError<T::Error>> {
    let Some(character) = client.fetch_one::<GameCharacter>(id).await? else {
        return Ok(None);
    };

    let game_ids = character.games.value().cloned().unwrap_or_default();
    let mugshot = async {
        match character.mugshot.value() {
            Some(&mugshot_id) => client.fetch_one::<CharacterMugshot>(mugshot_id).await,
            None => Ok(None),
        }
    };
    let games = client.fetch::<Game>(&game_ids);
    let (mugshot, games) = tokio::try_join!(mugshot, games)?;

    let artwork_ids: Vec<i64> = games
        .iter()
        .filter_map(|game| game.artworks.value())
        .flatten()
        .copied()
        .collect();
    let mut artworks_by_game: HashMap<i64, Vec<Artwork>> = HashMap::new();
    for artwork in client.fetch::<Artwork>(&artwork_ids).await? {
        if let Some(&game_id) = artwork.game.value() {
            artworks_by_game.entry(game_id).or_default().push(artwork);
        }
    }

    let games = games
        .into_iter()
        .map(|game| {
            let artworks = game
                .id
                .value()
                .and_then(|id| artworks_by_game.remove(id))
                .unwrap_or_default();
            GameWithArtwork { game, artworks }
        })
        .collect();

    Ok(Some(CharacterProfile {
        character,
        mugshot,
        games,
    }))
}

pub async fn run() -> Result<()> {
    support::init_logging();

    let config = ClientConfig::from_toml_str(
        r#"
        [query]
        warn_on_registry_miss = true
        "#,
    )?;
    let client = Client::with_config(support::catalog_transport()?, config);

    let profile = load_character_profile(&client, 4102)
        .await?
        .ok_or_else(|| anyhow::anyhow!("character 4102 should exist"))?;

    ensure!(profile.character.name.value().map(String::as_str) == Some("Geralt of Rivia"));
    ensure!(profile.character.country_name.is_null());
    ensure!(profile.character.description.is_unset());
    ensure!(profile.mugshot.as_ref().and_then(|m| m.image_id.value()).map(String::as_str) == Some("mugshot77"));
    ensure!(profile.games.len() == 2);
    ensure!(profile.games[0].artworks.len() == 2, "The Witcher 3 has two artworks");
    ensure!(profile.games[1].artworks.len() == 1, "Thronebreaker has one artwork");
    ensure!(profile.games[1].game.first_release_date.is_unset());

    let requests = client.transport().requests()?;
    let endpoints: Vec<&str> = requests.iter().map(|r| r.endpoint.as_str()).collect();
    ensure!(endpoints.len() == 4);
    ensure!(endpoints[0] == "characters" && endpoints[3] == "artworks");
    ensure!(requests[0].query == GameCharacter::fetch_query(&[4102]).build());
    ensure!(requests[3].query.starts_with("where id = (501,502,601);\nfields id,image_id,game;"));

    Ok(())
}
