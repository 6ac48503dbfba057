//! Video-game catalog models used by the examples.

use chrono::{DateTime, Utc};

use crate::client::Fetchable;
use crate::decode::FieldState;
use crate::query::{QueryBuilder, SortOrder};
use crate::Queryable;

#[derive(Debug, Clone, Default, PartialEq, Queryable)]
#[query(endpoint = "characters")]
pub struct GameCharacter {
    #[query(required)]
    pub id: FieldState<i64>,
    pub akas: FieldState<Vec<String>>,
    pub checksum: FieldState<String>,
    pub country_name: FieldState<String>,
    pub created_at: FieldState<DateTime<Utc>>,
    pub description: FieldState<String>,
    pub games: FieldState<Vec<i64>>,
    pub gender: FieldState<i64>,
    #[query(key = "mug_shot")]
    pub mugshot: FieldState<i64>,
    pub name: FieldState<String>,
    pub slug: FieldState<String>,
    pub species: FieldState<i64>,
    pub updated_at: FieldState<DateTime<Utc>>,
    pub url: FieldState<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Queryable)]
#[query(endpoint = "character_mug_shots")]
pub struct CharacterMugshot {
    pub id: FieldState<i64>,
    pub image_id: FieldState<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Queryable)]
#[query(endpoint = "games")]
pub struct Game {
    #[query(required)]
    pub id: FieldState<i64>,
    pub name: FieldState<String>,
    pub summary: FieldState<String>,
    pub artworks: FieldState<Vec<i64>>,
    pub cover: FieldState<i64>,
    pub first_release_date: FieldState<DateTime<Utc>>,
    /// Set locally by callers; never sent or received.
    #[query(skip)]
    pub favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Queryable)]
#[query(endpoint = "artworks")]
pub struct Artwork {
    pub id: FieldState<i64>,
    pub image_id: FieldState<String>,
    pub game: FieldState<i64>,
}

impl Fetchable for GameCharacter {
    type Model = GameCharacter;

    fn id_field(fields: GameCharacterFields) -> crate::field::Field<GameCharacter> {
        fields.id
    }

    fn build_query(query: QueryBuilder<GameCharacter>) -> QueryBuilder<GameCharacter> {
        query.select(|f| [f.id, f.name, f.akas, f.country_name, f.mugshot, f.games, f.created_at])
    }
}

impl Fetchable for CharacterMugshot {
    type Model = CharacterMugshot;

    fn id_field(fields: CharacterMugshotFields) -> crate::field::Field<CharacterMugshot> {
        fields.id
    }

    fn build_query(query: QueryBuilder<CharacterMugshot>) -> QueryBuilder<CharacterMugshot> {
        query.select(|f| [f.id, f.image_id])
    }
}

impl Fetchable for Game {
    type Model = Game;

    fn id_field(fields: GameFields) -> crate::field::Field<Game> {
        fields.id
    }

    fn build_query(query: QueryBuilder<Game>) -> QueryBuilder<Game> {
        query
            .select(|f| [f.id, f.name, f.artworks, f.first_release_date])
            .sort_by(Game::fields().first_release_date, SortOrder::Desc)
    }
}

impl Fetchable for Artwork {
    type Model = Artwork;

    fn id_field(fields: ArtworkFields) -> crate::field::Field<Artwork> {
        fields.id
    }

    fn build_query(query: QueryBuilder<Artwork>) -> QueryBuilder<Artwork> {
        query.select(|f| [f.id, f.image_id, f.game])
    }
}
