//! Example 02 – Filters
//!
//! Demonstrates building `where` conditions from typed field references:
//! - comparison operators and membership tests
//! - `and` / `or` combinators (and the `&` / `|` sugar)
//! - sort, limit and offset clauses
//! - what happens when a reference has no registry entry

use anyhow::{Result, ensure};
use chrono::{TimeZone, Utc};

use super::models::{Artwork, Game, GameCharacter};
use super::support;
use crate::errors::RegistryMiss;
use crate::filter::Filter;
use crate::query::{QueryBuilder, SortOrder};
use crate::Queryable;

pub async fn run() -> Result<()> {
    support::init_logging();
    let game = Game::fields();

    let filter = game.name.eq("x").and(game.id.gt(1));
    ensure!(filter.to_condition() == r#"(name = "x" & id > 1)"#);

    let released = Utc.with_ymd_and_hms(2015, 5, 19, 0, 0, 0).single();
    let recent = game.first_release_date.ge(released) | game.summary.ne(None::<String>);
    ensure!(recent.to_condition() == "(first_release_date >= 1431993600 | summary != null)");

    let characters = GameCharacter::fields();
    let membership = characters.games.is_in([1942, 11169]) & characters.gender.eq(0);
    ensure!(membership.to_condition() == "(games = (1942,11169) & gender = 0)");

    let by_ids = Filter::is_in(Artwork::fields().id, vec![1, 2, 3]);
    ensure!(by_ids.to_condition() == "id = (1,2,3)");

    let query = QueryBuilder::<Game>::new()
        .select(|f| [f.id, f.name, f.first_release_date])
        .filter(recent)
        .sort_by(game.first_release_date, SortOrder::Desc)
        .limit(10)
        .offset(20);
    log::info!("built query:\n{query}");
    ensure!(
        query.build()
            == "fields id,name,first_release_date;\n\
                where (first_release_date >= 1431993600 | summary != null);\n\
                sort first_release_date desc;\n\
                limit 10;\n\
                offset 20;"
    );

    // `favorite` is local state with no registry entry: its fragments drop out.
    let partial = QueryBuilder::<Game>::new()
        .select(|f| [f.name, f.favorite])
        .filter_by(|f| f.favorite.eq(true).and(f.id.eq(1)))
        .sort(game.favorite);
    ensure!(partial.build() == "fields name;\nwhere ( & id = 1);");
    ensure!(partial.registry_misses().len() == 3);
    ensure!(partial.registry_misses()[0] == RegistryMiss::new("Game", "favorite"));
    ensure!(Game::field_name(game.favorite).is_none());

    Ok(())
}
