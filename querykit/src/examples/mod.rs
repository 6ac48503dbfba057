//! Runnable example flows.
//!
//! Each example drives the public API against an in-memory transport serving
//! canned video-game catalog records.
//!
//! - ex01: Select and decode - field selection, selective decoding, dynamic decoding
//! - ex02: Filters - comparisons, membership, combinators, sorting, registry misses
//! - ex03: Character profile - id fetches and a concurrent multi-entity aggregation

pub mod support;
pub mod models;

pub mod ex01_select_and_decode;
pub mod ex02_filters;
pub mod ex03_character_profile;

use anyhow::Result;

/// Run all examples in sequence.
pub async fn run_all() -> Result<()> {
    support::init_logging();

    log::info!("01. Select and decode...");
    ex01_select_and_decode::run().await?;

    log::info!("02. Filters...");
    ex02_filters::run().await?;

    log::info!("03. Character profile...");
    ex03_character_profile::run().await?;

    log::info!("all examples passed");
    Ok(())
}
