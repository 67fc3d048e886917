//! Steam storefront client
//!
//! The storefront API (`store.steampowered.com/api`) is separate from the
//! Web API: no key, different host, and per-app JSON documents describing
//! what the store page shows (genres, price, release date, artwork). This
//! crate exposes the `appdetails` endpoint through [`StoreClient`] with
//! bounded retry and an in-memory details cache.

pub mod client;
pub mod error;
pub mod models;

pub use client::{DEFAULT_STORE_URL, StoreClient};
pub use error::{Error, Result};
pub use models::{
    AchievementsSummary, Category, Genre, Metacritic, Platforms, PriceOverview, ReleaseDate,
    Screenshot, StoreApp,
};
