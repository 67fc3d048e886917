//! Minimal Notion REST client
//!
//! Covers the surface a database-synchronizing tool needs: create and
//! retrieve databases, resolve their data sources, query pages with cursor
//! pagination, and create or update pages. Property payloads are built with
//! the helpers in [`properties`] instead of hand-written JSON.

pub mod client;
pub mod error;
pub mod properties;

pub use client::{DEFAULT_NOTION_URL, Database, NOTION_VERSION, NotionClient, Page};
pub use error::{Error, Result};
