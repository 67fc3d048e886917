//! Steam Web API client
//!
//! The Web API exposes remote procedures as `interface/method/version` URL
//! paths (e.g. `ISteamUser/GetPlayerSummaries/v0002/`). This crate models
//! that as an explicit [`Endpoint`] builder rooted at an [`ApiClient`],
//! rather than an open-ended dynamic namespace: every call names its path
//! segments up front and returns an [`ApiResponse`] view over the JSON body.
//!
//! On top of the raw client sit thin read-models ([`SteamUser`],
//! [`SteamApp`] and friends) that memoize their backing API documents in a
//! per-instance [`PropertyCache`] with per-property TTLs.

pub mod app;
pub mod cache;
pub mod client;
pub mod error;
pub mod response;
pub mod user;

pub use app::{SteamAchievement, SteamApp};
pub use cache::{HOUR, INFINITE, MINUTE, PropertyCache, chunked};
pub use client::{ApiClient, ApiParams, Endpoint, HttpMethod, ParamValue};
pub use error::{Error, Result, classify_status};
pub use response::ApiResponse;
pub use user::{SteamGroup, SteamUser, SteamUserBadge};

/// Default Web API host.
pub const DEFAULT_API_URL: &str = "https://api.steampowered.com/";
