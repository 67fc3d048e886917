//! Storefront app-details data model
//!
//! The storefront returns large, loosely-versioned JSON documents. Every
//! field beyond the appid is optional or defaulted so schema drift on
//! Valve's side degrades to missing data instead of a parse failure.

use serde::{Deserialize, Serialize};

/// The `data` payload of an `appdetails` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreApp {
    #[serde(rename = "type", default)]
    pub app_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steam_appid: u64,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub header_image: String,
    #[serde(default)]
    pub capsule_image: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub background_raw: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub price_overview: Option<PriceOverview>,
    #[serde(default)]
    pub platforms: Platforms,
    #[serde(default)]
    pub metacritic: Option<Metacritic>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub achievements: Option<AchievementsSummary>,
    #[serde(default)]
    pub release_date: ReleaseDate,
}

impl StoreApp {
    /// Genre descriptions, in storefront order.
    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.description.clone()).collect()
    }

    /// The best available wide background image for this app.
    pub fn background_image(&self) -> Option<&str> {
        self.background_raw
            .as_deref()
            .or(self.background.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Current price in the requester's region, in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOverview {
    pub currency: String,
    pub initial: u64,
    #[serde(rename = "final")]
    pub final_price: u64,
    #[serde(default)]
    pub discount_percent: u64,
    #[serde(default)]
    pub final_formatted: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Platforms {
    #[serde(default)]
    pub windows: bool,
    #[serde(default)]
    pub mac: bool,
    #[serde(default)]
    pub linux: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metacritic {
    pub score: u64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    // Genre IDs arrive as strings.
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: u64,
    #[serde(default)]
    pub path_thumbnail: String,
    #[serde(default)]
    pub path_full: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementsSummary {
    #[serde(default)]
    pub total: u64,
}

/// Free-form release date. `date` is a localized human string ("1 Nov,
/// 2000", "2025") and may be empty for unreleased titles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseDate {
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_document_parses() {
        let app: StoreApp = serde_json::from_str(r#"{"steam_appid": 70, "name": "Half-Life"}"#)
            .expect("parses");
        assert_eq!(app.steam_appid, 70);
        assert_eq!(app.name, "Half-Life");
        assert!(!app.is_free);
        assert!(app.genres.is_empty());
        assert!(!app.release_date.coming_soon);
        assert_eq!(app.release_date.date, "");
    }

    #[test]
    fn test_full_document_parses() {
        let app: StoreApp = serde_json::from_str(
            r#"{
                "type": "game",
                "name": "Half-Life",
                "steam_appid": 70,
                "is_free": false,
                "short_description": "Named Game of the Year.",
                "header_image": "https://cdn.example/header.jpg",
                "background_raw": "https://cdn.example/bg_raw.jpg",
                "developers": ["Valve"],
                "publishers": ["Valve"],
                "price_overview": {
                    "currency": "EUR", "initial": 819, "final": 819,
                    "discount_percent": 0, "final_formatted": "8,19€"
                },
                "platforms": {"windows": true, "mac": true, "linux": true},
                "metacritic": {"score": 96, "url": "https://metacritic.example/half-life"},
                "genres": [{"id": "1", "description": "Action"}],
                "achievements": {"total": 10},
                "release_date": {"coming_soon": false, "date": "8 Nov, 1998"}
            }"#,
        )
        .expect("parses");
        assert_eq!(app.genre_names(), vec!["Action"]);
        assert_eq!(app.price_overview.as_ref().unwrap().final_price, 819);
        assert!(app.platforms.linux);
        assert_eq!(app.background_image(), Some("https://cdn.example/bg_raw.jpg"));
        assert_eq!(app.release_date.date, "8 Nov, 1998");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let app: StoreApp = serde_json::from_str(
            r#"{"steam_appid": 70, "brand_new_field": {"nested": true}}"#,
        )
        .expect("parses");
        assert_eq!(app.steam_appid, 70);
    }

    #[test]
    fn test_background_falls_back() {
        let app = StoreApp {
            background: Some("https://cdn.example/bg.jpg".to_string()),
            ..StoreApp::default()
        };
        assert_eq!(app.background_image(), Some("https://cdn.example/bg.jpg"));
        assert_eq!(StoreApp::default().background_image(), None);
    }
}
