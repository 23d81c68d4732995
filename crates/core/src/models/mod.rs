//! Shared domain models.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameCategory {
    /// Fast reflex-driven games.
    Action,
    /// Exploration and story games.
    Adventure,
    /// Logic and brain teasers.
    Puzzle,
    /// Driving and racing games.
    Racing,
    /// Planning and empire building.
    Strategy,
    /// Shooters of any perspective.
    Shooter,
    /// Sports simulations.
    Sports,
    /// Role-playing games.
    Rpg,
    /// Management and life simulations.
    Simulation,
    /// Classic arcade games.
    Arcade,
    /// Relaxed, short-session games.
    Casual,
    /// Learning games.
    Educational,
}

impl GameCategory {
    /// Every category in display order.
    pub const ALL: [GameCategory; 12] = [
        GameCategory::Action,
        GameCategory::Adventure,
        GameCategory::Puzzle,
        GameCategory::Racing,
        GameCategory::Strategy,
        GameCategory::Shooter,
        GameCategory::Sports,
        GameCategory::Rpg,
        GameCategory::Simulation,
        GameCategory::Arcade,
        GameCategory::Casual,
        GameCategory::Educational,
    ];

    /// Lowercase tag used in URLs and catalog files.
    pub fn as_str(self) -> &'static str {
        match self {
            GameCategory::Action => "action",
            GameCategory::Adventure => "adventure",
            GameCategory::Puzzle => "puzzle",
            GameCategory::Racing => "racing",
            GameCategory::Strategy => "strategy",
            GameCategory::Shooter => "shooter",
            GameCategory::Sports => "sports",
            GameCategory::Rpg => "rpg",
            GameCategory::Simulation => "simulation",
            GameCategory::Arcade => "arcade",
            GameCategory::Casual => "casual",
            GameCategory::Educational => "educational",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            GameCategory::Rpg => "RPG",
            GameCategory::Action => "Action",
            GameCategory::Adventure => "Adventure",
            GameCategory::Puzzle => "Puzzle",
            GameCategory::Racing => "Racing",
            GameCategory::Strategy => "Strategy",
            GameCategory::Shooter => "Shooter",
            GameCategory::Sports => "Sports",
            GameCategory::Simulation => "Simulation",
            GameCategory::Arcade => "Arcade",
            GameCategory::Casual => "Casual",
            GameCategory::Educational => "Educational",
        }
    }
}

/// Closed set of difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameDifficulty {
    /// Suitable for anyone.
    Easy,
    /// Some experience helps.
    Medium,
    /// For experienced players.
    Hard,
    /// For veterans of the genre.
    Expert,
}

impl GameDifficulty {
    /// Every value in display order.
    pub const ALL: [GameDifficulty; 4] = [
        GameDifficulty::Easy,
        GameDifficulty::Medium,
        GameDifficulty::Hard,
        GameDifficulty::Expert,
    ];

    /// Lowercase tag used in URLs and catalog files.
    pub fn as_str(self) -> &'static str {
        match self {
            GameDifficulty::Easy => "easy",
            GameDifficulty::Medium => "medium",
            GameDifficulty::Hard => "hard",
            GameDifficulty::Expert => "expert",
        }
    }
}

/// Platforms a game can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePlatform {
    /// Runs in a browser.
    Web,
    /// Phones.
    Mobile,
    /// Desktop operating systems.
    Desktop,
    /// Tablets.
    Tablet,
}

impl GamePlatform {
    /// Every value in display order.
    pub const ALL: [GamePlatform; 4] = [
        GamePlatform::Web,
        GamePlatform::Mobile,
        GamePlatform::Desktop,
        GamePlatform::Tablet,
    ];

    /// Lowercase tag used in URLs and catalog files.
    pub fn as_str(self) -> &'static str {
        match self {
            GamePlatform::Web => "web",
            GamePlatform::Mobile => "mobile",
            GamePlatform::Desktop => "desktop",
            GamePlatform::Tablet => "tablet",
        }
    }
}

/// Special boolean attributes that can be required by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameFlag {
    /// Promoted by the catalog editors.
    Featured,
    /// Recently added.
    New,
    /// Currently popular.
    Trending,
}

impl GameFlag {
    /// Every flag in display order.
    pub const ALL: [GameFlag; 3] = [GameFlag::Featured, GameFlag::New, GameFlag::Trending];

    /// Lowercase tag used in URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            GameFlag::Featured => "featured",
            GameFlag::New => "new",
            GameFlag::Trending => "trending",
        }
    }
}

macro_rules! impl_tag_parsing {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = UnknownTag;

                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    let needle = value.trim();
                    <$ty>::ALL
                        .into_iter()
                        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(needle))
                        .ok_or_else(|| UnknownTag(value.to_string()))
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_tag_parsing!(GameCategory, GameDifficulty, GamePlatform, GameFlag);

/// A tag string that does not name any known enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tag `{}`", self.0)
    }
}

impl std::error::Error for UnknownTag {}

/// Aggregated user rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GameRating {
    /// Average stars, 0.0 to 5.0.
    pub average: f32,
    /// Number of ratings submitted.
    pub count: u32,
}

/// Featured / new / trending markers carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GameFlags {
    /// Shown in the featured carousel.
    pub featured: bool,
    /// Listed under new releases.
    pub is_new: bool,
    /// Listed under trending.
    pub trending: bool,
}

impl GameFlags {
    /// Whether the given flag is set.
    pub fn has(&self, flag: GameFlag) -> bool {
        match flag {
            GameFlag::Featured => self.featured,
            GameFlag::New => self.is_new,
            GameFlag::Trending => self.trending,
        }
    }
}

/// One entry of the game catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Unique, stable identifier.
    pub id: String,
    /// URL-friendly identifier.
    pub slug: String,
    /// Display title, searched by text queries.
    pub title: String,
    /// Long description, searched by text queries.
    pub description: String,
    /// One-line teaser.
    #[serde(default)]
    pub short_description: String,
    /// Primary category.
    pub category: GameCategory,
    /// Difficulty level.
    pub difficulty: GameDifficulty,
    /// Supported platforms.
    #[serde(default)]
    pub platforms: Vec<GamePlatform>,
    /// Free-form tags in display order, searched by text queries.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Featured, new and trending markers.
    #[serde(flatten)]
    pub flags: GameFlags,
    /// Aggregated user rating.
    #[serde(default)]
    pub rating: GameRating,
    /// Number of recorded plays.
    #[serde(default)]
    pub play_count: u64,
    /// Studio or author name.
    #[serde(default)]
    pub developer: String,
    /// First public release.
    pub release_date: NaiveDate,
    /// Download size in megabytes.
    #[serde(default, rename = "fileSize")]
    pub file_size_mb: f32,
}

impl GameRecord {
    /// Returns a user-facing label combining title and developer.
    pub fn display_name(&self) -> String {
        if self.developer.is_empty() {
            self.title.clone()
        } else {
            format!("{} · {}", self.title, self.developer)
        }
    }

    /// Whether the game runs on `platform`.
    pub fn supports(&self, platform: GamePlatform) -> bool {
        self.platforms.contains(&platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("Puzzle".parse::<GameCategory>(), Ok(GameCategory::Puzzle));
        assert_eq!(" rpg ".parse::<GameCategory>(), Ok(GameCategory::Rpg));
        assert_eq!("EXPERT".parse::<GameDifficulty>(), Ok(GameDifficulty::Expert));
        assert_eq!("new".parse::<GameFlag>(), Ok(GameFlag::New));
        assert!("board".parse::<GameCategory>().is_err());
    }

    #[test]
    fn deserializes_camel_case_record() {
        let raw = r#"{
            "id": "1",
            "slug": "cyber-racer-2024",
            "title": "Cyber Racer 2024",
            "description": "Neon racing",
            "category": "racing",
            "difficulty": "medium",
            "platforms": ["web", "desktop"],
            "tags": ["racing", "cyberpunk"],
            "featured": true,
            "isNew": true,
            "trending": false,
            "rating": { "average": 4.5, "count": 120 },
            "playCount": 42000,
            "developer": "Neon Games Studio",
            "releaseDate": "2024-01-15",
            "fileSize": 45.2
        }"#;
        let record: GameRecord = serde_json::from_str(raw).expect("valid record");
        assert_eq!(record.category, GameCategory::Racing);
        assert!(record.flags.has(GameFlag::Featured));
        assert!(record.flags.has(GameFlag::New));
        assert!(!record.flags.has(GameFlag::Trending));
        assert!(record.supports(GamePlatform::Desktop));
        assert_eq!(record.play_count, 42000);
        assert_eq!(record.display_name(), "Cyber Racer 2024 · Neon Games Studio");
    }
}
