//! Built-in catalog shipped with the binary.

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::models::{
    GameCategory as C, GameDifficulty as D, GameFlags, GamePlatform as P, GameRating, GameRecord,
};

/// The static game list, materialised on first use.
pub static BUILTIN_GAMES: Lazy<Vec<GameRecord>> =
    Lazy::new(|| SEEDS.iter().map(Seed::to_record).collect());

struct Seed {
    id: &'static str,
    slug: &'static str,
    title: &'static str,
    short: &'static str,
    description: &'static str,
    category: C,
    difficulty: D,
    platforms: &'static [P],
    tags: &'static [&'static str],
    featured: bool,
    is_new: bool,
    trending: bool,
    rating: (f32, u32),
    play_count: u64,
    developer: &'static str,
    released: (i32, u32, u32),
    file_size_mb: f32,
}

impl Seed {
    fn to_record(&self) -> GameRecord {
        let (year, month, day) = self.released;
        GameRecord {
            id: self.id.to_string(),
            slug: self.slug.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            short_description: self.short.to_string(),
            category: self.category,
            difficulty: self.difficulty,
            platforms: self.platforms.to_vec(),
            tags: self.tags.iter().map(|tag| tag.to_string()).collect(),
            flags: GameFlags {
                featured: self.featured,
                is_new: self.is_new,
                trending: self.trending,
            },
            rating: GameRating {
                average: self.rating.0,
                count: self.rating.1,
            },
            play_count: self.play_count,
            developer: self.developer.to_string(),
            release_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            file_size_mb: self.file_size_mb,
        }
    }
}

const SEEDS: [Seed; 12] = [
    Seed {
        id: "1",
        slug: "cyber-racer-2024",
        title: "Cyber Racer 2024",
        short: "Futuristic racing in neon-lit cyberpunk cities",
        description: "Experience the future of racing in this high-octane cyberpunk racing game. \
            Navigate through neon-lit cityscapes, upgrade your vehicle with cutting-edge \
            technology, and compete against AI drivers in intense street races.",
        category: C::Racing,
        difficulty: D::Medium,
        platforms: &[P::Web, P::Desktop],
        tags: &["racing", "cyberpunk", "futuristic", "multiplayer", "upgrades"],
        featured: true,
        is_new: true,
        trending: true,
        rating: (4.3, 812),
        play_count: 48_210,
        developer: "Neon Games Studio",
        released: (2024, 1, 15),
        file_size_mb: 45.2,
    },
    Seed {
        id: "2",
        slug: "puzzle-master-pro",
        title: "Puzzle Master Pro",
        short: "Brain-teasing puzzles for all skill levels",
        description: "Challenge your mind with hundreds of brain-teasing puzzles. From classic \
            logic puzzles to innovative new challenges, this game will keep you entertained \
            for hours while sharpening your problem-solving skills.",
        category: C::Puzzle,
        difficulty: D::Easy,
        platforms: &[P::Web, P::Mobile, P::Tablet],
        tags: &["puzzle", "logic", "brain-training", "casual", "educational"],
        featured: false,
        is_new: false,
        trending: false,
        rating: (4.6, 1_045),
        play_count: 73_480,
        developer: "Brain Games Inc.",
        released: (2023, 8, 20),
        file_size_mb: 12.8,
    },
    Seed {
        id: "3",
        slug: "space-warriors",
        title: "Space Warriors",
        short: "Epic space strategy and empire building",
        description: "Command your fleet in epic space battles across the galaxy. Build your \
            empire, research advanced technologies, and engage in strategic warfare against \
            rival factions in this immersive space strategy game.",
        category: C::Strategy,
        difficulty: D::Hard,
        platforms: &[P::Web, P::Desktop],
        tags: &["strategy", "space", "empire-building", "multiplayer", "sci-fi"],
        featured: true,
        is_new: false,
        trending: true,
        rating: (4.1, 634),
        play_count: 39_902,
        developer: "Galactic Studios",
        released: (2023, 5, 11),
        file_size_mb: 78.5,
    },
    Seed {
        id: "4",
        slug: "adventure-quest",
        title: "Adventure Quest",
        short: "Epic adventure through mystical lands",
        description: "Embark on an epic journey through mystical lands filled with ancient ruins, \
            magical creatures, and hidden treasures. Solve puzzles, battle monsters, and \
            uncover the secrets of a forgotten civilization.",
        category: C::Adventure,
        difficulty: D::Medium,
        platforms: &[P::Web, P::Mobile],
        tags: &["adventure", "fantasy", "rpg", "exploration", "story-driven"],
        featured: false,
        is_new: true,
        trending: false,
        rating: (4.4, 521),
        play_count: 21_377,
        developer: "Fantasy Games",
        released: (2024, 2, 2),
        file_size_mb: 32.1,
    },
    Seed {
        id: "5",
        slug: "arcade-classics",
        title: "Arcade Classics",
        short: "Collection of classic arcade games",
        description: "Relive the golden age of gaming with this collection of classic arcade \
            games. From retro shooters to timeless puzzle games, experience the games that \
            defined a generation.",
        category: C::Arcade,
        difficulty: D::Easy,
        platforms: &[P::Web, P::Mobile, P::Tablet],
        tags: &["arcade", "retro", "classic", "nostalgia", "multiplayer"],
        featured: true,
        is_new: false,
        trending: true,
        rating: (4.5, 1_322),
        play_count: 96_054,
        developer: "Retro Gaming Co.",
        released: (2022, 11, 30),
        file_size_mb: 8.9,
    },
    Seed {
        id: "6",
        slug: "sports-championship",
        title: "Sports Championship",
        short: "Multi-sport championship competition",
        description: "Compete in multiple sports disciplines in this comprehensive sports \
            simulation. From football to basketball, tennis to golf, prove your skills and \
            become a champion across all sports.",
        category: C::Sports,
        difficulty: D::Medium,
        platforms: &[P::Web, P::Desktop],
        tags: &["sports", "multiplayer", "championship", "simulation", "competitive"],
        featured: false,
        is_new: false,
        trending: false,
        rating: (3.9, 288),
        play_count: 18_640,
        developer: "Sports Interactive",
        released: (2023, 3, 18),
        file_size_mb: 56.7,
    },
    Seed {
        id: "7",
        slug: "shooter-arena",
        title: "Shooter Arena",
        short: "Competitive multiplayer shooter arena",
        description: "Enter the ultimate competitive shooter arena where skill and strategy \
            determine victory. Choose from multiple character classes, unlock powerful \
            weapons, and dominate the battlefield.",
        category: C::Shooter,
        difficulty: D::Hard,
        platforms: &[P::Web, P::Desktop],
        tags: &["shooter", "multiplayer", "competitive", "fps", "arena"],
        featured: true,
        is_new: false,
        trending: true,
        rating: (4.2, 977),
        play_count: 64_519,
        developer: "Combat Games Studio",
        released: (2023, 9, 7),
        file_size_mb: 89.3,
    },
    Seed {
        id: "8",
        slug: "rpg-legend",
        title: "RPG Legend",
        short: "Epic fantasy role-playing adventure",
        description: "Create your own legend in this epic role-playing game. Customize your \
            character, embark on quests, battle monsters, and build your reputation in a vast \
            fantasy world.",
        category: C::Rpg,
        difficulty: D::Medium,
        platforms: &[P::Web, P::Desktop],
        tags: &["rpg", "fantasy", "character-customization", "quests", "story-driven"],
        featured: false,
        is_new: true,
        trending: false,
        rating: (4.7, 402),
        play_count: 15_233,
        developer: "Fantasy RPG Studios",
        released: (2024, 3, 1),
        file_size_mb: 67.8,
    },
    Seed {
        id: "9",
        slug: "simulation-city",
        title: "Simulation City",
        short: "Comprehensive city-building simulation",
        description: "Build and manage your own thriving city in this comprehensive \
            city-building simulation. Balance resources, manage population, and create a \
            metropolis that stands the test of time.",
        category: C::Simulation,
        difficulty: D::Medium,
        platforms: &[P::Web, P::Desktop],
        tags: &["simulation", "city-building", "management", "strategy", "creative"],
        featured: false,
        is_new: false,
        trending: false,
        rating: (4.0, 356),
        play_count: 27_861,
        developer: "Simulation Games Ltd.",
        released: (2022, 7, 14),
        file_size_mb: 45.6,
    },
    Seed {
        id: "10",
        slug: "casual-farm",
        title: "Casual Farm",
        short: "Relaxing farming simulation game",
        description: "Relax and unwind with this charming farming simulation. Plant crops, raise \
            animals, and build your dream farm in this peaceful and addictive casual game.",
        category: C::Casual,
        difficulty: D::Easy,
        platforms: &[P::Web, P::Mobile, P::Tablet],
        tags: &["casual", "farming", "relaxing", "simulation", "family-friendly"],
        featured: true,
        is_new: false,
        trending: true,
        rating: (4.4, 1_508),
        play_count: 88_102,
        developer: "Casual Games Studio",
        released: (2023, 4, 22),
        file_size_mb: 15.4,
    },
    Seed {
        id: "11",
        slug: "educational-math",
        title: "Educational Math",
        short: "Interactive math learning game",
        description: "Make learning fun with this interactive math game designed for all ages. \
            Practice arithmetic, algebra, geometry, and more through engaging puzzles and \
            challenges.",
        category: C::Educational,
        difficulty: D::Easy,
        platforms: &[P::Web, P::Mobile, P::Tablet],
        tags: &["educational", "math", "learning", "puzzle", "family-friendly"],
        featured: false,
        is_new: false,
        trending: false,
        rating: (4.2, 219),
        play_count: 12_470,
        developer: "Educational Games Inc.",
        released: (2022, 9, 5),
        file_size_mb: 8.2,
    },
    Seed {
        id: "12",
        slug: "action-hero",
        title: "Action Hero",
        short: "Fast-paced action adventure game",
        description: "Become the ultimate action hero in this fast-paced adventure game. Fight \
            enemies, solve puzzles, and save the world with your incredible skills and \
            abilities.",
        category: C::Action,
        difficulty: D::Hard,
        platforms: &[P::Web, P::Desktop],
        tags: &["action", "adventure", "combat", "platformer", "hero"],
        featured: true,
        is_new: false,
        trending: true,
        rating: (4.3, 743),
        play_count: 52_988,
        developer: "Action Games Studio",
        released: (2023, 12, 9),
        file_size_mb: 72.1,
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_catalog_has_unique_ids_and_dates() {
        assert_eq!(BUILTIN_GAMES.len(), 12);
        let ids: HashSet<_> = BUILTIN_GAMES.iter().map(|game| game.id.as_str()).collect();
        assert_eq!(ids.len(), BUILTIN_GAMES.len());
        assert!(BUILTIN_GAMES
            .iter()
            .all(|game| game.release_date != NaiveDate::default()));
    }
}
