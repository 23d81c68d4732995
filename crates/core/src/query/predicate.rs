use std::collections::BTreeSet;

use crate::models::{GameCategory, GameDifficulty, GameFlag, GamePlatform, GameRecord};

use super::FilterRequest;

/// Combined inclusion test compiled from a [`FilterRequest`].
///
/// A record passes when every active group matches: any selected category,
/// any selected difficulty, any selected platform, all requested flags, the
/// minimum rating, and the text query.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    categories: BTreeSet<GameCategory>,
    difficulties: BTreeSet<GameDifficulty>,
    platforms: BTreeSet<GamePlatform>,
    flags: BTreeSet<GameFlag>,
    min_rating: Option<f32>,
    needle: Option<String>,
}

impl Predicate {
    /// Compile the restrictions of `request`. Sort and page are ignored.
    pub fn build(request: &FilterRequest) -> Self {
        let needle = request.normalized_query();
        Self {
            categories: request.categories.clone(),
            difficulties: request.difficulties.clone(),
            platforms: request.platforms.clone(),
            flags: request.flags.clone(),
            min_rating: request.min_rating.filter(|value| value.is_finite()),
            needle: (!needle.is_empty()).then_some(needle),
        }
    }

    /// True when the predicate accepts every record.
    pub fn is_trivial(&self) -> bool {
        self.categories.is_empty()
            && self.difficulties.is_empty()
            && self.platforms.is_empty()
            && self.flags.is_empty()
            && self.min_rating.is_none()
            && self.needle.is_none()
    }

    /// Whether `game` passes every active group.
    pub fn matches(&self, game: &GameRecord) -> bool {
        (self.categories.is_empty() || self.categories.contains(&game.category))
            && (self.difficulties.is_empty() || self.difficulties.contains(&game.difficulty))
            && (self.platforms.is_empty()
                || self.platforms.iter().any(|platform| game.supports(*platform)))
            && self.flags.iter().all(|flag| game.flags.has(*flag))
            && self
                .min_rating
                .map(|min| game.rating.average >= min)
                .unwrap_or(true)
            && self.matches_text(game)
    }

    fn matches_text(&self, game: &GameRecord) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };
        game.title.to_lowercase().contains(needle)
            || game.description.to_lowercase().contains(needle)
            || game
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::BUILTIN_GAMES, query::FilterUpdate};

    fn ids_matching(update: FilterUpdate) -> Vec<String> {
        let mut request = FilterRequest::default();
        request.apply(update);
        let predicate = Predicate::build(&request);
        BUILTIN_GAMES
            .iter()
            .filter(|game| predicate.matches(game))
            .map(|game| game.id.clone())
            .collect()
    }

    #[test]
    fn empty_request_matches_everything() {
        let predicate = Predicate::build(&FilterRequest::default());
        assert!(predicate.is_trivial());
        assert!(BUILTIN_GAMES.iter().all(|game| predicate.matches(game)));
    }

    #[test]
    fn text_matches_title_and_tags_case_insensitively() {
        let mut games = BUILTIN_GAMES[..2].to_vec();
        games[1].title = "Neon Nights".to_string();
        games[1].description = "A city at night".to_string();
        games[1].tags = vec!["Cyberpunk".to_string()];

        let mut request = FilterRequest::default();
        request.apply(FilterUpdate::default().query("  CYBER "));
        let predicate = Predicate::build(&request);
        assert!(predicate.matches(&games[0]), "title match");
        assert!(predicate.matches(&games[1]), "tag substring match");
    }

    #[test]
    fn text_matches_description() {
        assert_eq!(ids_matching(FilterUpdate::default().query("galaxy")), ["3"]);
    }

    #[test]
    fn categories_are_any_of_and_flags_are_all_of() {
        let ids = ids_matching(
            FilterUpdate::default()
                .categories([GameCategory::Puzzle, GameCategory::Racing])
                .flags([GameFlag::Featured]),
        );
        assert_eq!(ids, ["1"]);

        let ids = ids_matching(FilterUpdate::default().flags([GameFlag::Featured, GameFlag::New]));
        assert_eq!(ids, ["1"]);

        let ids = ids_matching(
            FilterUpdate::default().categories([GameCategory::Puzzle, GameCategory::Racing]),
        );
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn difficulty_platform_and_rating_groups() {
        let ids = ids_matching(
            FilterUpdate::default()
                .difficulties([GameDifficulty::Hard])
                .platforms([GamePlatform::Desktop]),
        );
        assert_eq!(ids, ["3", "7", "12"]);

        let ids = ids_matching(FilterUpdate::default().min_rating(Some(4.5)));
        assert_eq!(ids, ["2", "5", "8"]);

        let ids = ids_matching(FilterUpdate::default().difficulties([GameDifficulty::Expert]));
        assert!(ids.is_empty());
    }
}
