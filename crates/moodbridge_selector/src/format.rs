//! Turns raw provider payloads into `RecommendationRecord`s.
//!
//! Pure functions only. Missing provider fields become empty strings; the
//! assembler drops records that end up with neither a title nor a link.

use moodbridge_core::provider::{EdamamRecipe, MealDbMeal, SpotifyTrack, TmdbMovie};
use moodbridge_core::{Category, ContentType, MoodPair, RawItem, RecommendationRecord};

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const TMDB_MOVIE_BASE: &str = "https://www.themoviedb.org/movie";

/// Presentation fields for one item; identity and emotions are filled in by `format`.
#[derive(Debug, Default)]
struct Rendered {
    title: String,
    description: String,
    content: String,
    image_url: String,
    link: String,
}

pub fn format(
    item: &RawItem,
    content_type: &ContentType,
    pair: &MoodPair,
    category: &Category,
) -> RecommendationRecord {
    let rendered = match item {
        RawItem::Tmdb(movie) => render_movie(movie, category),
        RawItem::Spotify(track) => render_track(track),
        RawItem::MealDb(meal) => render_meal(meal),
        RawItem::Edamam(recipe) => render_recipe(recipe),
    };

    RecommendationRecord {
        title: rendered.title,
        description: rendered.description,
        content_type: content_type.clone(),
        source_emotion: pair.source.clone(),
        target_emotion: pair.target.clone(),
        content: rendered.content,
        image_url: rendered.image_url,
        link: rendered.link,
        external_id: Some(item.external_id()),
        external_source: Some(item.provider().as_str().to_string()),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

// ============================================================================
// TMDB
// ============================================================================

fn render_movie(movie: &TmdbMovie, category: &Category) -> Rendered {
    let release_date = text(&movie.release_date);
    let year = release_date.get(..4).unwrap_or_default();

    let overview = text(&movie.overview);
    let description = if overview.is_empty() {
        synthesize_movie_blurb(&category.label().to_lowercase(), year, movie.vote_average)
    } else {
        overview
    };

    let mut lines = Vec::new();
    if !release_date.is_empty() {
        lines.push(format!("Release date: {}", release_date));
    }
    if let Some(vote) = movie.vote_average {
        lines.push(format!("Rating: {:.1}/10", vote));
    }
    let language = text(&movie.original_language);
    if !language.is_empty() {
        lines.push(format!("Original language: {}", language));
    }

    let poster = text(&movie.poster_path);
    let title = text(&movie.title);
    // An untitled movie gets no link either, so it is dropped as unusable.
    let link = if title.is_empty() {
        String::new()
    } else {
        format!("{}/{}", TMDB_MOVIE_BASE, movie.id)
    };
    Rendered {
        title,
        description,
        content: lines.join("\n"),
        image_url: if poster.is_empty() {
            String::new()
        } else {
            format!("{}{}", TMDB_IMAGE_BASE, poster)
        },
        link,
    }
}

fn synthesize_movie_blurb(genre: &str, year: &str, vote: Option<f64>) -> String {
    match (year.is_empty(), vote) {
        (false, Some(vote)) => format!("A {} pick from {}, rated {:.1}/10.", genre, year, vote),
        (false, None) => format!("A {} pick from {}.", genre, year),
        (true, Some(vote)) => format!("A {} pick, rated {:.1}/10.", genre, vote),
        (true, None) => format!("A {} pick.", genre),
    }
}

// ============================================================================
// Spotify
// ============================================================================

fn render_track(track: &SpotifyTrack) -> Rendered {
    let artists = track
        .artists
        .iter()
        .map(|a| a.name.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let album_name = track
        .album
        .as_ref()
        .map(|a| text(&a.name))
        .unwrap_or_default();

    let description = match (artists.is_empty(), album_name.is_empty()) {
        (false, false) => format!("{} · {}", artists, album_name),
        (false, true) => artists.clone(),
        (true, false) => album_name.clone(),
        (true, true) => String::new(),
    };

    let mut lines = Vec::new();
    if !album_name.is_empty() {
        lines.push(format!("Album: {}", album_name));
    }
    if let Some(released) = track.album.as_ref().map(|a| text(&a.release_date)) {
        if !released.is_empty() {
            lines.push(format!("Released: {}", released));
        }
    }
    if let Some(ms) = track.duration_ms {
        lines.push(format!("Duration: {}", minutes_seconds(ms)));
    }

    Rendered {
        title: text(&track.name),
        description,
        content: lines.join("\n"),
        image_url: track
            .album
            .as_ref()
            .and_then(|a| a.images.first())
            .map(|img| img.url.clone())
            .unwrap_or_default(),
        link: track
            .external_urls
            .as_ref()
            .map(|u| text(&u.spotify))
            .unwrap_or_default(),
    }
}

/// `238000` -> `3:58`
fn minutes_seconds(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

// ============================================================================
// TheMealDB
// ============================================================================

fn render_meal(meal: &MealDbMeal) -> Rendered {
    let category = text(&meal.category);
    let area = text(&meal.area);
    let description = match (area.is_empty(), category.is_empty()) {
        (false, false) => format!("A traditional {} {} dish.", area, category.to_lowercase()),
        (false, true) => format!("A traditional {} dish.", area),
        (true, false) => format!("A {} dish.", category.to_lowercase()),
        (true, true) => String::new(),
    };

    let mut sections = Vec::new();
    let ingredients = meal.ingredients();
    if !ingredients.is_empty() {
        let list = ingredients
            .iter()
            .map(|(ingredient, measure)| {
                if measure.is_empty() {
                    format!("- {}", ingredient)
                } else {
                    format!("- {} {}", measure, ingredient)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Ingredients:\n{}", list));
    }
    let instructions = text(&meal.instructions);
    if !instructions.is_empty() {
        sections.push(format!("Instructions:\n{}", instructions));
    }

    let source = text(&meal.source_url);
    Rendered {
        title: text(&meal.name),
        description,
        content: sections.join("\n\n"),
        image_url: text(&meal.thumbnail),
        link: if source.is_empty() {
            text(&meal.youtube_url)
        } else {
            source
        },
    }
}

// ============================================================================
// Edamam
// ============================================================================

fn render_recipe(recipe: &EdamamRecipe) -> Rendered {
    let cuisines = recipe.cuisine_type.join(", ");
    let source = text(&recipe.source);
    let description = match (cuisines.is_empty(), source.is_empty()) {
        (false, false) => format!("{} recipe from {}", capitalize(&cuisines), source),
        (false, true) => format!("{} recipe", capitalize(&cuisines)),
        (true, false) => format!("Recipe from {}", source),
        (true, true) => String::new(),
    };

    let mut sections = Vec::new();
    if !recipe.ingredient_lines.is_empty() {
        let list = recipe
            .ingredient_lines
            .iter()
            .map(|line| format!("- {}", line.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Ingredients:\n{}", list));
    }
    if let Some(calories) = recipe.calories {
        let servings = recipe.servings.filter(|s| *s > 0.0).unwrap_or(1.0);
        sections.push(format!(
            "Nutrition:\n{:.0} kcal per serving ({} servings)",
            calories / servings,
            servings
        ));
    }

    Rendered {
        title: text(&recipe.label),
        description,
        content: sections.join("\n\n"),
        image_url: text(&recipe.image),
        link: text(&recipe.url),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbridge_core::provider::{SpotifyAlbum, SpotifyArtist, SpotifyExternalUrls, SpotifyImage};
    use moodbridge_core::{normalize, MovieGenre};
    use std::collections::HashMap;

    fn pair() -> MoodPair {
        normalize("Sad", "happy").unwrap()
    }

    #[test]
    fn test_movie_with_overview() {
        let movie = TmdbMovie {
            id: 603,
            title: Some("The Matrix".into()),
            overview: Some("A hacker learns the truth.".into()),
            release_date: Some("1999-03-30".into()),
            vote_average: Some(8.2),
            poster_path: Some("/m.jpg".into()),
            original_language: Some("en".into()),
            genre_ids: vec![28, 878],
        };
        let record = format(
            &RawItem::Tmdb(movie),
            &"movies".into(),
            &pair(),
            &Category::Genre(MovieGenre::ScienceFiction),
        );

        assert_eq!(record.title, "The Matrix");
        assert_eq!(record.description, "A hacker learns the truth.");
        assert_eq!(record.image_url, "https://image.tmdb.org/t/p/w500/m.jpg");
        assert_eq!(record.link, "https://www.themoviedb.org/movie/603");
        assert!(record.content.contains("Release date: 1999-03-30"));
        assert!(record.content.contains("Rating: 8.2/10"));
        assert_eq!(record.source_emotion.as_str(), "sad");
        assert_eq!(record.external_id.as_deref(), Some("603"));
        assert_eq!(record.external_source.as_deref(), Some("tmdb"));
    }

    #[test]
    fn test_movie_blurb_when_overview_missing() {
        let movie = TmdbMovie {
            id: 1,
            title: Some("Paddington".into()),
            release_date: Some("2014-11-28".into()),
            vote_average: Some(7.3),
            ..Default::default()
        };
        let record = format(
            &RawItem::Tmdb(movie),
            &"movies".into(),
            &pair(),
            &Category::Genre(MovieGenre::Family),
        );
        assert_eq!(record.description, "A family pick from 2014, rated 7.3/10.");
        assert!(record.image_url.is_empty());
    }

    #[test]
    fn test_track() {
        let track = SpotifyTrack {
            id: "t1".into(),
            name: Some("Here Comes the Sun".into()),
            artists: vec![SpotifyArtist {
                name: "The Beatles".into(),
            }],
            album: Some(SpotifyAlbum {
                name: Some("Abbey Road".into()),
                images: vec![SpotifyImage {
                    url: "https://i.scdn.co/abbey.jpg".into(),
                }],
                release_date: Some("1969-09-26".into()),
            }),
            external_urls: Some(SpotifyExternalUrls {
                spotify: Some("https://open.spotify.com/track/t1".into()),
            }),
            duration_ms: Some(185_733),
            preview_url: None,
        };
        let record = format(
            &RawItem::Spotify(track),
            &"music".into(),
            &pair(),
            &Category::SearchTerm("feel good".into()),
        );

        assert_eq!(record.description, "The Beatles · Abbey Road");
        assert!(record.content.contains("Duration: 3:05"));
        assert_eq!(record.image_url, "https://i.scdn.co/abbey.jpg");
        assert_eq!(record.link, "https://open.spotify.com/track/t1");
        assert_eq!(record.external_source.as_deref(), Some("spotify"));
    }

    #[test]
    fn test_meal_link_falls_back_to_youtube() {
        let mut extra = HashMap::new();
        extra.insert("strIngredient1".to_string(), serde_json::json!("Lentils"));
        extra.insert("strMeasure1".to_string(), serde_json::json!("1 cup"));
        extra.insert("strIngredient2".to_string(), serde_json::json!("Cumin"));
        let meal = MealDbMeal {
            id: "53001".into(),
            name: Some("Koshari".into()),
            category: Some("Vegetarian".into()),
            area: Some("Egyptian".into()),
            instructions: Some("Cook the lentils.".into()),
            thumbnail: Some("https://x/k.jpg".into()),
            source_url: Some("".into()),
            youtube_url: Some("https://youtube.com/watch?v=k".into()),
            extra,
        };
        let record = format(
            &RawItem::MealDb(meal),
            &"african_meals".into(),
            &pair(),
            &Category::CuisineArea("Egyptian".into()),
        );

        assert_eq!(record.description, "A traditional Egyptian vegetarian dish.");
        assert_eq!(
            record.content,
            "Ingredients:\n- 1 cup Lentils\n- Cumin\n\nInstructions:\nCook the lentils."
        );
        assert_eq!(record.link, "https://youtube.com/watch?v=k");
    }

    #[test]
    fn test_recipe_nutrition_per_serving() {
        let recipe = EdamamRecipe {
            uri: "http://www.edamam.com/ontologies/edamam.owl#recipe_z".into(),
            label: Some("Ugali".into()),
            url: Some("https://example.org/ugali".into()),
            source: Some("Serious Eats".into()),
            ingredient_lines: vec!["2 cups maize flour".into(), "4 cups water".into()],
            calories: Some(1600.0),
            servings: Some(4.0),
            cuisine_type: vec!["african".into()],
            ..Default::default()
        };
        let record = format(
            &RawItem::Edamam(recipe),
            &"african_meals".into(),
            &pair(),
            &Category::SearchTerm("ugali".into()),
        );

        assert_eq!(record.description, "African recipe from Serious Eats");
        assert!(record.content.starts_with("Ingredients:\n- 2 cups maize flour"));
        assert!(record.content.contains("Nutrition:\n400 kcal per serving"));
        assert_eq!(record.external_id.as_deref(), Some("recipe_z"));
    }

    #[test]
    fn test_untitled_movie_is_unusable() {
        let record = format(
            &RawItem::Tmdb(TmdbMovie {
                id: 42,
                title: Some("   ".into()),
                release_date: Some("2001-04-25".into()),
                ..Default::default()
            }),
            &"movies".into(),
            &pair(),
            &Category::Genre(MovieGenre::Comedy),
        );
        assert!(record.link.is_empty());
        assert!(!record.is_usable());
    }

    #[test]
    fn test_empty_track_is_unusable() {
        let record = format(
            &RawItem::Spotify(SpotifyTrack {
                id: "x".into(),
                ..Default::default()
            }),
            &"music".into(),
            &pair(),
            &Category::SearchTerm("x".into()),
        );
        assert!(!record.is_usable());
        assert!(record.description.is_empty());
    }
}
