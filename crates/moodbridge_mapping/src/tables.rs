//! Built-in mapping tables.
//!
//! Mood transitions are numerous but the useful content choices cluster into a
//! few archetypes (uplift, calm down, energize, focus). Each table is a sparse
//! set of curated transitions plus a mandatory `default`.

pub type Table = &'static [(&'static str, &'static [&'static str])];

pub const DEFAULT_KEY: &str = "default";

/// Transition key → TMDB genre names.
pub const MOVIE_GENRES: Table = &[
    ("angry_to_calm", &["documentary", "family", "animation", "music"]),
    ("angry_to_happy", &["comedy", "animation", "adventure"]),
    ("anxious_to_calm", &["animation", "family", "documentary"]),
    ("anxious_to_relaxed", &["animation", "comedy", "family"]),
    ("bored_to_energetic", &["action", "adventure", "comedy"]),
    ("bored_to_excited", &["action", "adventure", "science_fiction", "thriller"]),
    ("fearful_to_confident", &["adventure", "action", "history"]),
    ("lonely_to_happy", &["comedy", "romance", "family"]),
    ("lonely_to_loved", &["romance", "drama", "family"]),
    ("neutral_to_happy", &["comedy", "adventure"]),
    ("sad_to_happy", &["comedy", "family", "animation", "music"]),
    ("sad_to_hopeful", &["drama", "family", "history"]),
    ("stressed_to_focused", &["documentary", "history", "mystery"]),
    ("stressed_to_relaxed", &["comedy", "animation", "family", "documentary"]),
    ("tired_to_energetic", &["action", "adventure", "music"]),
    (DEFAULT_KEY, &["comedy", "drama", "family"]),
];

/// Transition key → TheMealDB areas.
pub const CUISINE_AREAS: Table = &[
    ("angry_to_calm", &["Moroccan", "Greek"]),
    ("anxious_to_calm", &["Japanese", "Indian"]),
    ("bored_to_excited", &["Jamaican", "Vietnamese", "Tunisian"]),
    ("lonely_to_loved", &["Italian", "French", "Irish"]),
    ("sad_to_happy", &["Italian", "Mexican", "Jamaican"]),
    ("stressed_to_relaxed", &["Japanese", "Thai", "Moroccan"]),
    ("tired_to_energetic", &["Thai", "Mexican", "Kenyan"]),
    (DEFAULT_KEY, &["Moroccan", "Egyptian", "Kenyan", "Tunisian"]),
];

/// Transition key → music search phrases.
pub const MUSIC_SEARCH: Table = &[
    ("angry_to_calm", &["calm acoustic", "peaceful piano"]),
    ("anxious_to_calm", &["ambient relaxation", "lofi calm"]),
    ("bored_to_energetic", &["upbeat dance", "afrobeats party"]),
    ("bored_to_excited", &["party anthems", "high energy rock"]),
    ("lonely_to_loved", &["love songs", "romantic soul"]),
    ("sad_to_happy", &["feel good hits", "uplifting pop"]),
    ("sad_to_hopeful", &["hopeful indie", "inspirational songs"]),
    ("stressed_to_focused", &["deep focus", "instrumental study"]),
    ("stressed_to_relaxed", &["chill lofi", "relaxing jazz"]),
    ("tired_to_energetic", &["workout energy", "upbeat dance"]),
    (DEFAULT_KEY, &["mood booster", "feel good"]),
];

/// Target emotion → music search phrase.
pub const EMOTION_SEARCH_TERMS: Table = &[
    ("calm", &["calm peaceful"]),
    ("confident", &["confidence boost"]),
    ("energetic", &["energetic workout"]),
    ("excited", &["exciting party"]),
    ("focused", &["focus concentration"]),
    ("happy", &["happy upbeat"]),
    ("hopeful", &["hopeful inspiring"]),
    ("loved", &["love romantic"]),
    ("motivated", &["motivation"]),
    ("relaxed", &["relaxing chill"]),
    (DEFAULT_KEY, &["feel good"]),
];
