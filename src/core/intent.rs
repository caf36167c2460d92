//! Search intents and the category vocabulary.
//!
//! Exactly one intent is authoritative at a time; selecting a new one
//! invalidates any outcome still in flight for the previous one. The
//! controller enforces that rule; this module only defines the shapes.

use std::fmt;

use clap::ValueEnum;

/// The fixed, closed set of browsable subject categories.
///
/// Deriving `ValueEnum` gives the CLI kebab-case values (`self-help`) and
/// rejects anything outside the vocabulary at the argument parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Fiction,
    Science,
    History,
    Biography,
    SelfHelp,
    Technology,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Fiction,
        Category::Science,
        Category::History,
        Category::Biography,
        Category::SelfHelp,
        Category::Technology,
    ];

    /// Stable identifier used in subject-scoped queries.
    pub fn id(self) -> &'static str {
        match self {
            Category::Fiction => "fiction",
            Category::Science => "science",
            Category::History => "history",
            Category::Biography => "biography",
            Category::SelfHelp => "self-help",
            Category::Technology => "technology",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Category::Fiction => "Fiction",
            Category::Science => "Science",
            Category::History => "History",
            Category::Biography => "Biography",
            Category::SelfHelp => "Self Help",
            Category::Technology => "Technology",
        }
    }
}

/// The user's current search mode. A request and its eventual outcome are
/// scoped to the intent that started them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchIntent {
    /// Broad popularity feed, shown at startup and after clearing.
    Trending,
    /// One of the fixed subject categories.
    Category(Category),
    /// Literal user text, already trimmed by the controller.
    FreeText(String),
}

impl fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchIntent::Trending => write!(f, "trending"),
            SearchIntent::Category(category) => write!(f, "category:{}", category.id()),
            SearchIntent::FreeText(text) => write!(f, "text:{text}"),
        }
    }
}
