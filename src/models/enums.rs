//! Shared domain enums

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Returned when a genre label is not part of the catalog's fixed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid genre: {0}")]
pub struct UnknownGenre(pub String);

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// Book genre. The wire form is the display label, shared by server and client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Genre {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Mystery,
    Romance,
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
    Fantasy,
    Thriller,
    Biography,
    History,
    #[serde(rename = "Self-Help")]
    SelfHelp,
    Poetry,
    Drama,
    Horror,
    Adventure,
    Classic,
}

impl Genre {
    pub const ALL: [Genre; 15] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::Fantasy,
        Genre::Thriller,
        Genre::Biography,
        Genre::History,
        Genre::SelfHelp,
        Genre::Poetry,
        Genre::Drama,
        Genre::Horror,
        Genre::Adventure,
        Genre::Classic,
    ];

    /// Label stored in the database and sent over the wire
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Fantasy => "Fantasy",
            Genre::Thriller => "Thriller",
            Genre::Biography => "Biography",
            Genre::History => "History",
            Genre::SelfHelp => "Self-Help",
            Genre::Poetry => "Poetry",
            Genre::Drama => "Drama",
            Genre::Horror => "Horror",
            Genre::Adventure => "Adventure",
            Genre::Classic => "Classic",
        }
    }
}

impl std::str::FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.label() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
