use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A content catalog, each stored in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDomain {
    /// Music tracks described by audio features.
    Tracks,
    /// Movies and shows described by their text.
    Titles,
}

impl ContentDomain {
    pub const ALL: [Self; 2] = [Self::Tracks, Self::Titles];

    /// Name of the collection holding this domain's embeddings.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Tracks => "spotify",
            Self::Titles => "netflix",
        }
    }

    /// Prefix of record ids produced for this domain.
    #[must_use]
    pub fn id_for_row(self, row: usize) -> String {
        format!("{}_{row}", self.collection())
    }
}

impl fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for ContentDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spotify" | "tracks" | "music" => Ok(Self::Tracks),
            "netflix" | "titles" | "movies" | "shows" => Ok(Self::Titles),
            other => Err(Error::UnknownDomain(other.to_string())),
        }
    }
}
