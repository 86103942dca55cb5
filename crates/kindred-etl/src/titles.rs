//! Text embeddings for movies and shows.

use kindred_core::{ContentDomain, EmbeddingRecord, Metadata, MetadataValue};

use crate::error::{EtlError, EtlResult};
use crate::table::{parse_number, Row, Table};
use crate::text::clean_text;
use crate::tfidf::TfidfVectorizer;

const CATALOG: &str = "titles";

/// Text columns joined, in this order, into the document for each title.
const TEXT_FIELDS: [&str; 4] = ["description", "listed_in", "cast", "director"];

/// Metadata fields that read `"Unknown"` when missing.
const DEFAULTED_FIELDS: [&str; 3] = ["director", "cast", "country"];

const OPTIONAL_FIELDS: [&str; 3] = ["type", "rating", "listed_in"];

const UNKNOWN: &str = "Unknown";

/// Column positions used by the embedder. Only `title` and
/// `description` are mandatory in the header.
struct Columns {
    title: usize,
    description: usize,
    others: Vec<(&'static str, Option<usize>)>,
}

impl Columns {
    fn resolve(table: &Table) -> EtlResult<Self> {
        let others = ["type", "director", "cast", "country", "release_year", "rating", "listed_in"]
            .into_iter()
            .map(|name| (name, table.column(CATALOG, name).ok()))
            .collect();
        Ok(Self {
            title: table.column(CATALOG, "title")?,
            description: table.column(CATALOG, "description")?,
            others,
        })
    }

    fn get<'a>(&self, row: &Row<'a>, name: &str) -> Option<&'a str> {
        match name {
            "title" => row.get(self.title),
            "description" => row.get(self.description),
            _ => self
                .others
                .iter()
                .find(|(n, _)| *n == name)
                .and_then(|(_, col)| col.and_then(|c| row.get(c))),
        }
    }
}

/// Turns a title table into TF-IDF embeddings.
#[derive(Debug, Clone)]
pub struct TitleEmbedder {
    vectorizer: TfidfVectorizer,
}

impl TitleEmbedder {
    #[must_use]
    pub fn new(max_features: usize) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(max_features),
        }
    }

    /// Vectorizer fitted by the last call to [`TitleEmbedder::embed`].
    #[must_use]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// The cleaned document a row is vectorized from.
    fn document(columns: &Columns, row: &Row<'_>) -> String {
        TEXT_FIELDS
            .iter()
            .map(|field| clean_text(columns.get(row, field).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn metadata(columns: &Columns, row: &Row<'_>, line: usize) -> EtlResult<Metadata> {
        let mut metadata = Metadata::new();
        for field in ["title", "description"] {
            if let Some(value) = columns.get(row, field) {
                metadata.insert(field.to_string(), value.into());
            }
        }
        for field in DEFAULTED_FIELDS {
            let value = columns.get(row, field).unwrap_or(UNKNOWN);
            metadata.insert(field.to_string(), value.into());
        }
        for field in OPTIONAL_FIELDS {
            if let Some(value) = columns.get(row, field) {
                metadata.insert(field.to_string(), value.into());
            }
        }
        if let Some(year) = columns.get(row, "release_year") {
            let year = parse_number(line, "release_year", year)? as i64;
            metadata.insert("release_year".to_string(), MetadataValue::Integer(year));
        }
        Ok(metadata)
    }

    /// Embed every title that has both a title and a description.
    ///
    /// Ids are `netflix_{n}` where `n` counts kept rows.
    pub fn embed(&mut self, table: &Table) -> EtlResult<Vec<EmbeddingRecord>> {
        let columns = Columns::resolve(table)?;

        let mut documents = Vec::new();
        let mut metadata = Vec::new();
        for (line, row) in table.rows().enumerate() {
            if !row.has_all(&[columns.title, columns.description]) {
                continue;
            }
            documents.push(Self::document(&columns, &row));
            metadata.push(Self::metadata(&columns, &row, line)?);
        }

        if documents.is_empty() {
            return Err(EtlError::EmptyDataset(CATALOG));
        }
        let dropped = table.len() - documents.len();
        if dropped > 0 {
            log::warn!("Dropped {} title rows without title or description", dropped);
        }

        let vectors = self.vectorizer.fit_transform(&documents);
        if self.vectorizer.dimension() == 0 {
            return Err(EtlError::EmptyDataset(CATALOG));
        }

        let records = vectors
            .into_iter()
            .zip(metadata)
            .enumerate()
            .map(|(n, (vector, metadata))| {
                EmbeddingRecord::new(ContentDomain::Titles.id_for_row(n), vector)
                    .with_metadata(metadata)
            })
            .collect::<Vec<_>>();

        log::info!(
            "Embedded {} titles over {} terms",
            records.len(),
            self.vectorizer.dimension()
        );
        Ok(records)
    }
}

impl Default for TitleEmbedder {
    fn default() -> Self {
        Self::new(100)
    }
}
