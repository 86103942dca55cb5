//! Audio-feature embeddings for music tracks.

use kindred_core::{ContentDomain, EmbeddingRecord, Metadata, MetadataValue};

use crate::error::{EtlError, EtlResult};
use crate::scaler::{min_max_scale, StandardScaler};
use crate::table::{parse_number, Table};

const CATALOG: &str = "tracks";

/// Feature columns in vector order.
pub const AUDIO_FEATURES: [&str; 9] = [
    "danceability",
    "energy",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "loudness",
];

/// Columns rescaled to `[0, 1]` before standardization.
const MIN_MAX_FEATURES: [&str; 2] = ["tempo", "loudness"];

const DESCRIPTIVE: [&str; 5] = ["track_name", "artists", "album_name", "track_genre", "popularity"];

/// Metadata fields copied from the raw (unscaled) feature values.
const RAW_FEATURE_FIELDS: [&str; 4] = ["danceability", "energy", "valence", "tempo"];

struct TrackRow {
    features: Vec<f64>,
    metadata: Metadata,
}

/// Turns a track table into standardized 9-dimensional embeddings.
#[derive(Debug, Clone, Default)]
pub struct TrackEmbedder {
    scaler: Option<StandardScaler>,
}

impl TrackEmbedder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scaler fitted by the last call to [`TrackEmbedder::embed`].
    #[must_use]
    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    /// Embed every track that has all feature and descriptive columns.
    ///
    /// Ids are `spotify_{n}` where `n` counts kept rows.
    pub fn embed(&mut self, table: &Table) -> EtlResult<Vec<EmbeddingRecord>> {
        let feature_cols = AUDIO_FEATURES
            .iter()
            .map(|name| table.column(CATALOG, name))
            .collect::<EtlResult<Vec<_>>>()?;
        let descriptive_cols = DESCRIPTIVE
            .iter()
            .map(|name| table.column(CATALOG, name))
            .collect::<EtlResult<Vec<_>>>()?;
        let required: Vec<usize> = feature_cols.iter().chain(&descriptive_cols).copied().collect();

        let mut rows = Vec::new();
        for (line, row) in table.rows().enumerate() {
            if !row.has_all(&required) {
                continue;
            }

            let mut features = Vec::with_capacity(AUDIO_FEATURES.len());
            for (name, &col) in AUDIO_FEATURES.iter().zip(&feature_cols) {
                let cell = row.get(col).unwrap_or_default();
                features.push(parse_number(line, name, cell)?);
            }

            let mut metadata = Metadata::new();
            for (name, &col) in DESCRIPTIVE.iter().zip(&descriptive_cols) {
                let cell = row.get(col).unwrap_or_default();
                let value = match *name {
                    "popularity" => MetadataValue::Integer(parse_number(line, name, cell)? as i64),
                    _ => MetadataValue::from(cell),
                };
                let key = if *name == "track_genre" { "genre" } else { *name };
                metadata.insert(key.to_string(), value);
            }
            for field in RAW_FEATURE_FIELDS {
                if let Some(i) = AUDIO_FEATURES.iter().position(|f| *f == field) {
                    metadata.insert(field.to_string(), MetadataValue::Float(features[i]));
                }
            }

            rows.push(TrackRow { features, metadata });
        }

        if rows.is_empty() {
            return Err(EtlError::EmptyDataset(CATALOG));
        }
        let dropped = table.len() - rows.len();
        if dropped > 0 {
            log::warn!("Dropped {} track rows with missing values", dropped);
        }

        for feature in MIN_MAX_FEATURES {
            if let Some(i) = AUDIO_FEATURES.iter().position(|f| *f == feature) {
                let mut column: Vec<f64> = rows.iter().map(|r| r.features[i]).collect();
                min_max_scale(&mut column);
                for (row, value) in rows.iter_mut().zip(column) {
                    row.features[i] = value;
                }
            }
        }

        let matrix: Vec<Vec<f64>> = rows.iter().map(|r| r.features.clone()).collect();
        let scaler = StandardScaler::fit(&matrix);

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(n, row)| {
                EmbeddingRecord::new(
                    ContentDomain::Tracks.id_for_row(n),
                    scaler.transform(&row.features),
                )
                .with_metadata(row.metadata)
            })
            .collect::<Vec<_>>();

        log::info!("Embedded {} tracks", records.len());
        self.scaler = Some(scaler);
        Ok(records)
    }
}
