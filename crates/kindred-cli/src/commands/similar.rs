use anyhow::Result;
use kindred_core::{ContentDomain, EmbeddingRecord};
use kindred_etl::Config;
use kindred_search::{
    find_similar_in, neighbours, QueryOptions, ScoredRecord, SearchEngine, VectorBackend,
};
use std::fmt::Write;

use super::load_snapshot;

/// Fields shown under each result, per catalog.
fn detail_fields(domain: ContentDomain) -> &'static [&'static str] {
    match domain {
        ContentDomain::Tracks => &["artists", "genre", "popularity"],
        ContentDomain::Titles => &["type", "release_year", "listed_in"],
    }
}

pub(crate) fn describe(domain: ContentDomain, record: &EmbeddingRecord) -> String {
    detail_fields(domain)
        .iter()
        .filter_map(|field| record.field(field).map(|v| format!("{field}: {v}")))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Neighbours of `id`, never including the item itself.
pub(crate) fn query(
    engine: &SearchEngine,
    domain: ContentDomain,
    id: &str,
    top_k: usize,
    exclude_self: bool,
) -> Result<Vec<ScoredRecord>> {
    if exclude_self {
        let options = QueryOptions::new(top_k).excluding_self();
        match engine.query_by_id_with(domain.collection(), id, options) {
            Ok(results) => Ok(results),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    } else {
        let results = find_similar_in(engine, domain, id, top_k)?;
        Ok(neighbours(&results).to_vec())
    }
}

pub(crate) fn render(
    domain: ContentDomain,
    query: Option<&EmbeddingRecord>,
    results: &[ScoredRecord],
) -> Result<String> {
    let mut out = String::new();
    if let Some(query) = query {
        writeln!(out, "\nItems similar to {} ({})\n", query.title(), query.id)?;
    }
    if results.is_empty() {
        out.push_str("No similar items found.\n");
        return Ok(out);
    }
    for (n, hit) in results.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:>6}  {}  [{}]",
            n + 1,
            hit.score_percent(),
            hit.record.title(),
            hit.record.id
        )?;
        let details = describe(domain, &hit.record);
        if !details.is_empty() {
            writeln!(out, "              {details}")?;
        }
    }
    Ok(out)
}

pub fn run(
    config: &Config,
    domain: ContentDomain,
    id: &str,
    top_k: usize,
    exclude_self: bool,
) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let engine = snapshot.engine();
    let results = query(engine, domain, id, top_k, exclude_self)?;
    let query_record = engine.backend().get(domain.collection(), id);
    print!("{}", render(domain, query_record.as_ref(), &results)?);
    Ok(())
}
