use anyhow::Result;
use kindred_core::{ContentDomain, EmbeddingRecord};
use kindred_etl::Config;
use kindred_search::VectorBackend;
use std::fmt::Write;

use super::load_snapshot;
use super::similar::describe;

pub(crate) fn render(
    domain: ContentDomain,
    records: &[EmbeddingRecord],
    limit: usize,
) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\n{} items in {}\n", records.len(), domain)?;
    for record in records.iter().take(limit) {
        writeln!(out, "  {:<14} {}", record.id, record.title())?;
        let details = describe(domain, record);
        if !details.is_empty() {
            writeln!(out, "  {:<14} {details}", "")?;
        }
    }
    if records.len() > limit {
        writeln!(out, "\n  ... {} more (use --limit)", records.len() - limit)?;
    }
    Ok(out)
}

pub fn run(config: &Config, domain: ContentDomain, limit: usize) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let records = snapshot.engine().backend().all(domain.collection());
    print!("{}", render(domain, &records, limit)?);
    Ok(())
}
