//! Replay edit transactions through an edit session.

use super::load_document;
use anyhow::{Context, Result};
use refdoc_core::{CitationRange, Decoration, EditSession, SeparatorInsertion, Transaction};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct TrackSummary<'a> {
    transactions: usize,
    ranges: &'a [CitationRange],
    decorations: Vec<Decoration>,
    separator_insertions: Vec<SeparatorInsertion>,
}

pub fn track_edits(
    document_path: &Path,
    edits_path: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let document = load_document(document_path)?;
    let contents = fs::read_to_string(edits_path)
        .with_context(|| format!("Failed to read edits {}", edits_path.display()))?;
    let transactions: Vec<Transaction> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse edits {}", edits_path.display()))?;

    let count = transactions.len();
    let mut session = EditSession::new(document);
    let mut separator_insertions = Vec::new();
    for (index, transaction) in transactions.into_iter().enumerate() {
        let outcome = session
            .apply(transaction)
            .with_context(|| format!("Transaction {} failed", index))?;
        separator_insertions.extend(outcome.separator_insertions);
    }

    let summary = TrackSummary {
        transactions: count,
        ranges: session.ranges(),
        decorations: session.decorations(),
        separator_insertions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Replayed {} transactions: {} citation ranges, {} separators inserted",
            summary.transactions,
            summary.ranges.len(),
            summary.separator_insertions.len()
        );
        for range in summary.ranges {
            println!("- [{}, {})", range.start, range.end);
        }
    }

    if let Some(output) = output {
        let payload = serde_json::to_string_pretty(session.document())?;
        fs::write(output, payload)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    Ok(())
}
