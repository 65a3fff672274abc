//! BibTeX stanza writer.

use super::SerializedReferences;
use chrono::Datelike;
use refdoc_types::Reference;

pub const BIBTEX_EXTENSION: &str = "bib";

/// Render references as `@ARTICLE` stanzas, in the given order, separated
/// by one blank line.
pub fn serialize_references<'a, I>(references: I) -> SerializedReferences
where
    I: IntoIterator<Item = &'a Reference>,
{
    let text_content = references
        .into_iter()
        .map(article_stanza)
        .collect::<Vec<_>>()
        .join("\n\n");

    SerializedReferences {
        text_content,
        extension: BIBTEX_EXTENSION.to_string(),
    }
}

fn article_stanza(reference: &Reference) -> String {
    let authors = reference
        .authors
        .iter()
        .map(|a| a.full_name.as_str())
        .collect::<Vec<_>>()
        .join(" and ");

    let mut fields = vec![
        format!("TITLE = {{{}}}", reference.title),
        format!("AUTHOR = {{{}}}", authors),
    ];
    if let Some(date) = reference.published_date {
        fields.push(format!("YEAR = {}", date.year()));
        fields.push(format!("MONTH = {}", date.month()));
    }

    let mut stanza = format!("@ARTICLE{{{},\n", reference.citation_key);
    for field in fields {
        stanza.push('\t');
        stanza.push_str(&field);
        stanza.push_str(",\n");
    }
    stanza.push('}');
    stanza
}
