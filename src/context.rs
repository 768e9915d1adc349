//! Assembles the bounded textual context handed to the prompt.

use crate::config::RagConfig;
use crate::retrieve::DocumentRecord;

const CONTEXT_HEADER: &str =
    "The following is disaster data collected from news articles and reports:\n\n";

/// Metadata keys rendered into a document block, in this fixed order.
const METADATA_FIELDS: [(&str, &str); 3] = [
    ("date", "Date"),
    ("location", "Location"),
    ("damage_scale", "Damage scale"),
];

/// Formats ranked documents into the context string.
///
/// Each document's content is capped at `doc_chars` characters; there is
/// no global cap because the document count is already bounded by the
/// retrieval limit.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    doc_chars: usize,
}

impl ContextBuilder {
    pub fn new(doc_chars: usize) -> Self {
        Self { doc_chars }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.context_doc_chars)
    }

    pub fn build(&self, documents: &[DocumentRecord]) -> String {
        let mut context = String::from(CONTEXT_HEADER);

        for (i, document) in documents.iter().enumerate() {
            context.push_str(&format!("Document {}:\n", i + 1));
            context.push_str(&format!("Title: {}\n", document.title));

            for (key, label) in METADATA_FIELDS {
                if let Some(value) = document.metadata.get(key) {
                    context.push_str(&format!("{}: {}\n", label, value));
                }
            }

            context.push_str(&format!(
                "Content: {}\n\n",
                truncate_chars(&document.content, self.doc_chars)
            ));
        }

        context
    }
}

/// First `limit` characters plus an ellipsis marker when over the cap.
/// Counted in chars, not bytes: the corpus is CJK-heavy.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, content: &str, pairs: &[(&str, &str)]) -> DocumentRecord {
        DocumentRecord {
            content: content.to_string(),
            title: title.to_string(),
            metadata: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn renders_header_and_numbered_blocks() {
        let builder = ContextBuilder::new(800);
        let docs = vec![
            record("Morning briefing", "fire started on the ridge", &[]),
            record("Evening update", "winds shifted east", &[]),
        ];

        let context = builder.build(&docs);
        assert!(context.starts_with(CONTEXT_HEADER));
        assert!(context.contains("Document 1:\nTitle: Morning briefing\n"));
        assert!(context.contains("Document 2:\nTitle: Evening update\n"));
        assert!(context.contains("Content: fire started on the ridge\n\n"));
    }

    #[test]
    fn metadata_fields_render_in_fixed_order_only_when_present() {
        let builder = ContextBuilder::new(800);
        let docs = vec![record(
            "Damage report",
            "text",
            &[("damage_scale", "120 ha"), ("date", "2025-03-23"), ("note", "x")],
        )];

        let context = builder.build(&docs);
        let date = context.find("Date: 2025-03-23").unwrap();
        let damage = context.find("Damage scale: 120 ha").unwrap();
        assert!(date < damage);
        assert!(!context.contains("Location:"));
        assert!(!context.contains("note"));
    }

    #[test]
    fn long_content_is_cut_to_exactly_the_cap_plus_ellipsis() {
        let builder = ContextBuilder::new(800);
        let long = "x".repeat(900);
        let context = builder.build(&[record("t", &long, &[])]);

        let content = context
            .split("Content: ")
            .nth(1)
            .unwrap()
            .trim_end();
        assert_eq!(content.chars().count(), 803);
        assert!(content.ends_with("..."));
        assert_eq!(content.trim_end_matches('.').chars().count(), 800);
    }

    #[test]
    fn short_content_is_verbatim() {
        let builder = ContextBuilder::new(800);
        let exact = "y".repeat(800);
        let context = builder.build(&[record("t", &exact, &[])]);
        assert!(context.contains(&format!("Content: {}\n", exact)));
        assert!(!context.contains("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // Multibyte text: few chars, many bytes.
        let text = "산불이 능선을 따라 확산되었다";
        assert_eq!(truncate_chars(text, 5).chars().count(), 8); // 5 + "..."
        assert_eq!(truncate_chars(text, 40), text);
    }
}
