//! Presentation payload helpers for live analyses.
//!
//! The catalog ships hand-authored experiment counts and graph elements;
//! live results derive equivalents from the enriched documents so both
//! paths render through the same UI shape. Keywords come from a plain
//! frequency pass over the aggregated abstracts.

use crate::engine::catalog::{ExperimentCount, GraphElement};
use crate::types::EnrichedDocument;
use std::collections::HashMap;

/// Words too common to be useful as graph nodes.
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "almost", "along", "also", "among", "been",
    "being", "between", "both", "could", "during", "each", "effect", "effects", "found", "from",
    "have", "however", "into", "many", "more", "most", "other", "over", "paper", "research",
    "results", "several", "should", "showed", "shown", "significant", "some", "study", "such",
    "than", "that", "their", "there", "these", "they", "this", "those", "through", "under",
    "using", "well", "were", "where", "which", "while", "will", "with", "within", "would",
];

const MIN_WORD_LEN: usize = 4;

/// Most frequent non-stopword terms, count-descending then alphabetical so
/// repeated runs over the same text produce the same list.
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<(String, u32)> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        let word = raw.to_lowercase();
        if word.len() < MIN_WORD_LEN
            || word.chars().any(|c| c.is_numeric())
            || STOPWORDS.contains(&word.as_str())
        {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

/// Keyword nodes for the live knowledge graph, mirroring the catalog's
/// element shape. Live analyses carry no edges; relationships are not
/// derivable from frequency alone.
pub fn keyword_graph(keywords: &[(String, u32)]) -> Vec<GraphElement> {
    keywords
        .iter()
        .map(|(word, _)| GraphElement::Node {
            id: word.clone(),
            label: word.clone(),
        })
        .collect()
}

/// Keyword frequencies as experiment-style rows for the bar chart.
pub fn keyword_rows(keywords: &[(String, u32)]) -> Vec<ExperimentCount> {
    keywords
        .iter()
        .map(|(word, count)| ExperimentCount {
            label: word.clone(),
            count: *count,
        })
        .collect()
}

/// Aggregated abstract text of an analysis, for keyword extraction.
pub fn corpus_of(documents: &[EnrichedDocument]) -> String {
    documents
        .iter()
        .map(|d| {
            let mut block = d.title.clone();
            if let crate::types::AbstractText::Found(text) = &d.abstract_text {
                block.push(' ');
                block.push_str(text);
            }
            block
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AbstractText;

    #[test]
    fn keywords_rank_by_frequency_then_alphabetically() {
        let text = "radiation dosimetry radiation shielding dosimetry radiation crew";
        let keywords = extract_keywords(text, 3);
        assert_eq!(keywords[0], ("radiation".to_string(), 3));
        assert_eq!(keywords[1], ("dosimetry".to_string(), 2));
        assert_eq!(keywords[2], ("crew".to_string(), 1));
    }

    #[test]
    fn stopwords_and_short_words_are_dropped() {
        let keywords = extract_keywords("the study showed that DNA damage was found in cells", 10);
        let words: Vec<&str> = keywords.iter().map(|(w, _)| w.as_str()).collect();
        assert!(words.contains(&"damage"));
        assert!(words.contains(&"cells"));
        assert!(!words.contains(&"study"));
        assert!(!words.contains(&"that"));
        assert!(!words.contains(&"dna")); // below the length floor
    }

    #[test]
    fn corpus_skips_marker_abstracts() {
        let documents = vec![
            EnrichedDocument {
                title: "Radiation Study".to_string(),
                url: "https://x/1".to_string(),
                abstract_text: AbstractText::Found("dosimetry data".to_string()),
            },
            EnrichedDocument {
                title: "Missing Abstract".to_string(),
                url: "https://x/2".to_string(),
                abstract_text: AbstractText::Absent,
            },
        ];
        let corpus = corpus_of(&documents);
        assert!(corpus.contains("dosimetry data"));
        assert!(corpus.contains("Missing Abstract"));
        assert!(!corpus.contains("no abstract available"));
    }

    #[test]
    fn keyword_graph_is_nodes_only() {
        let elements = keyword_graph(&[("radiation".to_string(), 3)]);
        assert_eq!(elements.len(), 1);
        assert!(matches!(elements[0], GraphElement::Node { .. }));
    }
}
