//! Corpus assembly: static law sources followed by runtime-ingested pages.

use std::collections::HashMap;

use renter_aid_knowledge::{LawSearchResult, LawSource};

/// The unit the retriever indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Source URL.
    pub id: String,
    /// Indexed text: title, summary or snippet, then keywords.
    pub text: String,
    pub result: LawSearchResult,
}

impl Document {
    fn new(result: LawSearchResult, summary: &str, keywords: &[impl AsRef<str>]) -> Self {
        let keywords: Vec<&str> = keywords.iter().map(AsRef::as_ref).collect();
        Self {
            id: result.source_url.clone(),
            text: format!("{} {} {}", result.title, summary, keywords.join(" ")),
            result,
        }
    }

    pub fn from_source(source: &LawSource) -> Self {
        Self::new(source.to_result(), source.summary, source.keywords)
    }
}

/// A page added at runtime, with the keywords it was ingested under.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeEntry {
    pub result: LawSearchResult,
    pub keywords: Vec<String>,
}

impl RuntimeEntry {
    fn to_document(&self) -> Document {
        Document::new(self.result.clone(), &self.result.snippet, self.keywords.as_slice())
    }
}

/// Runtime entries keyed by source URL.
///
/// Last write wins; an overwritten entry keeps its original insertion slot.
#[derive(Debug, Default)]
pub struct RuntimeCorpus {
    entries: Vec<RuntimeEntry>,
    positions: HashMap<String, usize>,
}

impl RuntimeCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns `true` if an entry with this URL existed.
    pub fn upsert(&mut self, result: LawSearchResult, keywords: Vec<String>) -> bool {
        let entry = RuntimeEntry { result, keywords };
        match self.positions.get(&entry.result.source_url) {
            Some(&pos) => {
                self.entries[pos] = entry;
                true
            }
            None => {
                self.positions
                    .insert(entry.result.source_url.clone(), self.entries.len());
                self.entries.push(entry);
                false
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&RuntimeEntry> {
        self.positions.get(url).map(|&pos| &self.entries[pos])
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RuntimeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Static sources in table order, then runtime entries in insertion order.
///
/// Not cached: each index rebuild calls this so runtime additions show up.
pub fn collect_corpus(sources: &[LawSource], runtime: &RuntimeCorpus) -> Vec<Document> {
    sources
        .iter()
        .map(Document::from_source)
        .chain(runtime.iter().map(RuntimeEntry::to_document))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use renter_aid_knowledge::law_sources;

    use super::*;

    fn result(url: &str, title: &str) -> LawSearchResult {
        LawSearchResult {
            source_url: url.into(),
            title: title.into(),
            snippet: "snippet text".into(),
            as_of_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[test]
    fn document_text_joins_title_summary_keywords() {
        let source = &law_sources()[4];
        let doc = Document::from_source(source);
        assert_eq!(
            doc.text,
            format!("VCAT fees {} vcat fees calculator", source.summary)
        );
        assert_eq!(doc.id, "https://www.vcat.vic.gov.au/fees");
    }

    #[test]
    fn runtime_document_uses_snippet() {
        let mut runtime = RuntimeCorpus::new();
        runtime.upsert(result("https://x/a", "Title A"), vec!["noise".into()]);
        let docs = collect_corpus(&[], &runtime);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "Title A snippet text noise");
    }

    #[test]
    fn static_before_runtime() {
        let mut runtime = RuntimeCorpus::new();
        runtime.upsert(result("https://x/a", "A"), vec![]);
        runtime.upsert(result("https://x/b", "B"), vec![]);

        let docs = collect_corpus(law_sources(), &runtime);
        assert_eq!(docs.len(), law_sources().len() + 2);
        for (doc, source) in docs.iter().zip(law_sources()) {
            assert_eq!(doc.id, source.url);
        }
        assert_eq!(docs[docs.len() - 2].id, "https://x/a");
        assert_eq!(docs[docs.len() - 1].id, "https://x/b");
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let mut runtime = RuntimeCorpus::new();
        assert!(!runtime.upsert(result("https://x/a", "A"), vec!["one".into()]));
        assert!(!runtime.upsert(result("https://x/b", "B"), vec![]));
        assert!(runtime.upsert(result("https://x/a", "A2"), vec!["two".into()]));

        assert_eq!(runtime.len(), 2);
        let first = runtime.iter().next().unwrap();
        assert_eq!(first.result.title, "A2");
        assert_eq!(first.keywords, vec!["two".to_string()]);
        assert_eq!(runtime.get("https://x/b").unwrap().result.title, "B");
    }
}
