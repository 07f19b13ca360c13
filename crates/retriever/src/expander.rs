//! Query expansion — LLM paraphrases, with a synonym table when the LLM is
//! unavailable.
//!
//! The LLM path is a typed `Result`; every error variant lands in the same
//! deterministic synonym branch, so expansion itself never fails.

use std::sync::Arc;
use std::time::Duration;

use renter_aid_config::RetrievalSettings;
use renter_aid_llm::{ChatMessage, LlmError, TextGenerator};
use tracing::{debug, warn};

/// Instruction sent with every expansion request.
pub const EXPANSION_PROMPT: &str = "Generate 3 short paraphrases and legal synonyms, comma-separated.";

/// Domain synonyms, in the order they are appended.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("noise", &["nuisance", "quiet enjoyment", "loud", "disturbance"]),
    ("rent", &["increase", "assessment", "notice"]),
    ("repair", &["urgent", "hot water", "heating", "fix"]),
    ("notice", &["eviction", "vacate", "termination"]),
    ("standard", &["minimum", "heater", "electrical"]),
];

/// Why the LLM path produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    #[error("no text generator configured")]
    Unavailable,

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM returned an empty expansion")]
    Empty,
}

/// Widens a query before tokenization.
pub struct QueryExpander {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
    temperature: f32,
    max_chars: usize,
}

impl QueryExpander {
    /// Expander backed by a text generator, with default limits.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_settings(Some(generator), &RetrievalSettings::default())
    }

    /// Expander that only uses the synonym table.
    pub fn offline() -> Self {
        Self::with_settings(None, &RetrievalSettings::default())
    }

    pub fn with_settings(
        generator: Option<Arc<dyn TextGenerator>>,
        settings: &RetrievalSettings,
    ) -> Self {
        Self {
            generator,
            timeout: Duration::from_secs(settings.expansion_timeout_secs),
            temperature: settings.expansion_temperature,
            max_chars: settings.max_expansion_chars,
        }
    }

    /// Override the LLM call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Expanded query text. Never fails.
    pub async fn expand(&self, query: &str) -> String {
        let base = query.trim();
        match self.llm_expansion(base).await {
            Ok(extra) => format!("{base} {extra}"),
            Err(ExpansionError::Unavailable) => synonym_expansion(base),
            Err(e) => {
                warn!("query expansion fell back to synonyms: {e}");
                synonym_expansion(base)
            }
        }
    }

    /// First line of the LLM's paraphrases, truncated to `max_chars`.
    pub async fn llm_expansion(&self, base: &str) -> Result<String, ExpansionError> {
        let generator = self.generator.as_ref().ok_or(ExpansionError::Unavailable)?;
        let messages = [ChatMessage::system(EXPANSION_PROMPT), ChatMessage::user(base)];

        let reply = tokio::time::timeout(self.timeout, generator.chat(&messages, self.temperature))
            .await
            .map_err(|_| ExpansionError::Timeout(self.timeout))??;

        let first_line = reply.lines().next().unwrap_or("").trim();
        let extra: String = first_line.chars().take(self.max_chars).collect();
        if extra.is_empty() {
            return Err(ExpansionError::Empty);
        }
        debug!("expanded '{base}' with '{extra}'");
        Ok(extra)
    }
}

/// Append synonyms for every table key found in the lowercased query.
///
/// Keys match as substrings, so "repairs" triggers "repair". Returns the
/// query unchanged when nothing matches.
pub fn synonym_expansion(query: &str) -> String {
    let lowered = query.to_lowercase();
    let extra: Vec<&str> = SYNONYMS
        .iter()
        .filter(|(key, _)| lowered.contains(key))
        .flat_map(|(_, syns)| syns.iter().copied())
        .collect();

    if extra.is_empty() {
        query.to_string()
    } else {
        format!("{} {}", query, extra.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Replies with a fixed result and records what it was asked.
    struct Canned {
        reply: Result<String, u16>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn chat(&self, messages: &[ChatMessage], _temperature: f32) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::ApiError {
                    status: *status,
                    message: "boom".into(),
                }),
            }
        }
    }

    struct Slow;

    #[async_trait]
    impl TextGenerator for Slow {
        async fn chat(&self, _messages: &[ChatMessage], _temperature: f32) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".into())
        }
    }

    #[test]
    fn synonyms_for_matching_keys() {
        assert_eq!(
            synonym_expansion("Loud noise next door"),
            "Loud noise next door nuisance quiet enjoyment loud disturbance"
        );
    }

    #[test]
    fn synonyms_match_substrings_in_table_order() {
        assert_eq!(
            synonym_expansion("repairs after rent notice"),
            "repairs after rent notice increase assessment notice urgent hot water heating fix eviction vacate termination"
        );
    }

    #[test]
    fn synonyms_no_match_returns_query() {
        assert_eq!(synonym_expansion("bond refund"), "bond refund");
    }

    #[tokio::test]
    async fn llm_expansion_appends_first_line() {
        let generator = Canned::ok("hot water outage, urgent repair\nsecond line ignored");
        let expander = QueryExpander::new(generator.clone());
        let expanded = expander.expand("  no hot water ").await;
        assert_eq!(expanded, "no hot water hot water outage, urgent repair");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, "system");
        assert_eq!(seen[0][0].content, EXPANSION_PROMPT);
        assert_eq!(seen[0][1].content, "no hot water");
    }

    #[tokio::test]
    async fn llm_expansion_truncates_to_200_chars() {
        let long = "é".repeat(300);
        let expander = QueryExpander::new(Canned::ok(&long));
        let extra = expander.llm_expansion("q").await.unwrap();
        assert_eq!(extra.chars().count(), 200);
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_synonyms() {
        let expander = QueryExpander::new(Canned::failing(500));
        assert!(matches!(
            expander.llm_expansion("noise").await,
            Err(ExpansionError::Llm(_))
        ));
        assert_eq!(
            expander.expand("noise").await,
            "noise nuisance quiet enjoyment loud disturbance"
        );
    }

    #[tokio::test]
    async fn empty_reply_falls_back_to_synonyms() {
        let expander = QueryExpander::new(Canned::ok("\nsecond"));
        assert!(matches!(
            expander.llm_expansion("rent").await,
            Err(ExpansionError::Empty)
        ));
        assert_eq!(
            expander.expand("rent").await,
            "rent increase assessment notice"
        );
    }

    #[tokio::test]
    async fn zero_char_budget_falls_back_to_synonyms() {
        let settings = RetrievalSettings {
            max_expansion_chars: 0,
            ..RetrievalSettings::default()
        };
        let expander = QueryExpander::with_settings(Some(Canned::ok("rent review")), &settings);
        assert!(matches!(
            expander.llm_expansion("rent").await,
            Err(ExpansionError::Empty)
        ));
        assert_eq!(
            expander.expand("rent").await,
            "rent increase assessment notice"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back_to_synonyms() {
        let expander = QueryExpander::new(Arc::new(Slow)).with_timeout(Duration::from_millis(50));
        assert!(matches!(
            expander.llm_expansion("standard").await,
            Err(ExpansionError::Timeout(_))
        ));
        assert_eq!(
            expander.expand("standard").await,
            "standard minimum heater electrical"
        );
    }

    #[tokio::test]
    async fn offline_uses_synonyms_only() {
        let expander = QueryExpander::offline();
        assert_eq!(expander.expand("  bond  ").await, "bond");
        assert_eq!(
            expander.expand("notice").await,
            "notice eviction vacate termination"
        );
    }
}
