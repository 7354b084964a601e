use crate::config::SearchConfig;
use async_trait::async_trait;
use log::{debug, warn};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Rewriting angle requested from the query rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpansionStrategy {
    /// Rephrase with synonyms of the key terms
    Synonym,
    /// Surface a closely related technical concept
    RelatedConcept,
    /// Focus on the likely implementation pattern
    ImplementationPattern,
    /// Focus on error handling around the behavior
    ErrorHandling,
    /// Focus on performance characteristics
    Performance,
}

impl ExpansionStrategy {
    /// Instruction sent to the rewriter for this angle
    pub fn directive(self) -> &'static str {
        match self {
            ExpansionStrategy::Synonym => {
                "Rephrase the query using synonyms for its key technical terms"
            }
            ExpansionStrategy::RelatedConcept => {
                "Name a closely related technical concept a developer would also search for"
            }
            ExpansionStrategy::ImplementationPattern => {
                "Rephrase the query to describe the implementation pattern it refers to"
            }
            ExpansionStrategy::ErrorHandling => {
                "Rephrase the query to focus on error handling around this behavior"
            }
            ExpansionStrategy::Performance => {
                "Rephrase the query to focus on the performance side of this behavior"
            }
        }
    }

    /// Every available rewriting angle
    pub fn all() -> [ExpansionStrategy; 5] {
        [
            ExpansionStrategy::Synonym,
            ExpansionStrategy::RelatedConcept,
            ExpansionStrategy::ImplementationPattern,
            ExpansionStrategy::ErrorHandling,
            ExpansionStrategy::Performance,
        ]
    }
}

/// Opaque query rewriting service
///
/// Implementations typically wrap a language model. A call may return
/// several candidate rewrites; the expander sanitizes and dedups them.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, query: &str, strategy: ExpansionStrategy) -> anyhow::Result<Vec<String>>;
}

/// Original query plus its accepted rewrites
///
/// Element 0 is always the original query, so downstream stages can rely
/// on variant index 0 meaning "what the caller typed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedQuery {
    queries: Vec<String>,
}

impl ExpandedQuery {
    /// An expansion containing only the original query
    pub fn original_only(query: &str) -> Self {
        Self {
            queries: vec![query.to_string()],
        }
    }

    /// All queries to retrieve with, original first
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// The query the caller typed
    pub fn original(&self) -> &str {
        &self.queries[0]
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        // The original query is always present
        false
    }

    /// Add a variant unless it duplicates an existing query
    fn push_distinct(&mut self, variant: String) -> bool {
        if self.queries.contains(&variant) {
            return false;
        }
        self.queries.push(variant);
        true
    }
}

/// Fail-open query expansion
///
/// Asks the rewriter for one batch of variants per configured strategy,
/// in order, until the variant cap is reached. Any rewriter failure or
/// timeout only costs the variants that call would have produced; the
/// search always proceeds with at least the original query.
pub struct QueryExpander {
    rewriter: Option<Arc<dyn QueryRewriter>>,
    strategies: Vec<ExpansionStrategy>,
    max_variants: usize,
    timeout: Duration,
    numbering: Regex,
}

impl QueryExpander {
    pub fn new(rewriter: Option<Arc<dyn QueryRewriter>>, config: &SearchConfig) -> Self {
        Self {
            rewriter,
            strategies: config.expansion_strategies.clone(),
            max_variants: config.max_variants,
            timeout: Duration::from_millis(config.rewrite_timeout_ms),
            numbering: Regex::new(r"^\d+[.)]\s*").expect("Valid regex"),
        }
    }

    /// Expand a query into retrieval variants
    pub async fn expand(&self, query: &str) -> ExpandedQuery {
        let mut expanded = ExpandedQuery::original_only(query);

        let Some(rewriter) = &self.rewriter else {
            return expanded;
        };

        for strategy in &self.strategies {
            if expanded.len() >= self.max_variants {
                break;
            }

            match tokio::time::timeout(self.timeout, rewriter.rewrite(query, *strategy)).await {
                Ok(Ok(raw_variants)) => {
                    for raw in raw_variants {
                        if expanded.len() >= self.max_variants {
                            break;
                        }
                        if let Some(variant) = self.sanitize(&raw) {
                            if expanded.push_distinct(variant) {
                                debug!("Accepted {strategy:?} variant for '{query}'");
                            }
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!("Query expansion ({strategy:?}) failed, continuing without it: {e}");
                }
                Err(_) => {
                    warn!(
                        "Query expansion ({strategy:?}) timed out after {:?}, continuing without it",
                        self.timeout
                    );
                }
            }
        }

        expanded
    }

    /// Strip list markers and numbering; reject fragments too short to retrieve with
    fn sanitize(&self, raw: &str) -> Option<String> {
        let mut text = raw.trim();
        for marker in ["- ", "* ", "• "] {
            if let Some(stripped) = text.strip_prefix(marker) {
                text = stripped.trim_start();
            }
        }

        let text = self.numbering.replace(text, "");
        let text = text.trim().trim_matches('"').trim();

        if text.len() <= 3 {
            return None;
        }
        Some(text.to_string())
    }
}
