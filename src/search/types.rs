use std::fmt;

use serde::Serialize;

use crate::error::NexafsError;
use crate::model::Molecule;

/// How a molecule matched a query, in precedence order (first is strongest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// CAS registry number equals the query
    RegistryExact,
    /// External compound id equals the query
    ExternalIdExact,
    /// Canonical name or a synonym equals the query
    NameExact,
    /// Canonical name, formula, or a synonym starts with the query
    NamePrefix,
    /// Full-text match on name + formula
    TextSearchOnName,
    /// Full-text match on a synonym
    TextSearchOnSynonym,
}

impl MatchType {
    /// Stable label
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::RegistryExact => "registry_exact",
            MatchType::ExternalIdExact => "external_id_exact",
            MatchType::NameExact => "name_exact",
            MatchType::NamePrefix => "name_prefix",
            MatchType::TextSearchOnName => "text_search_on_name",
            MatchType::TextSearchOnSynonym => "text_search_on_synonym",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    limit: Option<usize>,
    offset: usize,
    match_registry: bool,
    match_external_id: bool,
}

impl SearchRequest {
    /// Create a request; the query is trimmed and must not be empty
    pub fn new(query: &str) -> Result<Self, NexafsError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NexafsError::validation("search query must not be empty"));
        }

        Ok(Self {
            query: query.to_string(),
            limit: None,
            offset: 0,
            match_registry: true,
            match_external_id: true,
        })
    }

    /// Set the page size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of ranked results to skip
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Enable or disable CAS registry number matching
    pub fn with_registry_matching(mut self, enabled: bool) -> Self {
        self.match_registry = enabled;
        self
    }

    /// Enable or disable external compound id matching
    pub fn with_external_id_matching(mut self, enabled: bool) -> Self {
        self.match_external_id = enabled;
        self
    }

    /// Trimmed query text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Requested page size, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Results to skip
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether registry numbers are matched
    pub fn match_registry(&self) -> bool {
        self.match_registry
    }

    /// Whether external ids are matched
    pub fn match_external_id(&self) -> bool {
        self.match_external_id
    }
}

/// A molecule with its computed match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMolecule {
    /// The molecule
    pub molecule: Molecule,

    /// Primary synonym, else shortest synonym, else canonical name
    pub display_name: String,

    /// All synonyms in display order
    pub synonyms: Vec<String>,

    /// Strongest strategy that matched
    pub match_type: MatchType,

    /// Relevance within the match type (higher is better)
    pub score: f64,
}

/// One page of ranked results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    /// Trimmed query text
    pub query: String,

    /// Ranked results for this page
    pub results: Vec<RankedMolecule>,

    /// Candidates found before pagination
    pub total_candidates: usize,

    /// Page size used
    pub limit: usize,

    /// Results skipped
    pub offset: usize,

    /// True iff this page is full; a heuristic, not an existence check
    pub has_more: bool,
}
