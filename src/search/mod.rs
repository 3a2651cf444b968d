//! # Search Module
//!
//! Molecule search with a fixed match-type precedence.
//!
//! ## Pipeline
//!
//! 1. **Candidates**: the store returns every molecule matched by an exact
//!    registry/external id, a case-insensitive prefix on name, formula, or
//!    synonym, or (queries of 3+ characters) a full-text match on
//!    name + formula or on a synonym.
//! 2. **Classification**: each candidate walks the ranking table in order;
//!    the first rule whose predicate holds assigns the match type and score.
//! 3. **Ordering**: match type precedence, then score descending, then
//!    canonical name ascending.
//! 4. **Pagination**: `offset`/`limit` over the ordered list.
//!
//! The ranking table is plain data ([`RankingRule`]), so precedence can be
//! tested without a database.

mod config;
mod fts;
mod ranker;
mod rules;
mod types;

#[cfg(test)]
mod tests;

pub use config::SearchConfig;
pub use fts::{full_text_expression, FULL_TEXT_MIN_CHARS};
pub use ranker::SearchRanker;
pub use rules::{default_rules, RankingRule, RuleContext, EXACT_SCORE, PREFIX_SCORE};
pub use types::{MatchType, RankedMolecule, SearchPage, SearchRequest};
