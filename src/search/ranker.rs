use std::cmp::Ordering;

use log::debug;

use crate::error::NexafsError;
use crate::model::display_name;
use crate::store::{CandidateQuery, MoleculeCandidate, Repository};

use super::fts::{full_text_expression, FULL_TEXT_MIN_CHARS};
use super::rules::{default_rules, RankingRule, RuleContext};
use super::{RankedMolecule, SearchConfig, SearchPage, SearchRequest};

/// Ranks molecule candidates with a rule table
#[derive(Debug, Clone)]
pub struct SearchRanker {
    rules: Vec<RankingRule>,
    config: SearchConfig,
}

impl Default for SearchRanker {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchRanker {
    /// Create a ranker with the standard rule table
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rules(default_rules(), config)
    }

    /// Create a ranker with a custom rule table (strongest rule first)
    pub fn with_rules(rules: Vec<RankingRule>, config: SearchConfig) -> Self {
        Self { rules, config }
    }

    /// Active configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Candidate-generation parameters for a request
    pub fn candidate_query(&self, request: &SearchRequest) -> CandidateQuery {
        let text = request.query();
        let full_text = if text.chars().count() >= FULL_TEXT_MIN_CHARS {
            full_text_expression(text)
        } else {
            None
        };

        CandidateQuery {
            text: text.to_string(),
            match_registry: request.match_registry(),
            match_external_id: request.match_external_id(),
            full_text,
        }
    }

    /// Classify and order candidates.
    ///
    /// Candidates no rule accepts are dropped.
    pub fn rank(
        &self,
        request: &SearchRequest,
        candidates: Vec<MoleculeCandidate>,
    ) -> Vec<RankedMolecule> {
        let ctx = RuleContext::new(
            request.query(),
            request.match_registry(),
            request.match_external_id(),
        );

        let mut ranked: Vec<RankedMolecule> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let (match_type, score) = self.rules.iter().find_map(|rule| {
                    rule.evaluate(&ctx, &candidate)
                        .map(|score| (rule.match_type, score))
                })?;
                Some(RankedMolecule {
                    display_name: display_name(&candidate.molecule.iupac_name, &candidate.synonyms)
                        .to_string(),
                    synonyms: candidate.synonyms.into_iter().map(|s| s.synonym).collect(),
                    molecule: candidate.molecule,
                    match_type,
                    score,
                })
            })
            .collect();

        ranked.sort_by(compare_ranked);
        ranked
    }

    /// Run a search against a repository.
    ///
    /// Fails with `NotFound` when no candidate exists at all; an offset past
    /// the end yields an empty page.
    pub fn search<R: Repository + ?Sized>(
        &self,
        repo: &R,
        request: &SearchRequest,
    ) -> Result<SearchPage, NexafsError> {
        let limit = request.limit().unwrap_or(self.config.default_limit);
        if limit == 0 || limit > self.config.max_limit {
            return Err(NexafsError::validation(format!(
                "limit must be between 1 and {}",
                self.config.max_limit
            )));
        }

        let candidates = repo.molecule_candidates(&self.candidate_query(request))?;
        if candidates.is_empty() {
            return Err(NexafsError::not_found("molecule", request.query()));
        }

        let ranked = self.rank(request, candidates);
        let total_candidates = ranked.len();
        let results: Vec<RankedMolecule> = ranked
            .into_iter()
            .skip(request.offset())
            .take(limit)
            .collect();
        debug!(
            "search {:?}: {} candidates, {} on page",
            request.query(),
            total_candidates,
            results.len()
        );

        Ok(SearchPage {
            query: request.query().to_string(),
            has_more: results.len() == limit,
            results,
            total_candidates,
            limit,
            offset: request.offset(),
        })
    }
}

fn compare_ranked(a: &RankedMolecule, b: &RankedMolecule) -> Ordering {
    a.match_type
        .cmp(&b.match_type)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.molecule.iupac_name.cmp(&b.molecule.iupac_name))
}
