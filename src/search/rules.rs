use crate::store::MoleculeCandidate;

use super::MatchType;

/// Score assigned to exact matches
pub const EXACT_SCORE: f64 = 10.0;

/// Score assigned to prefix matches
pub const PREFIX_SCORE: f64 = 5.0;

/// Query-side inputs shared by every rule
#[derive(Debug, Clone)]
pub struct RuleContext {
    /// Lowercased, trimmed query
    pub query: String,

    /// Whether registry numbers may match
    pub match_registry: bool,

    /// Whether external ids may match
    pub match_external_id: bool,
}

impl RuleContext {
    /// Build a context from raw query text
    pub fn new(query: &str, match_registry: bool, match_external_id: bool) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            match_registry,
            match_external_id,
        }
    }

    fn equals(&self, value: &str) -> bool {
        value.to_lowercase() == self.query
    }

    fn prefixes(&self, value: &str) -> bool {
        value.to_lowercase().starts_with(&self.query)
    }
}

/// One row of the ranking table
#[derive(Clone, Copy)]
pub struct RankingRule {
    /// Match type assigned when the predicate holds
    pub match_type: MatchType,

    /// Whether this rule applies to a candidate
    pub applies: fn(&RuleContext, &MoleculeCandidate) -> bool,

    /// Score within the match type (higher is better)
    pub score: fn(&RuleContext, &MoleculeCandidate) -> f64,
}

impl std::fmt::Debug for RankingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingRule")
            .field("match_type", &self.match_type)
            .finish_non_exhaustive()
    }
}

impl RankingRule {
    /// Score for a candidate if this rule applies
    pub fn evaluate(&self, ctx: &RuleContext, candidate: &MoleculeCandidate) -> Option<f64> {
        (self.applies)(ctx, candidate).then(|| (self.score)(ctx, candidate))
    }
}

fn registry_exact(ctx: &RuleContext, c: &MoleculeCandidate) -> bool {
    ctx.match_registry && c.molecule.cas_number.as_deref().is_some_and(|v| ctx.equals(v))
}

fn external_id_exact(ctx: &RuleContext, c: &MoleculeCandidate) -> bool {
    ctx.match_external_id && c.molecule.pubchem_cid.as_deref().is_some_and(|v| ctx.equals(v))
}

fn name_exact(ctx: &RuleContext, c: &MoleculeCandidate) -> bool {
    ctx.equals(&c.molecule.iupac_name) || c.synonyms.iter().any(|s| ctx.equals(&s.synonym))
}

fn name_prefix(ctx: &RuleContext, c: &MoleculeCandidate) -> bool {
    ctx.prefixes(&c.molecule.iupac_name)
        || ctx.prefixes(&c.molecule.chemical_formula)
        || c.synonyms.iter().any(|s| ctx.prefixes(&s.synonym))
}

fn name_text(_: &RuleContext, c: &MoleculeCandidate) -> bool {
    c.name_text_rank.is_some()
}

fn synonym_text(_: &RuleContext, c: &MoleculeCandidate) -> bool {
    c.synonym_text_rank.is_some()
}

fn exact_score(_: &RuleContext, _: &MoleculeCandidate) -> f64 {
    EXACT_SCORE
}

fn prefix_score(_: &RuleContext, _: &MoleculeCandidate) -> f64 {
    PREFIX_SCORE
}

fn name_text_score(_: &RuleContext, c: &MoleculeCandidate) -> f64 {
    c.name_text_rank.unwrap_or_default()
}

fn synonym_text_score(_: &RuleContext, c: &MoleculeCandidate) -> f64 {
    c.synonym_text_rank.unwrap_or_default()
}

/// The standard ranking table, strongest rule first
pub fn default_rules() -> Vec<RankingRule> {
    vec![
        RankingRule {
            match_type: MatchType::RegistryExact,
            applies: registry_exact,
            score: exact_score,
        },
        RankingRule {
            match_type: MatchType::ExternalIdExact,
            applies: external_id_exact,
            score: exact_score,
        },
        RankingRule {
            match_type: MatchType::NameExact,
            applies: name_exact,
            score: exact_score,
        },
        RankingRule {
            match_type: MatchType::NamePrefix,
            applies: name_prefix,
            score: prefix_score,
        },
        RankingRule {
            match_type: MatchType::TextSearchOnName,
            applies: name_text,
            score: name_text_score,
        },
        RankingRule {
            match_type: MatchType::TextSearchOnSynonym,
            applies: synonym_text,
            score: synonym_text_score,
        },
    ]
}
