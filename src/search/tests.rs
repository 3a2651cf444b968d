use super::*;
use crate::error::ErrorKind;
use crate::model::{Molecule, Synonym};
use crate::store::{MoleculeCandidate, Repository, Store};
use proptest::prelude::*;

fn candidate(name: &str, formula: &str, synonyms: &[&str]) -> MoleculeCandidate {
    MoleculeCandidate {
        molecule: Molecule::new(name, formula),
        synonyms: synonyms
            .iter()
            .enumerate()
            .map(|(i, s)| Synonym::new(*s, i as i32))
            .collect(),
        name_text_rank: None,
        synonym_text_rank: None,
    }
}

fn request(query: &str) -> SearchRequest {
    SearchRequest::new(query).unwrap()
}

fn seeded_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    let repo = store.repository();
    let corpus: [(&str, &str, Option<&str>, Option<&str>, &[&str]); 5] = [
        ("benzene", "C6H6", Some("71-43-2"), Some("241"), &["benzol"]),
        ("benzoic acid", "C7H6O2", Some("65-85-0"), Some("243"), &[]),
        ("acetic acid", "C2H4O2", Some("64-19-7"), Some("176"), &["ethanoic acid", "vinegar"]),
        ("toluene", "C7H8", Some("108-88-3"), Some("1140"), &["methylbenzene"]),
        ("pyridine", "C5H5N", Some("110-86-1"), Some("1049"), &["azine"]),
    ];
    for (name, formula, cas, cid, synonyms) in corpus {
        let mut molecule = Molecule::new(name, formula);
        molecule.cas_number = cas.map(str::to_string);
        molecule.pubchem_cid = cid.map(str::to_string);
        let synonyms: Vec<Synonym> = synonyms
            .iter()
            .enumerate()
            .map(|(i, s)| Synonym::new(*s, i as i32))
            .collect();
        repo.insert_molecule(&molecule, &synonyms).unwrap();
    }
    store
}

// ==================== Request Tests ====================

#[test]
fn test_request_trims_query() {
    let req = request("  benzene \t");
    assert_eq!(req.query(), "benzene");
    assert_eq!(req.offset(), 0);
    assert!(req.limit().is_none());
    assert!(req.match_registry());
    assert!(req.match_external_id());
}

#[test]
fn test_request_rejects_blank_query() {
    for blank in ["", "   ", "\t\n"] {
        let error = SearchRequest::new(blank).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }
}

#[test]
fn test_match_type_precedence_order() {
    let mut types = vec![
        MatchType::TextSearchOnSynonym,
        MatchType::NamePrefix,
        MatchType::RegistryExact,
        MatchType::TextSearchOnName,
        MatchType::NameExact,
        MatchType::ExternalIdExact,
    ];
    types.sort();
    assert_eq!(
        types,
        vec![
            MatchType::RegistryExact,
            MatchType::ExternalIdExact,
            MatchType::NameExact,
            MatchType::NamePrefix,
            MatchType::TextSearchOnName,
            MatchType::TextSearchOnSynonym,
        ]
    );
    assert_eq!(MatchType::NamePrefix.to_string(), "name_prefix");
}

// ==================== Full-Text Expression Tests ====================

#[test]
fn test_full_text_expression_quotes_tokens() {
    assert_eq!(full_text_expression("acetic acid").as_deref(), Some("\"acetic\" \"acid\""));
    assert_eq!(full_text_expression("C6H6").as_deref(), Some("\"C6H6\""));
}

#[test]
fn test_full_text_expression_strips_operators() {
    assert_eq!(
        full_text_expression("a* OR \"b\"(c)").as_deref(),
        Some("\"a\" \"OR\" \"b\" \"c\"")
    );
    assert!(full_text_expression("*:^~").is_none());
}

#[test]
fn test_short_query_skips_full_text() {
    let ranker = SearchRanker::default();
    assert!(ranker.candidate_query(&request("ac")).full_text.is_none());
    assert!(ranker.candidate_query(&request("aci")).full_text.is_some());
    // punctuation only: long enough, but nothing to search for
    assert!(ranker.candidate_query(&request("---")).full_text.is_none());
}

#[test]
fn test_candidate_query_carries_flags() {
    let ranker = SearchRanker::default();
    let req = request("71-43-2")
        .with_registry_matching(false)
        .with_external_id_matching(false);
    let cq = ranker.candidate_query(&req);
    assert_eq!(cq.text, "71-43-2");
    assert!(!cq.match_registry);
    assert!(!cq.match_external_id);
}

// ==================== Rule Table Tests ====================

#[test]
fn test_registry_exact_beats_higher_text_rank() {
    let ranker = SearchRanker::default();
    let mut registry = candidate("zeta", "C1", &[]);
    registry.molecule.cas_number = Some("71-43-2".to_string());

    let mut text = candidate("alpha 71 43 2", "C2", &[]);
    text.name_text_rank = Some(1000.0);

    let ranked = ranker.rank(&request("71-43-2"), vec![text, registry]);
    assert_eq!(ranked[0].molecule.iupac_name, "zeta");
    assert_eq!(ranked[0].match_type, MatchType::RegistryExact);
    assert_eq!(ranked[0].score, EXACT_SCORE);
    assert_eq!(ranked[1].match_type, MatchType::TextSearchOnName);
}

#[test]
fn test_registry_match_disabled_falls_through() {
    let ranker = SearchRanker::default();
    let mut registry = candidate("zeta", "C1", &[]);
    registry.molecule.cas_number = Some("71-43-2".to_string());

    let req = request("71-43-2").with_registry_matching(false);
    assert!(ranker.rank(&req, vec![registry]).is_empty());
}

#[test]
fn test_external_id_exact() {
    let ranker = SearchRanker::default();
    let mut molecule = candidate("benzene", "C6H6", &[]);
    molecule.molecule.pubchem_cid = Some("241".to_string());

    let ranked = ranker.rank(&request("241"), vec![molecule]);
    assert_eq!(ranked[0].match_type, MatchType::ExternalIdExact);
}

#[test]
fn test_name_exact_on_synonym_is_case_insensitive() {
    let ranker = SearchRanker::default();
    let ranked = ranker.rank(
        &request("BENZOL"),
        vec![candidate("benzene", "C6H6", &["benzol"])],
    );
    assert_eq!(ranked[0].match_type, MatchType::NameExact);
    assert_eq!(ranked[0].score, EXACT_SCORE);
}

#[test]
fn test_formula_prefix_is_name_prefix() {
    let ranker = SearchRanker::default();
    let ranked = ranker.rank(&request("c6"), vec![candidate("benzene", "C6H6", &[])]);
    assert_eq!(ranked[0].match_type, MatchType::NamePrefix);
    assert_eq!(ranked[0].score, PREFIX_SCORE);
}

#[test]
fn test_text_rank_orders_within_match_type() {
    let ranker = SearchRanker::default();
    let mut low = candidate("aaa", "X", &[]);
    low.name_text_rank = Some(1.0);
    let mut high = candidate("zzz", "Y", &[]);
    high.name_text_rank = Some(3.0);
    let mut synonym = candidate("bbb", "Z", &[]);
    synonym.synonym_text_rank = Some(99.0);

    let ranked = ranker.rank(&request("query"), vec![synonym, low, high]);
    let names: Vec<&str> = ranked.iter().map(|r| r.molecule.iupac_name.as_str()).collect();
    assert_eq!(names, vec!["zzz", "aaa", "bbb"]);
}

#[test]
fn test_ties_break_by_canonical_name() {
    let ranker = SearchRanker::default();
    let ranked = ranker.rank(
        &request("benz"),
        vec![
            candidate("benzoic acid", "C7H6O2", &[]),
            candidate("benzaldehyde", "C7H6O", &[]),
            candidate("benzene", "C6H6", &[]),
        ],
    );
    let names: Vec<&str> = ranked.iter().map(|r| r.molecule.iupac_name.as_str()).collect();
    assert_eq!(names, vec!["benzaldehyde", "benzene", "benzoic acid"]);
}

#[test]
fn test_ranked_result_annotations() {
    let ranker = SearchRanker::default();
    let mut c = candidate("ethanoic acid", "C2H4O2", &[]);
    c.synonyms = vec![Synonym::new("vinegar acid", 2), Synonym::new("AcOH", 1)];
    let ranked = ranker.rank(&request("ethanoic"), vec![c]);

    assert_eq!(ranked[0].display_name, "AcOH");
    assert_eq!(ranked[0].synonyms, vec!["vinegar acid", "AcOH"]);
}

#[test]
fn test_custom_rule_table() {
    let rules: Vec<RankingRule> = default_rules()
        .into_iter()
        .filter(|r| r.match_type != MatchType::NamePrefix)
        .collect();
    let ranker = SearchRanker::with_rules(rules, SearchConfig::default());

    assert!(ranker
        .rank(&request("benz"), vec![candidate("benzene", "C6H6", &[])])
        .is_empty());
}

// ==================== Store-Backed Tests ====================

#[test]
fn test_search_exact_name_round_trip() {
    let store = seeded_store();
    let page = SearchRanker::default()
        .search(&store.repository(), &request("benzene"))
        .unwrap();

    assert_eq!(page.results[0].molecule.iupac_name, "benzene");
    assert_eq!(page.results[0].match_type, MatchType::NameExact);
    assert_eq!(page.results[0].display_name, "benzol");
}

#[test]
fn test_search_registry_number_first() {
    let store = seeded_store();
    let page = SearchRanker::default()
        .search(&store.repository(), &request("64-19-7"))
        .unwrap();

    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].molecule.iupac_name, "acetic acid");
    assert_eq!(page.results[0].match_type, MatchType::RegistryExact);
}

#[test]
fn test_search_full_text_only_for_long_queries() {
    let store = seeded_store();
    let ranker = SearchRanker::default();

    let page = ranker.search(&store.repository(), &request("acid")).unwrap();
    let names: Vec<&str> = page
        .results
        .iter()
        .map(|r| r.molecule.iupac_name.as_str())
        .collect();
    assert!(names.contains(&"acetic acid"));
    assert!(names.contains(&"benzoic acid"));
    assert_eq!(page.results[0].match_type, MatchType::TextSearchOnName);

    // "az" would full-text match nothing either way, but only prefix runs
    let cq = ranker.candidate_query(&request("az"));
    assert!(cq.full_text.is_none());
    let page = ranker.search(&store.repository(), &request("az")).unwrap();
    assert_eq!(page.results[0].match_type, MatchType::NamePrefix);
}

#[test]
fn test_search_prefix_on_non_ascii_names() {
    let store = seeded_store();
    let repo = store.repository();
    repo.insert_molecule(&Molecule::new("Éthanol", "C2H6O"), &[]).unwrap();
    repo.insert_molecule(&Molecule::new("Ωmega", "C4H4"), &[]).unwrap();
    let ranker = SearchRanker::default();

    for text in ["éth", "Éth"] {
        let page = ranker.search(&repo, &request(text)).unwrap();
        assert_eq!(page.results.len(), 1, "{text}");
        assert_eq!(page.results[0].molecule.iupac_name, "Éthanol");
        assert_eq!(page.results[0].match_type, MatchType::NamePrefix);
    }

    // two characters: no full-text fallback, so the prefix path must fold
    let page = ranker.search(&repo, &request("ωm")).unwrap();
    assert_eq!(page.results[0].molecule.iupac_name, "Ωmega");
    assert_eq!(page.results[0].match_type, MatchType::NamePrefix);

    let page = ranker.search(&repo, &request("éthanol")).unwrap();
    assert_eq!(page.results[0].match_type, MatchType::NameExact);
}

#[test]
fn test_search_no_candidates_is_not_found() {
    let store = seeded_store();
    let error = SearchRanker::default()
        .search(&store.repository(), &request("xenon"))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn test_search_offset_past_end_is_empty_page() {
    let store = seeded_store();
    let page = SearchRanker::default()
        .search(&store.repository(), &request("benz").with_offset(10))
        .unwrap();
    assert!(page.results.is_empty());
    assert!(!page.has_more);
    assert_eq!(page.total_candidates, 2);
}

#[test]
fn test_search_has_more_heuristic() {
    let store = seeded_store();
    let ranker = SearchRanker::default();
    let repo = store.repository();

    let full = ranker.search(&repo, &request("benz").with_limit(2)).unwrap();
    assert_eq!(full.results.len(), 2);
    assert!(full.has_more);

    let partial = ranker.search(&repo, &request("benz").with_limit(3)).unwrap();
    assert_eq!(partial.results.len(), 2);
    assert!(!partial.has_more);
}

#[test]
fn test_search_rejects_bad_limit() {
    let store = seeded_store();
    let ranker = SearchRanker::default();
    for limit in [0, 101] {
        let error = ranker
            .search(&store.repository(), &request("benz").with_limit(limit))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }
}

// ==================== Property Tests ====================

fn arb_candidate() -> impl Strategy<Value = MoleculeCandidate> {
    (
        "[a-c]{1,4}",
        "[A-C][0-9]",
        prop::collection::vec("[a-c]{1,4}", 0..3),
        prop::option::of(0.0f64..10.0),
        prop::option::of(0.0f64..10.0),
    )
        .prop_map(|(name, formula, synonyms, name_rank, synonym_rank)| {
            let synonyms: Vec<&str> = synonyms.iter().map(String::as_str).collect();
            let mut c = candidate(&name, &formula, &synonyms);
            c.name_text_rank = name_rank;
            c.synonym_text_rank = synonym_rank;
            c
        })
}

/// Canonical names are unique in the store, so generated corpora are too
fn arb_corpus() -> impl Strategy<Value = Vec<MoleculeCandidate>> {
    prop::collection::vec(arb_candidate(), 0..20).prop_map(|mut corpus| {
        let mut seen = std::collections::HashSet::new();
        corpus.retain(|c| seen.insert(c.molecule.iupac_name.clone()));
        corpus
    })
}

proptest! {
    #[test]
    fn prop_ranking_is_deterministic(corpus in arb_corpus(), query in "[a-c]{1,3}") {
        let ranker = SearchRanker::default();
        let req = request(&query);

        let mut reversed = corpus.clone();
        reversed.reverse();

        let first: Vec<String> = ranker.rank(&req, corpus).into_iter().map(|r| r.molecule.iupac_name).collect();
        let second: Vec<String> = ranker.rank(&req, reversed).into_iter().map(|r| r.molecule.iupac_name).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_ranking_respects_precedence(corpus in arb_corpus(), query in "[a-c]{1,3}") {
        let ranked = SearchRanker::default().rank(&request(&query), corpus);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].match_type <= pair[1].match_type);
            if pair[0].match_type == pair[1].match_type {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].molecule.iupac_name < pair[1].molecule.iupac_name);
                }
            }
        }
    }
}
