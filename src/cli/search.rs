use anyhow::Result;

use nexafs::search::{SearchRanker, SearchRequest};

use super::{heading, Session};

/// Search molecules and print one page of results
pub fn run(
    session: &Session,
    query: &str,
    limit: Option<usize>,
    offset: usize,
    match_registry: bool,
    match_external_id: bool,
    json: bool,
) -> Result<()> {
    let store = session.open_store()?;
    let file = &session.config.search;

    let mut request = SearchRequest::new(query)?
        .with_offset(offset)
        .with_registry_matching(match_registry && file.match_registry.unwrap_or(true))
        .with_external_id_matching(match_external_id && file.match_external_id.unwrap_or(true));
    if let Some(limit) = limit {
        request = request.with_limit(limit);
    }

    let ranker = SearchRanker::new(session.config.search_config());
    let page = ranker.search(&store.repository(), &request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!(
        "{}",
        heading(&format!(
            "Results for {:?} ({} of {} candidates)",
            page.query,
            page.results.len(),
            page.total_candidates
        ))
    );
    for (i, result) in page.results.iter().enumerate() {
        println!(
            "{:3}. {:<30} {:<12} {:<22} {:>7.2}  {}",
            page.offset + i + 1,
            result.display_name,
            result.molecule.chemical_formula,
            result.match_type,
            result.score,
            result.molecule.id
        );
    }
    if page.has_more {
        println!(
            "More results may be available: --offset {}",
            page.offset + page.limit
        );
    }
    Ok(())
}
