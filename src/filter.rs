use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

/// Returns the positions in `candidates` that fuzzy-match `query`, best match
/// first.
///
/// Each matching position appears once, so duplicate names are kept and stay
/// distinguishable. Equally scored entries keep their input order. Callers
/// handle the empty query themselves.
pub fn rank(query: &str, candidates: &[String]) -> Vec<usize> {
    let matcher = SkimMatcherV2::default();
    let mut scored = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            matcher
                .fuzzy_match(candidate, query)
                .map(|score| (score, index))
        })
        .collect::<Vec<_>>();

    // sort_by is stable, so ties keep candidate order.
    scored.sort_by(|left, right| right.0.cmp(&left.0));

    debug!(
        query_len = query.len(),
        candidates = candidates.len(),
        matches = scored.len(),
        "ranked candidates"
    );

    scored.into_iter().map(|(_, index)| index).collect()
}
