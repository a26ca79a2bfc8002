use std::cmp::Reverse;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Shortens `text` to fit roughly `max_width` pixels of label space.
pub fn truncate_text(text: &str, max_width: f32) -> String {
    let max_chars = (max_width / 5.0).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let kept = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    format!("{kept}..")
}

/// Lower is better: where `term` starts in `name` plus how much longer the
/// name is. `None` when `term` does not occur in `name`.
pub fn similarity_score(name: &str, term: &str) -> Option<usize> {
    let byte_index = name.find(term)?;
    let position = name[..byte_index].chars().count();
    Some(position + name.chars().count().abs_diff(term.chars().count()))
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Up to `limit` names for a partially typed query. Names containing the
/// query come first, ordered by [`similarity_score`]; fuzzy hits follow.
pub fn rank_suggestions<'a>(
    names: impl IntoIterator<Item = &'a str>,
    query: &str,
    limit: usize,
) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut ranked = names
        .into_iter()
        .filter_map(|name| {
            let similarity = similarity_score(name, query);
            let fuzzy = fuzzy_match_score(&matcher, name, query);
            (similarity.is_some() || fuzzy.is_some()).then_some((
                similarity.unwrap_or(usize::MAX),
                Reverse(fuzzy.unwrap_or(0)),
                name,
            ))
        })
        .collect::<Vec<_>>();
    ranked.sort();
    ranked.dedup_by(|a, b| a.2 == b.2);
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, name)| name.to_owned())
        .collect()
}
