//! Helpers for space-separated mutation signatures such as `73G 263G A16129`.

use std::collections::HashMap;

use super::tree::{NodeId, PhyloTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// `<position>[.<insertion>]<base>`
    Forward,
    /// `<base><position>[.<insertion>]`
    Back,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationToken<'a> {
    pub text: &'a str,
    pub kind: MutationKind,
    pub highlighted: bool,
}

fn is_base(byte: u8) -> bool {
    byte == b'-' || byte.is_ascii_alphabetic()
}

/// Splits `<digits>[.<digits>]` off the front of `text`.
fn split_position(text: &str) -> Option<(&str, &str)> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let rest = &text[digits..];
    let Some(fraction) = rest.strip_prefix('.') else {
        return Some((&text[..digits], rest));
    };

    let fraction_digits = fraction.bytes().take_while(u8::is_ascii_digit).count();
    if fraction_digits == 0 {
        return None;
    }
    let end = digits + 1 + fraction_digits;
    Some((&text[..end], &text[end..]))
}

pub fn classify(token: &str) -> MutationKind {
    if let Some((_, rest)) = split_position(token)
        && rest.len() == 1
        && rest.bytes().all(is_base)
    {
        return MutationKind::Forward;
    }

    if let Some(&first) = token.as_bytes().first()
        && is_base(first)
        && let Some((_, rest)) = split_position(&token[1..])
        && rest.is_empty()
    {
        return MutationKind::Back;
    }

    MutationKind::Other
}

/// Whether a single mutation token satisfies a mutation search term.
///
/// `.` matches any insertion, `.<n>[base]` a specific insertion, a lone base
/// letter any mutation to that base, and anything else a token of the form
/// `[base]<term>[base]`. Comparison ignores case.
pub fn term_matches(term: &str, token: &str) -> bool {
    let term = term.trim().to_ascii_lowercase();
    let token = token.to_ascii_lowercase();
    if term.is_empty() {
        return false;
    }

    if term == "." {
        return has_insertion(&token, |_| true);
    }

    if let Some(insertion) = term.strip_prefix('.') {
        let digits = insertion.bytes().take_while(u8::is_ascii_digit).count();
        let suffix = &insertion[digits..];
        let valid_suffix = suffix.is_empty() || (suffix.len() == 1 && suffix.bytes().all(is_base));
        if digits > 0 && valid_suffix {
            return has_insertion(&token, |after_dot| after_dot.starts_with(insertion));
        }
    }

    if term.len() == 1 && term.bytes().all(is_base) {
        return split_position(token.trim_start_matches(|c: char| c.is_ascii_alphabetic()))
            .is_some_and(|(_, rest)| rest.starts_with(term.as_str()));
    }

    let without_base = token.strip_prefix(|c: char| c == '-' || c.is_ascii_alphabetic());
    [Some(token.as_str()), without_base]
        .into_iter()
        .flatten()
        .any(|candidate| {
            candidate == term
                || candidate
                    .strip_prefix(term.as_str())
                    .is_some_and(|rest| rest.len() == 1 && rest.bytes().all(is_base))
        })
}

/// Finds `<digits>.<digits>` inside `token` and tests what follows the dot.
fn has_insertion(token: &str, accept: impl Fn(&str) -> bool) -> bool {
    let bytes = token.as_bytes();
    bytes.iter().enumerate().any(|(index, &byte)| {
        byte == b'.'
            && index > 0
            && bytes[index - 1].is_ascii_digit()
            && bytes.get(index + 1).is_some_and(u8::is_ascii_digit)
            && accept(&token[index + 1..])
    })
}

/// Splits a signature into tokens, flagging back mutations and tokens that
/// match any of `terms`.
pub fn annotate<'a>(signature: &'a str, terms: &[&str]) -> Vec<MutationToken<'a>> {
    signature
        .split_whitespace()
        .map(|text| MutationToken {
            text,
            kind: classify(text),
            highlighted: terms.iter().any(|term| term_matches(term, text)),
        })
        .collect()
}

/// Combines the forward mutations of `id` and its ancestors. The youngest
/// mutation at each position wins; the result is ordered by position.
pub fn accumulate(tree: &PhyloTree, id: NodeId) -> String {
    let mut by_position: HashMap<&str, (f64, &str)> = HashMap::new();

    for current in std::iter::once(id).chain(tree.ancestors(id)) {
        let Some(signature) = tree.node(current).attributes.signature.as_deref() else {
            continue;
        };
        for token in signature.split_whitespace() {
            if classify(token) != MutationKind::Forward {
                continue;
            }
            let Some((position, _)) = split_position(token) else {
                continue;
            };
            let Ok(numeric) = position.parse::<f64>() else {
                continue;
            };
            by_position.entry(position).or_insert((numeric, token));
        }
    }

    let mut mutations = by_position.into_values().collect::<Vec<_>>();
    mutations.sort_by(|a, b| a.0.total_cmp(&b.0));
    mutations
        .into_iter()
        .map(|(_, token)| token)
        .collect::<Vec<_>>()
        .join(" ")
}
