//! Query string preparation for FTS5 `MATCH`.
//!
//! Clients send query-string searches where terms written next to each other
//! match any of them (`jobTitle:clerk jobTitle:teller` finds both). FTS5 reads
//! juxtaposition as AND, so implicit operators are made explicit `OR`s before
//! the query reaches the engine. Explicit `AND`/`OR`/`NOT`, quoted phrases and
//! `NEAR(...)` groups are kept as written.

const OPERATORS: [&str; 4] = ["AND", "OR", "NOT", "+"];

/// Rewrites `query` so that juxtaposed terms are joined with `OR`. Queries
/// with unbalanced quotes or brackets are returned untouched and left for
/// FTS5 to reject.
pub fn with_default_or(query: &str) -> String {
    match split_terms(query) {
        Some(terms) => join_terms(&terms),
        None => query.to_string(),
    }
}

/// Top-level terms, keeping quoted phrases and bracketed groups whole.
fn split_terms(query: &str) -> Option<Vec<&str>> {
    let mut terms = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_quotes = false;

    for (i, c) in query.char_indices() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                start.get_or_insert(i);
            }
            '(' | '{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' | '}' => {
                depth = depth.checked_sub(1)?;
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    terms.push(&query[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if in_quotes || depth != 0 {
        return None;
    }
    if let Some(s) = start {
        terms.push(&query[s..]);
    }
    Some(terms)
}

fn join_terms(terms: &[&str]) -> String {
    let mut out = String::new();
    let mut previous_is_term = false;
    for term in terms {
        let is_operator = OPERATORS.contains(term);
        if !out.is_empty() {
            out.push(' ');
        }
        if previous_is_term && !is_operator {
            out.push_str("OR ");
        }
        if is_operator {
            out.push_str(term);
        } else {
            out.push_str(&rewrite_group(term));
        }
        previous_is_term = !is_operator;
    }
    out
}

/// `(a b)` and `column:(a b)` groups get the same treatment inside.
fn rewrite_group(term: &str) -> String {
    let Some(open) = term.find('(') else {
        return term.to_string();
    };
    let prefix = &term[..open];
    let is_group = prefix.is_empty() || (prefix.ends_with(':') && !prefix.contains('"'));
    if !is_group || !term.ends_with(')') || matching_paren(term, open) != Some(term.len() - 1) {
        return term.to_string();
    }
    format!("{}({})", prefix, with_default_or(&term[open + 1..term.len() - 1]))
}

fn matching_paren(term: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    for (i, c) in term[open..].char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}
