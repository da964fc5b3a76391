//! Reference and live-directive extraction from formula text.
//!
//! Parses formula text to find the cell references (e.g. `A1`, `B2`) the
//! formula depends on, and the optional `LIVE('metric')` directive binding a
//! cell to a streamed metric. Live extraction must run first: a live formula
//! never undergoes reference extraction, so a quoted metric name can never be
//! mistaken for a cell token.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Extract all cell references from a formula, in first-appearance order,
/// de-duplicated. References are uppercase-only and word-bounded; no bounds
/// validation is performed against any grid size.
pub fn extract_references(text: &str) -> Vec<CellRef> {
    // Ignore references inside string literals.
    let text = strip_string_literals(text);

    let mut refs = Vec::new();
    for m in cell_ref_re().find_iter(&text) {
        if let Some(cr) = CellRef::from_str(m.as_str())
            && !refs.contains(&cr)
        {
            refs.push(cr);
        }
    }
    refs
}

/// Extract the metric name of a `LIVE('name')` / `LIVE("name")` directive.
/// Case-insensitive; first match only - a cell carries at most one binding.
/// A directive with an empty or unquoted name is not recognized and falls
/// through to ordinary evaluation.
pub fn extract_live_metric(text: &str) -> Option<String> {
    let caps = live_fn_re().captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn cell_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]+[0-9]+\b").expect("cell reference regex must compile"))
}

fn live_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bLIVE\(\s*(?:'([^']+)'|"([^"]+)")\s*\)"#)
            .expect("live directive regex must compile")
    })
}

fn strip_string_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
                out.push(ch);
            }
            Some(_) => out.push(' '),
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }

    out
}
