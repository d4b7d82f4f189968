//! # Formula Parser Module
//!
//! ## Purpose
//! Parses chemical formula strings (letters, digits, one level of
//! parenthesized groups with optional trailing multipliers, e.g.
//! "Ca(AlSi2O6)2") into a mapping from element symbol to atom count.
//!
//! ## Main logic
//! - `count_atoms()`: free parse, accepts every syntactically valid element
//!   symbol and returns a fresh count map
//! - `parse_formula()`: seeded parse over a fixed set of tracked elements;
//!   a symbol outside that set is a hard error
//! - Parenthesized groups are counted separately and their contribution is
//!   scaled by the trailing multiplier before being merged, so the merge is a
//!   pure fold over per-group contribution lists
//!
//! ## Error policy
//! Malformed formulas fail fast: stray digits, characters left over after
//! tokenization, unbalanced or nested parentheses all produce a descriptive
//! `FormulaError` with the offending formula and byte position.

use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

/// Atom counts of one formula, element symbol -> number of atoms.
pub type ElementCounts = HashMap<String, usize>;

/// error types for formula parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    #[error("unknown element '{symbol}' in formula '{formula}'")]
    UnknownElement { symbol: String, formula: String },
    #[error("malformed formula '{formula}' at byte {position}")]
    Malformed { formula: String, position: usize },
    #[error("unbalanced or nested parentheses in formula '{formula}'")]
    UnbalancedParentheses { formula: String },
}

/// One parsed token: element symbol and its count, not yet merged into a
/// total. Group multipliers are applied when contributions are accumulated.
type Contribution = Vec<(String, usize)>;

// Tokenizes a flat (parenthesis-free) segment into element/count pairs.
// `offset` is the segment's start within the whole formula, used only for
// error positions.
fn tokenize_flat(
    segment: &str,
    formula: &str,
    offset: usize,
) -> Result<Contribution, FormulaError> {
    let token_re = Regex::new(r"([A-Z][a-z]*)(\d*)").unwrap();
    let mut tokens: Contribution = Vec::new();
    let mut cursor = 0;
    for caps in token_re.captures_iter(segment) {
        let whole = caps.get(0).unwrap();
        if whole.start() != cursor {
            return Err(FormulaError::Malformed {
                formula: formula.to_string(),
                position: offset + cursor,
            });
        }
        cursor = whole.end();
        let count: usize = if caps[2].is_empty() {
            1
        } else {
            caps[2].parse().map_err(|_| FormulaError::Malformed {
                formula: formula.to_string(),
                position: offset + caps.get(2).unwrap().start(),
            })?
        };
        tokens.push((caps[1].to_string(), count));
    }
    if cursor != segment.len() {
        return Err(FormulaError::Malformed {
            formula: formula.to_string(),
            position: offset + cursor,
        });
    }
    Ok(tokens)
}

fn accumulate(counts: &mut ElementCounts, contribution: &Contribution, times: usize) {
    for (symbol, count) in contribution {
        *counts.entry(symbol.clone()).or_insert(0) += count * times;
    }
}

/// Parses a chemical formula and returns a fresh map of element counts.
/// Accepts any capitalized element symbol; use `parse_formula` to restrict
/// the symbols to a tracked set.
pub fn count_atoms(formula: &str) -> Result<ElementCounts, FormulaError> {
    let compact = formula.replace(' ', "");
    if compact.matches('(').count() != compact.matches(')').count() {
        return Err(FormulaError::UnbalancedParentheses {
            formula: formula.to_string(),
        });
    }

    let group_re = Regex::new(r"\(([^()]*)\)(\d*)").unwrap();
    let mut counts = ElementCounts::new();
    let mut remainder = String::with_capacity(compact.len());
    let mut last = 0;
    for caps in group_re.captures_iter(&compact) {
        let whole = caps.get(0).unwrap();
        remainder.push_str(&compact[last..whole.start()]);
        last = whole.end();

        let times: usize = if caps[2].is_empty() {
            1
        } else {
            caps[2].parse().map_err(|_| FormulaError::Malformed {
                formula: formula.to_string(),
                position: caps.get(2).unwrap().start(),
            })?
        };
        let inner = caps.get(1).unwrap();
        let contribution = tokenize_flat(inner.as_str(), formula, inner.start())?;
        accumulate(&mut counts, &contribution, times);
    }
    remainder.push_str(&compact[last..]);

    // a parenthesis surviving group extraction means nesting or a stray ')'
    if remainder.contains('(') || remainder.contains(')') {
        return Err(FormulaError::UnbalancedParentheses {
            formula: formula.to_string(),
        });
    }

    let contribution = tokenize_flat(&remainder, formula, 0)?;
    accumulate(&mut counts, &contribution, 1);
    Ok(counts)
}

/// Parses a formula against a fixed set of tracked elements: the returned map
/// contains every tracked element (zero if absent from the formula), and any
/// symbol outside the tracked set is an `UnknownElement` error.
pub fn parse_formula(formula: &str, tracked: &[&str]) -> Result<ElementCounts, FormulaError> {
    let mut counts: ElementCounts = tracked.iter().map(|e| (e.to_string(), 0)).collect();
    let parsed = count_atoms(formula)?;
    for (symbol, count) in parsed {
        match counts.get_mut(&symbol) {
            Some(total) => *total += count,
            None => {
                return Err(FormulaError::UnknownElement {
                    symbol,
                    formula: formula.to_string(),
                });
            }
        }
    }
    Ok(counts)
}
