//! Diagnosis-code selection.

use std::collections::HashSet;

use polars::prelude::*;
use regex::Regex;

use crate::error::{LinkError, Result};

/// Compiled selection over diagnosis codes.
///
/// A code matches when it equals one of the fixed codes exactly, or when it
/// matches a hierarchical root: root `I15` covers `I15`, `I15.0`, `I15.12`,
/// but not `I150` or `I16`.
#[derive(Debug)]
pub struct CodeMatcher {
    exact: HashSet<String>,
    roots: Vec<Regex>,
}

impl CodeMatcher {
    /// Compile fixed codes and hierarchical roots into a matcher.
    ///
    /// Roots are interpolated into the match pattern verbatim, so a root
    /// containing pattern metacharacters fails with [`LinkError::Pattern`].
    pub fn compile(fixed_codes: &[String], code_roots: &[String]) -> Result<Self> {
        let exact: HashSet<String> = fixed_codes.iter().cloned().collect();
        let mut roots = Vec::with_capacity(code_roots.len());
        for root in code_roots {
            let pattern = format!(r"^{root}(?:\.\d+)?$");
            let regex = Regex::new(&pattern).map_err(|source| LinkError::Pattern {
                root: root.clone(),
                source,
            })?;
            roots.push(regex);
        }
        Ok(Self { exact, roots })
    }

    /// True when neither fixed codes nor roots were supplied; such a matcher
    /// selects nothing.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.roots.is_empty()
    }

    pub fn is_match(&self, code: &str) -> bool {
        self.exact.contains(code) || self.roots.iter().any(|regex| regex.is_match(code))
    }

    /// Selection mask over a code column; missing codes never match.
    pub fn mask(&self, codes: &StringChunked) -> BooleanChunked {
        codes
            .into_iter()
            .map(|code| Some(code.is_some_and(|code| self.is_match(code))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(fixed: &[&str], roots: &[&str]) -> CodeMatcher {
        let fixed: Vec<String> = fixed.iter().map(|code| (*code).to_string()).collect();
        let roots: Vec<String> = roots.iter().map(|root| (*root).to_string()).collect();
        CodeMatcher::compile(&fixed, &roots).expect("compile matcher")
    }

    #[test]
    fn fixed_codes_match_exactly() {
        let matcher = matcher(&["I10"], &[]);
        assert!(matcher.is_match("I10"));
        assert!(!matcher.is_match("I101"));
        assert!(!matcher.is_match("I1"));
    }

    #[test]
    fn roots_match_subcodes() {
        let matcher = matcher(&[], &["I15"]);
        assert!(matcher.is_match("I15"));
        assert!(matcher.is_match("I15.0"));
        assert!(matcher.is_match("I15.12"));
        assert!(!matcher.is_match("I150"));
        assert!(!matcher.is_match("I16"));
        assert!(!matcher.is_match("I15."));
    }

    #[test]
    fn empty_matcher_selects_nothing() {
        let matcher = matcher(&[], &[]);
        assert!(matcher.is_empty());
        assert!(!matcher.is_match("I10"));
    }

    #[test]
    fn malformed_root_is_a_pattern_error() {
        let roots = vec!["I15(".to_string()];
        let err = CodeMatcher::compile(&[], &roots).expect_err("invalid pattern");
        assert!(matches!(err, LinkError::Pattern { .. }));
    }

    #[test]
    fn mask_skips_missing_codes() {
        let matcher = matcher(&["I10"], &["I15"]);
        let codes: StringChunked = [Some("I10"), None, Some("I15.3"), Some("E11")]
            .into_iter()
            .collect();
        let mask = matcher.mask(&codes);
        let selected: Vec<Option<bool>> = mask.into_iter().collect();
        assert_eq!(
            selected,
            vec![Some(true), Some(false), Some(true), Some(false)]
        );
    }
}
