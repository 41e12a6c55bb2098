//! Deterministic post-processing of raw model definitions.
//!
//! The model writes definitions for Spanish verb flashcards and tends
//! to pad them with parentheticals ("to eat (food)") and reflexive
//! filler ("oneself"). The cleaner strips those while keeping two
//! things a learner needs: the leading conjugation-subject prefix
//! (e.g. "(he / she / it) eats") and, optionally, the "(it)" object
//! marker used by gustar-style verbs ("to like (it)").
//!
//! Pure function: no error path, idempotent on its own output.

use std::sync::LazyLock;

use regex::Regex;

/// Allowed leading subject markers. These mirror the conjugation
/// categories on the flashcards; a fixed table, not a general rule.
static SUBJECT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((I|you|he / she / it|we|they / you-plural)\)\s+").expect("valid regex")
});

static ONESELF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\boneself\b").expect("valid regex"));

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static PUNCT_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,;:.!?])").expect("valid regex"));

/// Placeholder protecting "(it)" from the parenthesis strip.
const KEEP_IT_MARKER: &str = "__KEEP_IT__";

/// Cleaner behavior switches.
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Keep literal "(it)" tokens when stripping parentheticals.
    pub keep_it_parens: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            keep_it_parens: true,
        }
    }
}

/// Normalize a raw definition into its learner-facing form.
///
/// Steps, in order: drop "oneself"; detect and set aside an allowed
/// subject prefix; strip remaining parentheticals (protecting "(it)"
/// when configured); recombine; collapse whitespace; drop spaces
/// before punctuation; trim stray spaces and hyphens.
pub fn clean(defn: &str, config: &CleanerConfig) -> String {
    let defn = ONESELF_RE.replace_all(defn, "");

    // Set the subject prefix aside so it survives the paren strip.
    let (prefix, rest) = match SUBJECT_PREFIX_RE.find(&defn) {
        Some(m) => defn.split_at(m.end()),
        None => ("", defn.as_ref()),
    };

    let rest = if config.keep_it_parens {
        let protected = rest.replace("(it)", KEEP_IT_MARKER);
        let stripped = PAREN_RE.replace_all(&protected, "");
        stripped.replace(KEEP_IT_MARKER, "(it)")
    } else {
        PAREN_RE.replace_all(rest, "").into_owned()
    };

    let combined = format!("{}{}", prefix, rest);
    let collapsed = WS_RE.replace_all(combined.trim(), " ");
    let respaced = PUNCT_SPACE_RE.replace_all(&collapsed, "$1");
    respaced
        .trim_matches(|c| c == ' ' || c == '-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keep() -> CleanerConfig {
        CleanerConfig::default()
    }

    fn strip() -> CleanerConfig {
        CleanerConfig {
            keep_it_parens: false,
        }
    }

    #[test]
    fn preserves_subject_prefix() {
        assert_eq!(
            clean("(he / she / it) eats (food)", &keep()),
            "(he / she / it) eats"
        );
        assert_eq!(clean("(I) wake up (early)", &keep()), "(I) wake up");
        assert_eq!(
            clean("(they / you-plural) speak", &keep()),
            "(they / you-plural) speak"
        );
    }

    #[test]
    fn protects_it_parens_when_configured() {
        assert_eq!(clean("to like (it)", &keep()), "to like (it)");
        assert_eq!(clean("to like (it)", &strip()), "to like");
    }

    #[test]
    fn strips_all_other_parentheticals() {
        assert_eq!(clean("to run (move fast) (verb)", &keep()), "to run");
        // A non-prefix parenthetical at the front is not a subject marker.
        assert_eq!(clean("(informal) to chat", &keep()), "to chat");
    }

    #[test]
    fn removes_oneself() {
        assert_eq!(clean("to wash oneself", &keep()), "to wash");
        assert_eq!(clean("to enjoy Oneself fully", &keep()), "to enjoy fully");
    }

    #[test]
    fn fixes_space_before_punctuation() {
        assert_eq!(clean("hello , world .", &keep()), "hello, world.");
        assert_eq!(clean("wait ; then go !", &keep()), "wait; then go!");
    }

    #[test]
    fn collapses_whitespace_and_trims_hyphens() {
        assert_eq!(clean("  to   eat\tslowly  ", &keep()), "to eat slowly");
        assert_eq!(clean("- to eat -", &keep()), "to eat");
    }

    #[test]
    fn empty_and_degenerate_input() {
        assert_eq!(clean("", &keep()), "");
        assert_eq!(clean("(only a note)", &keep()), "");
        assert_eq!(clean("oneself", &keep()), "");
    }

    #[test]
    fn idempotent_on_cleaned_output() {
        let samples = [
            "(he / she / it) eats (food)",
            "to like (it)",
            "to wash oneself ,  please .",
            "- (informal) to chat -",
            "plain definition",
        ];
        for config in [keep(), strip()] {
            for s in samples {
                let once = clean(s, &config);
                assert_eq!(clean(&once, &config), once, "not idempotent for {:?}", s);
            }
        }
    }
}
