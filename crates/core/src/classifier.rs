use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::{Classification, LineGroup};

/// How the spoken label is derived from the normalized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelRule {
    SpokenWord,
    FirstLetter,
}

struct LineEntry {
    tokens: &'static [&'static str],
    group: LineGroup,
    label: LabelRule,
}

// Groups must stay disjoint: a token may appear in exactly one entry.
const LINE_TABLE: &[LineEntry] = &[
    LineEntry {
        tokens: &["one", "two", "three"],
        group: LineGroup::OneTwoThree,
        label: LabelRule::SpokenWord,
    },
    LineEntry {
        tokens: &["four", "five", "six"],
        group: LineGroup::FourFiveSix,
        label: LabelRule::SpokenWord,
    },
    LineEntry {
        tokens: &["a", "c", "e"],
        group: LineGroup::Ace,
        label: LabelRule::FirstLetter,
    },
    LineEntry {
        tokens: &["b", "d", "f", "m"],
        group: LineGroup::Bdfm,
        label: LabelRule::FirstLetter,
    },
    LineEntry {
        tokens: &["n", "q", "r"],
        group: LineGroup::Nqr,
        label: LabelRule::FirstLetter,
    },
    LineEntry {
        tokens: &["l"],
        group: LineGroup::L,
        label: LabelRule::FirstLetter,
    },
    LineEntry {
        tokens: &["j", "z"],
        group: LineGroup::Jz,
        label: LabelRule::FirstLetter,
    },
];

static LINE_INDEX: Lazy<HashMap<&'static str, &'static LineEntry>> = Lazy::new(|| {
    LINE_TABLE
        .iter()
        .flat_map(|entry| entry.tokens.iter().map(move |token| (*token, entry)))
        .collect()
});

/// Lowercases, trims surrounding whitespace and drops one trailing period, so "D." and
/// "d" compare equal. Whitespace between the token and its period is kept.
pub fn normalize_token(input: &str) -> String {
    let lower = input.trim().to_lowercase();
    match lower.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Maps a spoken slot value to its line group and spoken label.
pub fn classify(spoken: &str) -> Classification {
    let normalized = normalize_token(spoken);
    let Some(entry) = LINE_INDEX.get(normalized.as_str()) else {
        return Classification::unrecognized();
    };

    let display_label = match entry.label {
        LabelRule::SpokenWord => normalized,
        LabelRule::FirstLetter => normalized.chars().take(1).collect(),
    };

    Classification {
        group: entry.group,
        display_label,
    }
}

/// Same as [`classify`], with an absent slot value treated as unrecognized.
pub fn classify_slot(value: Option<&str>) -> Classification {
    value.map(classify).unwrap_or_else(Classification::unrecognized)
}
