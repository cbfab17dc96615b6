// Critic feedback index extraction
//
// The critic references items in natural language ("caption 4 is too long",
// "сцена 7 ломает subject lock"). This parser pulls those references out as
// 0-based index sets so rework can target only the rejected items.
//
// Number handling is deliberately lenient: 1-9 is read as a 1-based position
// (converted to 0-based), a literal 0 is accepted as already 0-based, and
// anything above 9 is ignored.

use regex::Regex;
use std::collections::BTreeSet;

/// Parsed index sets, deduplicated and sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackIndices {
    pub captions: Vec<usize>,
    pub scenes: Vec<usize>,
}

const CAPTION_PATTERN: &str = r"(?i)(?:caption|подпись|подписи|label)\s*(?:#|№)?\s*(\d+)";
const SCENE_PATTERN: &str = r"(?i)(?:scene|сцена|сцены|moment|момент)\s*(?:#|№)?\s*(\d+)";

/// Scan reasons + suggestions for caption and scene references.
pub fn parse_feedback_indices(reasons: &[String], suggestions: &[String]) -> FeedbackIndices {
    let text = reasons
        .iter()
        .chain(suggestions.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    FeedbackIndices {
        captions: extract_indices(CAPTION_PATTERN, &text),
        scenes: extract_indices(SCENE_PATTERN, &text),
    }
}

fn extract_indices(pattern: &str, text: &str) -> Vec<usize> {
    let re = Regex::new(pattern).expect("Invalid regex");
    let mut indices = BTreeSet::new();
    for captures in re.captures_iter(text) {
        let Ok(number) = captures[1].parse::<usize>() else {
            continue;
        };
        match number {
            1..=9 => {
                indices.insert(number - 1);
            }
            0 => {
                indices.insert(0);
            }
            _ => {}
        }
    }
    indices.into_iter().collect()
}
