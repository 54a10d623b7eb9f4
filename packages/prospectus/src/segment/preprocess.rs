//! Page-text preprocessing - strips layout-extraction noise before
//! segmentation.

use regex::Regex;
use tracing::warn;

/// Minimum length for the shared-prefix duplicate test.
const DUP_PREFIX_CHARS: usize = 20;

/// Blank-line runs of at least this length collapse to two.
const BLANK_RUN_COLLAPSE: usize = 4;

/// Removes boilerplate and duplicate artifacts from raw page text.
///
/// Pure: same input, same output, never fails. Worst case the text comes
/// back unchanged after best-effort cleanup.
pub struct Preprocessor {
    boilerplate: Vec<Regex>,
}

impl Preprocessor {
    /// Compile the boilerplate pattern set. Invalid patterns are skipped
    /// with a warning rather than failing construction.
    pub fn new(patterns: &[String]) -> Self {
        let boilerplate = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "skipping invalid boilerplate pattern");
                    None
                }
            })
            .collect();

        Self { boilerplate }
    }

    /// Clean one page's text: collapse intra-line whitespace, drop
    /// boilerplate lines, drop near-duplicate consecutive lines, collapse
    /// long blank runs.
    pub fn clean(&self, text: &str) -> String {
        let mut lines: Vec<String> = Vec::new();

        for raw in text.lines() {
            let line = collapse_whitespace(raw);

            if !line.is_empty() && self.boilerplate.iter().any(|re| re.is_match(&line)) {
                continue;
            }

            if !line.is_empty() {
                if let Some(prev) = lines.last() {
                    if !prev.is_empty() && is_near_duplicate(prev, &line) {
                        continue;
                    }
                }
            }

            lines.push(line);
        }

        collapse_blank_runs(lines).join("\n")
    }
}

/// Collapse runs of intra-line whitespace to a single space and trim.
fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Two consecutive non-empty lines count as duplicates when one contains
/// the other, or both are long enough to share an identical 20-char prefix.
/// Column re-extraction produces exactly these artifacts.
fn is_near_duplicate(prev: &str, line: &str) -> bool {
    if prev.contains(line) || line.contains(prev) {
        return true;
    }

    let prev_chars = prev.chars().count();
    let line_chars = line.chars().count();
    if prev_chars >= DUP_PREFIX_CHARS && line_chars >= DUP_PREFIX_CHARS {
        let prev_prefix: String = prev.chars().take(DUP_PREFIX_CHARS).collect();
        let line_prefix: String = line.chars().take(DUP_PREFIX_CHARS).collect();
        return prev_prefix == line_prefix;
    }

    false
}

/// Collapse runs of >= 4 blank lines to exactly 2; shorter runs are kept
/// as-is to preserve paragraph breaks.
fn collapse_blank_runs(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut blanks = 0usize;

    for line in lines {
        if line.is_empty() {
            blanks += 1;
            continue;
        }
        flush_blanks(&mut out, blanks);
        blanks = 0;
        out.push(line);
    }
    flush_blanks(&mut out, blanks);

    out
}

fn flush_blanks(out: &mut Vec<String>, blanks: usize) {
    let emit = if blanks >= BLANK_RUN_COLLAPSE { 2 } else { blanks };
    for _ in 0..emit {
        out.push(String::new());
    }
}
