//! Section classification - scores text samples against per-topic pattern
//! sets, plus the cheaper structural-header check.

use regex::Regex;

/// Leading window of the sample considered for scoring.
const SAMPLE_CAP_CHARS: usize = 1500;

/// A structural header must stay below this length.
const MAX_HEADER_CHARS: usize = 150;

/// Per-topic pattern table. Declaration order is the tie-break order:
/// the first topic reaching the maximum score wins.
const TOPIC_PATTERNS: &[(&str, &[&str])] = &[
    (
        "departments",
        &[
            r"(?i)\bdepartment\s+of\b",
            r"(?i)\bdepartments\b",
            r"(?i)\bfacult(?:y|ies)\s+of\b",
            r"(?i)\bschool\s+of\b",
            r"(?i)\bcollege\s+of\b",
            r"(?i)\binstitute\s+of\b",
        ],
    ),
    (
        "programs",
        &[
            r"(?i)\bdegree\s+programm?es?\b",
            r"(?i)\bprogramm?es?\s+offered\b",
            r"(?i)\bacademic\s+programm?es?\b",
            r"(?i)\bbachelor\s+of\b",
            r"(?i)\bmaster\s+of\b",
            r"(?i)\bdoctor\s+of\b",
        ],
    ),
    (
        "curriculum",
        &[
            r"(?i)\bcurriculum\b",
            r"(?i)\bcourse\s+outline\b",
            r"(?i)\bcredit\s+hours?\b",
            r"(?i)\bscheme\s+of\s+stud(?:y|ies)\b",
            r"(?i)\bsemester[- ]wise\b",
        ],
    ),
    (
        "fees",
        &[
            r"(?i)\bfees?\b",
            r"(?i)\btuition\b",
            r"(?i)\bfee\s+structure\b",
            r"(?i)\bscholarships?\b",
            r"(?i)\bfinancial\s+(?:aid|assistance)\b",
        ],
    ),
    (
        "admissions",
        &[
            r"(?i)\badmissions?\b",
            r"(?i)\beligibility\b",
            r"(?i)\bhow\s+to\s+apply\b",
            r"(?i)\bapplication\s+(?:form|process|deadline)s?\b",
            r"(?i)\bentry\s+test\b",
            r"(?i)\bmerit\s+list\b",
        ],
    ),
    (
        "facilities",
        &[
            r"(?i)\bfacilit(?:y|ies)\b",
            r"(?i)\blibrar(?:y|ies)\b",
            r"(?i)\bhostels?\b",
            r"(?i)\blaborator(?:y|ies)\b",
            r"(?i)\bsports\s+complex\b",
            r"(?i)\bcafeteria\b",
            r"(?i)\btransport\b",
        ],
    ),
    (
        "contact",
        &[
            r"(?i)\bcontact\s+us\b",
            r"(?i)\bpostal\s+address\b",
            r"(?i)\btelephone\b",
            r"(?i)\bwebsite\b",
            r"(?i)\bhelpline\b",
        ],
    ),
    (
        "requirements",
        &[
            r"(?i)\brequirements?\b",
            r"(?i)\bdocuments?\s+required\b",
            r"(?i)\bprerequisites?\b",
        ],
    ),
];

/// Structural header patterns. A header is short and matches one of these
/// (or is an all-caps line, checked separately).
const HEADER_PATTERNS: &[&str] = &[
    r"(?i)^(?:department|faculty|school|college|institute)\s+of\s+",
    r"(?i)^(?:bachelor|master|doctor)\s+of\s+",
    r"^(?:BS|MS|BSc|MSc|BBA|MBA|MPhil|PhD)\b",
];

/// Classifies text samples into topic labels.
///
/// Invoked independently on header lines, completed paragraph buffers and
/// table blocks. Each call is stateless apart from the inherited fallback
/// label the caller tracks.
pub struct SectionClassifier {
    topics: Vec<(&'static str, Vec<Regex>)>,
    headers: Vec<Regex>,
}

impl Default for SectionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionClassifier {
    /// Compile the pattern tables. All patterns are literals known to be
    /// valid.
    pub fn new() -> Self {
        let topics = TOPIC_PATTERNS
            .iter()
            .map(|(label, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("topic pattern is valid"))
                    .collect();
                (*label, compiled)
            })
            .collect();

        let headers = HEADER_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("header pattern is valid"))
            .collect();

        Self { topics, headers }
    }

    /// Score `sample` against every topic and return the best label, or
    /// `current` unchanged when no topic matches (sticky inheritance).
    ///
    /// Only the strictly highest non-zero score wins; ties go to the first
    /// topic in declaration order that reached the maximum.
    pub fn classify(&self, sample: &str, current: &str) -> String {
        let sample = cap_sample(sample);

        let mut best: Option<(&str, usize)> = None;
        for (label, patterns) in &self.topics {
            let score: usize = patterns.iter().map(|re| re.find_iter(sample).count()).sum();
            if score > 0 && best.map_or(true, |(_, max)| score > max) {
                best = Some((label, score));
            }
        }

        match best {
            Some((label, _)) => label.to_string(),
            None => current.to_string(),
        }
    }

    /// Cheap structural-header check; does not use topic scoring.
    pub fn is_heading(&self, block: &str) -> bool {
        let line = block.trim();
        if line.is_empty() || line.contains('\n') {
            return false;
        }
        if line.chars().count() >= MAX_HEADER_CHARS {
            return false;
        }
        if self.headers.iter().any(|re| re.is_match(line)) {
            return true;
        }
        is_all_caps(line)
    }
}

fn cap_sample(sample: &str) -> &str {
    match sample.char_indices().nth(SAMPLE_CAP_CHARS) {
        Some((idx, _)) => &sample[..idx],
        None => sample,
    }
}

/// A line with at least one letter and no lowercase letters.
fn is_all_caps(line: &str) -> bool {
    let mut has_alpha = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}
