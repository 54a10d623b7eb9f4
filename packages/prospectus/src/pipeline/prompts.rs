//! Prompts for the extraction pipeline.

/// System instruction for every structured-completion request.
pub const SYSTEM_PROMPT: &str = "You are a precise data extraction assistant. \
Extract data strictly based on the provided text. Return valid JSON.";

/// Appended to a batch context when it exceeds the character budget.
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]";

pub const INSTITUTION_INFO_INSTRUCTION: &str =
    "Extract the institution's name, short name (if any), and location.";

pub const DEPARTMENTS_INSTRUCTION: &str = "Extract all academic departments and their programs. \
For each department, list its name and the programs offered.";

pub const FACILITIES_INSTRUCTION: &str = "Extract all campus facilities.";

pub const FEES_INSTRUCTION: &str = "Extract all tuition and fee information.";

pub const ADMISSIONS_INSTRUCTION: &str =
    "Extract admission criteria, application requirements, and important dates.";
