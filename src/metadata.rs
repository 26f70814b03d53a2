//! Best-effort metadata inference from report file names.
//!
//! Report files arrive with names like `chem_examreport_2023_1.pdf` or
//! `mm-cas-19-2.doc`. [`parse_filename`] recovers a subject, year, and exam
//! number from such names. It is a heuristic classifier, not a grammar: any
//! field it cannot recover is reported as [`UNKNOWN`], and it never fails.
//!
//! # Example
//!
//! ```
//! use exam_reports::metadata::parse_filename;
//!
//! let meta = parse_filename("chem_examreport_2023_1(2).pdf");
//! assert_eq!(meta.subject, "Chemistry");
//! assert_eq!(meta.year, "2023");
//! assert_eq!(meta.exam_number, "exam1");
//! ```

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// Placeholder used for any field the parser cannot recover.
pub const UNKNOWN: &str = "Unknown";

/// Ordered subject alias table. Matching is a substring test against the
/// separator-free remainder of the name, so earlier (longer) keys must come
/// before keys they contain.
pub const SUBJECT_ALIASES: &[(&str, &str)] = &[
    ("mathmethodscas", "MathMethodsCAS"),
    ("mathematicalmethods", "MathMethods"),
    ("mathmethods", "MathMethods"),
    ("mmcas", "MathMethodsCAS"),
    ("maths1", "MathMethods"),
    ("mm", "MathMethods"),
    ("mmcas2", "MathMethodsCAS"),
    ("specialist", "SpecialistMaths"),
    ("sm", "SpecialistMaths"),
    ("chemistry", "Chemistry"),
    ("chem", "Chemistry"),
];

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static REPORT_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r"[-_\s]?(?:externalassessmentreport|examreport|assessrep|examrep|report|exam)",
    )
});

static DUPLICATE_COUNTER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"\s*\(\d+\)"));

static FULL_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"20\d{2}"));

// A two-digit token at the end of the name, optionally followed by a single
// exam digit (`mm-cas-19-2`).
static SHORT_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?:^|[^0-9])(\d{2})(?:[-_\s]+\d)?$"));

static EXAM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?:exam|ex)?[-_\s]?([12])\b"));

static TRAILING_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(\d)$"));

/// Subject, year, and exam number recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReportMetadata {
    /// Canonical subject name, or [`UNKNOWN`].
    pub subject: String,
    /// Four-digit year, or [`UNKNOWN`].
    pub year: String,
    /// Exam tag such as `exam1`, or [`UNKNOWN`].
    pub exam_number: String,
}

impl ReportMetadata {
    /// Returns true when the year was recovered.
    #[must_use]
    pub fn has_year(&self) -> bool {
        self.year != UNKNOWN
    }

    /// Returns true when the exam number was recovered.
    #[must_use]
    pub fn has_exam_number(&self) -> bool {
        self.exam_number != UNKNOWN
    }
}

/// Parses a file name (path components and extension are ignored) into
/// best-effort report metadata.
///
/// Steps, in order:
/// 1. lower-case the stem, drop report words and `(n)` duplicate counters;
/// 2. year: a `20xx` token, else a trailing two-digit token `<= 30`;
/// 3. exam: a `1`/`2` token optionally prefixed by `ex`/`exam`, else any
///    single trailing digit;
/// 4. subject: the first alias contained in the remainder, else the
///    title-cased remainder.
///
/// Each recognised token is removed before the next step runs.
#[must_use]
pub fn parse_filename(file_name: &str) -> ReportMetadata {
    let stem = Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());

    let mut name = stem.to_lowercase();
    name = REPORT_WORD_RE.replace_all(&name, "").into_owned();
    name = DUPLICATE_COUNTER_RE.replace_all(&name, "").into_owned();
    name = name.trim().to_string();

    let year = take_year(&mut name);
    let exam_number = take_exam_number(&mut name);
    let subject = subject_from_remainder(&name);

    trace!(file_name, %subject, %year, %exam_number, "parsed report file name");

    ReportMetadata {
        subject,
        year,
        exam_number,
    }
}

fn take_year(name: &mut String) -> String {
    if let Some(found) = FULL_YEAR_RE.find(name) {
        let year = found.as_str().to_string();
        let stripped = name.replace(&year, "");
        set_trimmed(name, &stripped);
        return year;
    }

    if let Some(caps) = SHORT_YEAR_RE.captures(name)
        && let Some(digits) = caps.get(1)
        && let Ok(value) = digits.as_str().parse::<u32>()
        && value <= 30
    {
        let range = digits.range();
        remove_range(name, range);
        return format!("20{value:02}");
    }

    UNKNOWN.to_string()
}

fn take_exam_number(name: &mut String) -> String {
    if let Some(caps) = EXAM_RE.captures(name)
        && let Some(digit) = caps.get(1)
    {
        let tag = format!("exam{}", digit.as_str());
        let stripped = EXAM_RE.replace_all(name, "").into_owned();
        set_trimmed(name, &stripped);
        return tag;
    }

    if let Some(caps) = TRAILING_DIGIT_RE.captures(name)
        && let Some(digit) = caps.get(1)
    {
        let tag = format!("exam{}", digit.as_str());
        remove_range(name, digit.range());
        return tag;
    }

    UNKNOWN.to_string()
}

fn subject_from_remainder(name: &str) -> String {
    let compact: String = name
        .chars()
        .filter(|c| !is_separator(*c))
        .collect();

    if let Some((_, subject)) = SUBJECT_ALIASES
        .iter()
        .find(|(key, _)| compact.contains(key))
    {
        return (*subject).to_string();
    }

    if compact.is_empty() {
        UNKNOWN.to_string()
    } else {
        title_case(name)
    }
}

/// Removes `range` from `name` and trims separators left at either end.
fn remove_range(name: &mut String, range: Range<usize>) {
    name.replace_range(range, "");
    let stripped = std::mem::take(name);
    set_trimmed(name, &stripped);
}

fn set_trimmed(name: &mut String, value: &str) {
    *name = value.trim_matches(is_separator).to_string();
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '_' || c.is_whitespace()
}

/// Upper-cases the first letter of every alphabetic run.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
