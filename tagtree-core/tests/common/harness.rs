//! Test harness for running fixtures with stochastic variations

use crate::common::{ExpectedEvent, Gen, TestCase};
use tagtree_core::{parse_str, Document, ElementRef, Error, HEADER};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Flatten a document into comparable event strings (document order).
///
/// Each element yields an optional `Comment`, then `ElementStart`, its
/// `Attribute`s, optional `Contents`, its children and `ElementEnd`.
pub fn flatten(doc: &Document) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(doc.root_element(), &mut out);
    out
}

fn flatten_into(element: ElementRef<'_>, out: &mut Vec<String>) {
    if let Some(comment) = element.comment() {
        out.push(format!("Comment {:?}", comment));
    }
    out.push(format!("ElementStart {:?}", element.tag_name()));
    for (name, value) in element.attributes() {
        out.push(format!("Attribute {:?}", format!("{}={}", name, value)));
    }
    if let Some(contents) = element.contents() {
        out.push(format!("Contents {:?}", contents));
    }
    for child in element.children() {
        flatten_into(child, out);
    }
    out.push("ElementEnd".to_string());
}

/// Variant name of an error, e.g. `TagMismatch`
pub fn error_name(err: &Error) -> String {
    let debug = match err {
        Error::Lexical(e) => format!("{:?}", e),
        Error::Structural(e) => format!("{:?}", e),
        Error::Io(_) => return "Io".to_string(),
    };
    debug
        .split([' ', '{', '('])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Parse and describe the outcome as event strings
fn outcome(input: &str) -> Vec<String> {
    match parse_str(input) {
        Ok(doc) => flatten(&doc),
        Err(e) => vec![format!("Error {}", error_name(&e))],
    }
}

/// Format expected outcome for comparison
fn format_expected(case: &TestCase) -> Vec<String> {
    if let Some(error) = &case.error {
        return vec![format!("Error {}", error)];
    }
    case.events
        .iter()
        .map(|event| match event {
            ExpectedEvent::Bare(name) => name.clone(),
            ExpectedEvent::WithContent(name, content) => format!("{} {:?}", name, content),
        })
        .collect()
}

fn compare(input: String, expected: Vec<String>, seed: u64) -> TestResult {
    let actual = outcome(&input);
    let mut errors = Vec::new();

    if actual.len() != expected.len() {
        errors.push(format!(
            "Event count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        ));
    }
    for (i, (act, exp)) in actual.iter().zip(expected.iter()).enumerate() {
        if act != exp {
            errors.push(format!("Event {}: expected '{}', got '{}'", i, exp, act));
        }
    }

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed,
        errors,
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    compare(case.input.clone(), format_expected(case), 0)
}

/// Run test with stochastic variations
///
/// Applies independent variations that must not change the outcome:
/// - leading blank lines
/// - 50% chance of a header line above
/// - 40% chance of a trailing element after the root (success cases only)
/// - 30% chance of CRLF line endings
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = gen.blank_lines();

    if gen.chance(0.5) && !case.input.trim_start().starts_with("<?") {
        input.push_str(HEADER);
        input.push('\n');
    }

    input.push_str(&case.input);

    // Content after the root element is never read.
    if case.error.is_none() && gen.chance(0.4) {
        input.push('\n');
        input.push_str(&gen.trailing_element());
    }

    if gen.chance(0.3) {
        input = input.replace('\n', "\r\n");
    }

    compare(input, format_expected(case), gen.seed)
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set TAGTREE_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{}", self.input);
        eprintln!("\nExpected events:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual events:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
