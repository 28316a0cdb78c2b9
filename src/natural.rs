//! Natural ("human") ordering of file names, so that `file2.pdf` comes before `file11.pdf`.
//!
//! A name is split into alternating runs of non-digits and ASCII digits, always starting
//! with a (possibly empty) non-digit run. Runs at the same position are compared pairwise:
//! digit runs by their integer value, the others as plain text.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Run<'a> {
    Text(&'a str),
    Digits(&'a str),
}

fn split_runs(name: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut rest = name;

    loop {
        let text_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        runs.push(Run::Text(&rest[..text_end]));
        rest = &rest[text_end..];

        if rest.is_empty() {
            return runs;
        }

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        runs.push(Run::Digits(&rest[..digits_end]));
        rest = &rest[digits_end..];
    }
}

/// Compares two runs of ASCII digits by value, whatever their length.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');

    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_runs(a: &Run, b: &Run) -> Ordering {
    match (a, b) {
        (Run::Text(a), Run::Text(b)) => a.cmp(b),
        (Run::Digits(a), Run::Digits(b)) => compare_digits(a, b),
        // runs alternate from the same starting kind, so positions always line up
        (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
        (Run::Digits(_), Run::Text(_)) => Ordering::Less,
    }
}

/// Natural comparison of two names. Names equal in value but not in spelling
/// (`a01` and `a1`) fall back to plain string order, so the ordering is total.
pub fn compare(a: &str, b: &str) -> Ordering {
    let runs_a = split_runs(a);
    let runs_b = split_runs(b);

    runs_a
        .iter()
        .zip(runs_b.iter())
        .map(|(run_a, run_b)| compare_runs(run_a, run_b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| runs_a.len().cmp(&runs_b.len()))
        .then_with(|| a.cmp(b))
}

pub fn sort<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}
