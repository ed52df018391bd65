//! Issue codes and reported errors.
//!
//! An [`Issue`] pairs a stable string code with a message template. Templates
//! name their fields as `%{field}`; a [`Reported`] error binds values to those
//! fields and renders the final message.

pub mod workflow;

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// How an issue is treated by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Always an error.
    Hard,
    /// Severity may be downgraded by the caller.
    Soft,
}

/// Registered issue: code, message template, severity.
#[derive(Debug, PartialEq, Eq)]
pub struct Issue {
    pub code: &'static str,
    pub template: &'static str,
    pub severity: Severity,
}

impl Issue {
    pub const fn hard(code: &'static str, template: &'static str) -> Self {
        Self {
            code,
            template,
            severity: Severity::Hard,
        }
    }

    pub const fn soft(code: &'static str, template: &'static str) -> Self {
        Self {
            code,
            template,
            severity: Severity::Soft,
        }
    }

    /// Field names referenced by the template, in order of first appearance.
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut rest = self.template;
        while let Some(start) = rest.find("%{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else { break };
            let name = &after[..end];
            if !fields.contains(&name) {
                fields.push(name);
            }
            rest = &after[end + 1..];
        }
        fields
    }

    /// Render the template. Placeholders without a bound value stay verbatim.
    pub fn format(&self, args: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(start) = rest.find("%{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match args.get(name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Every issue table known to the crate.
static REGISTRY: &[&[&Issue]] = &[&workflow::ISSUES];

/// Look up a registered issue by code.
pub fn lookup(code: &str) -> Option<&'static Issue> {
    REGISTRY
        .iter()
        .flat_map(|table| table.iter().copied())
        .find(|issue| issue.code == code)
}

/// Classified error raised by service logic: an issue plus its field values.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", self.message())]
pub struct Reported {
    issue: &'static Issue,
    args: BTreeMap<String, String>,
}

impl Reported {
    pub fn new<I, K, V>(issue: &'static Issue, args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        Self {
            issue,
            args: args
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        }
    }

    /// Build from a registered code. Returns `None` for unknown codes.
    pub fn from_code<I, K, V>(code: &str, args: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        lookup(code).map(|issue| Self::new(issue, args))
    }

    pub fn code(&self) -> &'static str {
        self.issue.code
    }

    pub fn issue(&self) -> &'static Issue {
        self.issue
    }

    pub fn severity(&self) -> Severity {
        self.issue.severity
    }

    pub fn args(&self) -> &BTreeMap<String, String> {
        &self.args
    }

    pub fn message(&self) -> String {
        self.issue.format(&self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: Issue = Issue::hard("TEST_SAMPLE", "bad '%{name}' at %{pos}, again '%{name}'");

    #[test]
    fn test_required_fields_deduplicated() {
        assert_eq!(SAMPLE.required_fields(), vec!["name", "pos"]);
    }

    #[test]
    fn test_format_interpolates_every_occurrence() {
        let reported = Reported::new(&SAMPLE, [("name", "x"), ("pos", "3")]);
        assert_eq!(reported.message(), "bad 'x' at 3, again 'x'");
    }

    #[test]
    fn test_missing_field_left_verbatim() {
        let reported = Reported::new(&SAMPLE, [("name", "x")]);
        assert_eq!(reported.message(), "bad 'x' at %{pos}, again 'x'");
    }

    #[test]
    fn test_unterminated_placeholder() {
        static OPEN: Issue = Issue::soft("TEST_OPEN", "oops %{name");
        assert!(OPEN.required_fields().is_empty());
        assert_eq!(OPEN.format(&BTreeMap::new()), "oops %{name");
    }

    #[test]
    fn test_lookup_registered_code() {
        let issue = lookup(workflow::ILLEGAL_OPERATION).unwrap();
        assert_eq!(issue.severity, Severity::Hard);
        assert!(lookup("NO_SUCH_CODE").is_none());
    }

    #[test]
    fn test_from_code() {
        let reported =
            Reported::from_code(workflow::ILLEGAL_ITERATION_STYLE, [("style", "sideways")]).unwrap();
        assert_eq!(reported.code(), "WF_ILLEGAL_ITERATION_STYLE");
        assert_eq!(reported.to_string(), "no such iteration style 'sideways'");
        assert!(Reported::from_code("NOPE", Vec::<(String, String)>::new()).is_none());
    }

    #[test]
    fn test_reported_is_a_std_error() {
        let reported = workflow::condition_missing_rp("(a", 2);
        let err: &dyn std::error::Error = &reported;
        assert_eq!(
            err.to_string(),
            "expected right parenthesis in condition '(a' at position 2"
        );
        assert!(err.source().is_none());
    }
}
