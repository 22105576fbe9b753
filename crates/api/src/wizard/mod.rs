//! The submission contract shared by every writable tab, and where a
//! successful submission leads.

pub mod contract;
pub mod redirect;

use serde::Deserialize;
use serde_json::Value;

/// Query parameters understood by every submission.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionQuery {
    pub redirect_to: Option<String>,
    #[serde(rename = "continue")]
    pub next: Option<String>,
}

/// What the candidate asked for besides saving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Explicit destination, overriding every other rule.
    pub redirect_to: Option<String>,
    /// Go on with the next tab.
    pub submit_and_continue: bool,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(s) => matches!(s.as_str(), "true" | "on" | "1"),
        _ => false,
    }
}

/// Only same-site paths are followed.
fn local_path(path: &str) -> Option<String> {
    let is_local = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');
    is_local.then(|| path.to_string())
}

impl Submission {
    /// Merge the query string and body parameters, the body winning.
    pub fn from_request(query: &SubmissionQuery, body: &Value) -> Self {
        let redirect_to = body
            .get("redirect_to")
            .and_then(Value::as_str)
            .or(query.redirect_to.as_deref())
            .filter(|path| !path.is_empty())
            .and_then(local_path);
        let submit_and_continue = body.get("submit_and_continue").is_some_and(is_truthy)
            || query
                .next
                .as_deref()
                .is_some_and(|flag| is_truthy(&Value::String(flag.to_string())));
        Self {
            redirect_to,
            submit_and_continue,
        }
    }

    /// `redirect_to` when one was requested, `fallback` otherwise.
    pub fn destination_or(&self, fallback: String) -> String {
        self.redirect_to.clone().unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_flag_or_query_flag_continues() {
        let query = SubmissionQuery::default();
        assert!(Submission::from_request(&query, &json!({ "submit_and_continue": "on" })).submit_and_continue);
        assert!(Submission::from_request(&query, &json!({ "submit_and_continue": true })).submit_and_continue);
        assert!(!Submission::from_request(&query, &json!({})).submit_and_continue);

        let query = SubmissionQuery {
            redirect_to: None,
            next: Some("true".into()),
        };
        assert!(Submission::from_request(&query, &json!({})).submit_and_continue);
    }

    #[test]
    fn body_redirect_wins_over_query() {
        let query = SubmissionQuery {
            redirect_to: Some("/from-query".into()),
            next: None,
        };
        let submission = Submission::from_request(&query, &json!({ "redirect_to": "/from-body" }));
        assert_eq!(submission.redirect_to.as_deref(), Some("/from-body"));
        let submission = Submission::from_request(&query, &json!({}));
        assert_eq!(submission.redirect_to.as_deref(), Some("/from-query"));
    }

    #[test]
    fn requested_destination_replaces_the_fallback() {
        let query = SubmissionQuery::default();
        let submission = Submission::from_request(&query, &json!({ "redirect_to": "/elsewhere" }));
        assert_eq!(submission.destination_or("/home".into()), "/elsewhere");
        assert_eq!(Submission::default().destination_or("/home".into()), "/home");
    }

    #[test]
    fn foreign_redirects_are_ignored() {
        let query = SubmissionQuery::default();
        for target in ["https://evil.example", "//evil.example", ""] {
            let submission = Submission::from_request(&query, &json!({ "redirect_to": target }));
            assert_eq!(submission.redirect_to, None, "{target}");
        }
    }
}
