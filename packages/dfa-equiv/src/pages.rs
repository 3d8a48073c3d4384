//! The HTML form served at `/` and the page showing its result.

use dfa_equiv_lib::{definition::DfaFields, solver::SerializableSolverStatus};
use serde::Deserialize;

use crate::server::{CheckRequest, CheckResponse};

/// Fields of the HTML form, one set per automaton.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckForm {
    pub states1: String,
    pub alphabet1: String,
    pub start1: String,
    #[serde(default)]
    pub accept1: String,
    pub transitions1: String,
    pub states2: String,
    pub alphabet2: String,
    pub start2: String,
    #[serde(default)]
    pub accept2: String,
    pub transitions2: String,
}

impl From<CheckForm> for CheckRequest {
    fn from(form: CheckForm) -> Self {
        CheckRequest {
            left: DfaFields {
                states: form.states1,
                alphabet: form.alphabet1,
                start: form.start1,
                accept: form.accept1,
                transitions: form.transitions1,
            },
            right: DfaFields {
                states: form.states2,
                alphabet: form.alphabet2,
                start: form.start2,
                accept: form.accept2,
                transitions: form.transitions2,
            },
            render: None,
        }
    }
}

const FIELDS: [(&str, &str, &str); 5] = [
    ("states", "States", "q0,q1"),
    ("alphabet", "Alphabet", "0,1"),
    ("start", "Start state", "q0"),
    ("accept", "Accepting states", "q1"),
    ("transitions", "Transitions", "q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1"),
];

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    )
}

fn automaton_fieldset(index: usize) -> String {
    let inputs = FIELDS
        .iter()
        .map(|(name, label, placeholder)| {
            format!(
                "<p><label>{label}: <input type=\"text\" name=\"{name}{index}\" placeholder=\"{placeholder}\"></label></p>"
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("<fieldset>\n<legend>DFA {index}</legend>\n{inputs}\n</fieldset>")
}

pub fn index_page() -> String {
    let body = format!(
        "<form method=\"post\" action=\"/\">\n{}\n{}\n<p><button type=\"submit\">Check equivalence</button></p>\n</form>",
        automaton_fieldset(1),
        automaton_fieldset(2)
    );

    document("DFA Equivalence Checker", &body)
}

pub fn result_page(response: &CheckResponse) -> String {
    let report = &response.report;
    let mut body = vec![];

    match report.status {
        SerializableSolverStatus::True => {
            body.push("<p><strong>The automata are equivalent.</strong></p>".to_string());
        }
        SerializableSolverStatus::False => {
            let witness = match report.witness_string.as_deref() {
                Some("") | None => "the empty word".to_string(),
                Some(word) => format!("<code>{}</code>", escape_html(word)),
            };
            body.push("<p><strong>The automata are NOT equivalent.</strong></p>".to_string());
            body.push(format!("<p>Shortest distinguishing word: {witness}</p>"));
        }
        SerializableSolverStatus::Unknown => {
            let reason = report
                .unknown_reason
                .as_ref()
                .map(|reason| format!(" ({reason:?})"))
                .unwrap_or_default();
            body.push(format!(
                "<p><strong>No verdict, the check gave up{reason}.</strong></p>"
            ));
        }
    }

    for (label, url) in [
        ("DFA 1", &response.left_image_url),
        ("DFA 2", &response.right_image_url),
    ] {
        if let Some(url) = url {
            body.push(format!(
                "<h2>{label}</h2>\n<img src=\"{}\" alt=\"{label}\">",
                escape_html(url)
            ));
        }
    }

    for err in &report.render_errors {
        body.push(format!("<p>Rendering failed: {}</p>", escape_html(err)));
    }

    body.push("<p><a href=\"/\">Check another pair</a></p>".to_string());

    document("Result", &body.join("\n"))
}

pub fn error_page(message: &str) -> String {
    document(
        "Invalid input",
        &format!(
            "<p>{}</p>\n<p><a href=\"/\">Back</a></p>",
            escape_html(message)
        ),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
