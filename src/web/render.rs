//! HTML rendering for the single-page form

use crate::lookup::LookupTables;
use crate::types::{PredictionOutcome, RawInput, Verdict};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2rem; }
.layout { display: flex; gap: 3rem; }
.inputs { flex: 2; }
.outputs { flex: 1; }
label { display: block; margin-top: 0.8rem; }
.fraud { color: #b00020; }
.legit { color: #1b5e20; }
.error { color: #b00020; }
progress { width: 100%; }
"#;

/// Full page: form on the left, result (if any) on the right.
pub fn page(tables: &LookupTables, input: &RawInput, outcome: Option<&PredictionOutcome>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Credit Card Fraud Detection</title>\n");
    let _ = write!(html, "<style>{STYLE}</style>\n</head>\n<body>\n");
    html.push_str("<h1>💳 Credit Card Fraud Detection</h1>\n<div class=\"layout\">\n");

    html.push_str("<div class=\"inputs\">\n<h2>Transaction Details</h2>\n");
    html.push_str(&form(tables, input));
    html.push_str("</div>\n");

    html.push_str("<div class=\"outputs\">\n");
    if let Some(outcome) = outcome {
        html.push_str(&result_panel(outcome));
    }
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

fn form(tables: &LookupTables, input: &RawInput) -> String {
    let mut html = String::new();
    html.push_str("<form method=\"post\" action=\"/predict\">\n");

    let _ = writeln!(
        html,
        "<label>Transaction Amount ($) <input type=\"number\" name=\"amount\" min=\"0\" step=\"any\" required value=\"{}\"></label>",
        input.amount
    );
    html.push_str(&slider("Transaction Hour", "hour", 0, 23, input.hour));
    html.push_str(&slider("Transaction Day", "day", 1, 31, input.day));
    html.push_str(&slider("Transaction Month", "month", 1, 12, input.month));
    let _ = writeln!(
        html,
        "<label>Customer Age <input type=\"number\" name=\"age\" min=\"0\" max=\"120\" required value=\"{}\"></label>",
        input.age
    );

    html.push_str(&select("Gender", "gender", tables.gender_choices(), &input.gender));
    html.push_str(&select("Category", "category", tables.category_choices(), &input.category));
    html.push_str(&select("State", "state", tables.state_choices(), &input.state));

    html.push_str("<p><button type=\"submit\">Predict</button></p>\n</form>\n");
    html
}

fn slider(label: &str, name: &str, min: i64, max: i64, value: i64) -> String {
    format!(
        "<label>{label} <input type=\"range\" name=\"{name}\" min=\"{min}\" max=\"{max}\" value=\"{value}\" \
         oninput=\"this.nextElementSibling.value = this.value\"><output>{value}</output></label>\n"
    )
}

fn select<'a>(
    label: &str,
    name: &str,
    choices: impl Iterator<Item = &'a str>,
    selected: &str,
) -> String {
    let mut html = format!("<label>{label} <select name=\"{name}\">\n");
    for choice in choices {
        let marker = if choice == selected { " selected" } else { "" };
        let escaped = escape_html(choice);
        let _ = writeln!(html, "<option value=\"{escaped}\"{marker}>{escaped}</option>");
    }
    html.push_str("</select></label>\n");
    html
}

/// Verdict, percentage, and progress bar; or the error message.
pub fn result_panel(outcome: &PredictionOutcome) -> String {
    match outcome {
        PredictionOutcome::Predicted(result) => {
            let verdict = match result.label {
                Verdict::Fraud => "<p class=\"fraud\">⚠️ Predicted: <strong>FRAUD</strong></p>",
                Verdict::Legitimate => {
                    "<p class=\"legit\">✅ Predicted: <strong>LEGITIMATE</strong></p>"
                }
            };
            format!(
                "<h2>Prediction Result</h2>\n{verdict}\n\
                 <p>Fraud Probability: <strong>{}%</strong></p>\n\
                 <progress max=\"1\" value=\"{}\"></progress>\n",
                result.percent, result.probability
            )
        }
        PredictionOutcome::Failed { message } => {
            format!("<p class=\"error\">{}</p>\n", escape_html(message))
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
