use std::fmt;

use crate::data_models::SearchHit;

use super::SearchForm;

pub const TITLE: &str = "Site Search";
pub const SUBMIT_LABEL: &str = "Search";
pub const SUBMITTING_LABEL: &str = "Searching...";
pub const RESULTS_HEADER: &str = "Top results";

#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    /// `Score: 0.8231`
    pub score_line: String,
    pub text: String,
}

/// Everything the form shows, derived from its state and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub url: String,
    pub query: String,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub entries: Vec<EntryView>,
}

/// Four decimals, ties rounded away from zero (`0.03125` -> `0.0313`).
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("Score: {}", four_decimals(score)),
        None => "Score: n/a".to_string(),
    }
}

// `{:.4}` breaks exact ties towards the even digit. An f64 can only sit
// exactly halfway between two 4-decimal values when it is a multiple of
// 1/32, and then `{:.5}` prints it exactly.
fn four_decimals(x: f64) -> String {
    let tie = x.is_finite() && (x * 32.0).fract() == 0.0 && format!("{x:.5}").ends_with('5');
    let x = if tie { x + 0.00005f64.copysign(x) } else { x };
    format!("{x:.4}")
}

fn entry(hit: &SearchHit) -> EntryView {
    EntryView {
        score_line: format_score(hit.score),
        text: hit.text.clone(),
    }
}

pub fn render(form: &SearchForm) -> FormView {
    FormView {
        url: form.url().to_string(),
        query: form.query().to_string(),
        submit_label: if form.loading() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        },
        submit_enabled: !form.loading(),
        entries: form.results().iter().map(entry).collect(),
    }
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f, "Website URL:  {}", self.url)?;
        writeln!(f, "Search Query: {}", self.query)?;
        if self.submit_enabled {
            writeln!(f, "[ {} ]", self.submit_label)?;
        } else {
            writeln!(f, "[ {} ] (disabled)", self.submit_label)?;
        }
        writeln!(f)?;
        writeln!(f, "{RESULTS_HEADER}")?;
        for entry in &self.entries {
            writeln!(f, "----")?;
            writeln!(f, "{}", entry.score_line)?;
            // text is written as-is so its line breaks survive
            writeln!(f, "{}", entry.text)?;
        }
        Ok(())
    }
}
