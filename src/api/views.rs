//! Server-rendered HTML for the prediction form and its result area.

use crate::error::AppError;
use crate::models::{
    CustomerProfile, Gender, Geography, YesNo, AGE_RANGE, BALANCE_RANGE, CREDIT_SCORE_RANGE,
    ESTIMATED_SALARY_RANGE, NAME_MAX_CHARS, NUM_OF_PRODUCTS_RANGE, TENURE_RANGE,
};
use crate::report::{Tone, Verdict};
use serde::Deserialize;
use std::fmt::Write;
use strum::IntoEnumIterator;

/// What the result area shows below the form
pub enum ResultArea<'a> {
    Empty,
    Verdict(&'a Verdict),
    Error(&'a AppError),
}

/// Values to pre-fill the controls with
///
/// Selects stay on their placeholder when the value is `None`. Deserializes
/// from a raw form body so a rejected submission can still be echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormValues {
    pub name: String,
    pub credit_score: Option<String>,
    pub geography: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub tenure: Option<String>,
    pub balance: Option<String>,
    pub num_of_products: Option<String>,
    pub has_cr_card: Option<String>,
    pub is_active_member: Option<String>,
    pub estimated_salary: Option<String>,
}

impl From<&CustomerProfile> for FormValues {
    fn from(profile: &CustomerProfile) -> Self {
        Self {
            name: profile.name.clone(),
            credit_score: Some(profile.credit_score.to_string()),
            geography: profile.geography.map(|g| g.to_string()),
            gender: profile.gender.map(|g| g.to_string()),
            age: Some(profile.age.to_string()),
            tenure: Some(profile.tenure.to_string()),
            balance: Some(format!("{:.2}", profile.balance)),
            num_of_products: Some(profile.num_of_products.to_string()),
            has_cr_card: profile.has_cr_card.map(|v| v.to_string()),
            is_active_member: profile.is_active_member.map(|v| v.to_string()),
            estimated_salary: Some(format!("{:.2}", profile.estimated_salary)),
        }
    }
}

/// Render the whole page
pub fn render_page(values: &FormValues, result: ResultArea<'_>) -> String {
    let mut page = String::with_capacity(8 * 1024);
    page.push_str(HEAD);
    page.push_str("<h1>Bank Customer Churn Prediction</h1>\n");
    page.push_str("<form method=\"post\" action=\"/predict\">\n");

    let _ = writeln!(
        page,
        "<label>Name <input type=\"text\" name=\"name\" maxlength=\"{}\" value=\"{}\"></label>",
        NAME_MAX_CHARS,
        escape(&values.name)
    );

    number_input(
        &mut page,
        "Credit Score",
        "credit_score",
        *CREDIT_SCORE_RANGE.start() as f64,
        *CREDIT_SCORE_RANGE.end() as f64,
        "1",
        &values.credit_score,
    );
    select(
        &mut page,
        "Geography",
        "geography",
        "Select a country",
        Geography::iter().map(|g| g.to_string()),
        &values.geography,
    );
    select(
        &mut page,
        "Gender",
        "gender",
        "Select a gender",
        Gender::iter().map(|g| g.to_string()),
        &values.gender,
    );
    number_input(
        &mut page,
        "Age",
        "age",
        *AGE_RANGE.start() as f64,
        *AGE_RANGE.end() as f64,
        "1",
        &values.age,
    );
    number_input(
        &mut page,
        "Tenure",
        "tenure",
        *TENURE_RANGE.start() as f64,
        *TENURE_RANGE.end() as f64,
        "1",
        &values.tenure,
    );
    number_input(
        &mut page,
        "Balance",
        "balance",
        *BALANCE_RANGE.start(),
        *BALANCE_RANGE.end(),
        "0.01",
        &values.balance,
    );
    number_input(
        &mut page,
        "Number of Products",
        "num_of_products",
        *NUM_OF_PRODUCTS_RANGE.start() as f64,
        *NUM_OF_PRODUCTS_RANGE.end() as f64,
        "1",
        &values.num_of_products,
    );
    select(
        &mut page,
        "Has Credit Card",
        "has_cr_card",
        "Select yes or no",
        YesNo::iter().map(|v| v.to_string()),
        &values.has_cr_card,
    );
    select(
        &mut page,
        "Is Active Member",
        "is_active_member",
        "Select yes or no",
        YesNo::iter().map(|v| v.to_string()),
        &values.is_active_member,
    );
    number_input(
        &mut page,
        "Estimated Salary",
        "estimated_salary",
        *ESTIMATED_SALARY_RANGE.start(),
        *ESTIMATED_SALARY_RANGE.end(),
        "0.01",
        &values.estimated_salary,
    );

    page.push_str("<button type=\"submit\">Make Prediction</button>\n</form>\n");

    match result {
        ResultArea::Empty => {}
        ResultArea::Verdict(verdict) => render_verdict(&mut page, verdict),
        ResultArea::Error(error) => {
            let _ = writeln!(
                page,
                "<section class=\"result error\" data-code=\"{}\"><p>{}</p></section>",
                error.error_code(),
                escape(&error.to_string())
            );
        }
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn render_verdict(page: &mut String, verdict: &Verdict) {
    let class = match verdict.tone {
        Tone::Error => "error",
        Tone::Success => "success",
    };

    let _ = writeln!(
        page,
        "<section class=\"result {class}\" data-outcome=\"{outcome}\">\n\
         <p class=\"headline\">{headline}</p>\n\
         <p class=\"probability\">{label}: {text}</p>\n\
         <progress max=\"100\" value=\"{progress}\">{progress}%</progress>\n\
         <p class=\"caption\">{caption}</p>\n\
         </section>",
        class = class,
        outcome = verdict.outcome,
        headline = escape(&verdict.headline),
        label = escape(&verdict.probability_label),
        text = verdict.probability_text,
        progress = verdict.progress,
        caption = escape(&verdict.caption),
    );
}

fn number_input(
    page: &mut String,
    label: &str,
    name: &str,
    min: f64,
    max: f64,
    step: &str,
    value: &Option<String>,
) {
    let _ = writeln!(
        page,
        "<label>{label} <input type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" \
         step=\"{step}\" value=\"{value}\" required></label>",
        label = label,
        name = name,
        min = min,
        max = max,
        step = step,
        value = escape(value.as_deref().unwrap_or("")),
    );
}

fn select(
    page: &mut String,
    label: &str,
    name: &str,
    placeholder: &str,
    options: impl Iterator<Item = String>,
    selected: &Option<String>,
) {
    let _ = write!(page, "<label>{} <select name=\"{}\">", label, name);
    let _ = write!(
        page,
        "<option value=\"\"{}>{}</option>",
        if selected.is_none() { " selected" } else { "" },
        placeholder
    );
    for option in options {
        let is_selected = selected.as_deref() == Some(option.as_str());
        let _ = write!(
            page,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(&option),
            if is_selected { " selected" } else { "" }
        );
    }
    page.push_str("</select></label>\n");
}

/// Escape text for HTML bodies and double-quoted attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Bank Customer Churn Prediction</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
label { display: block; margin: 0.5rem 0; }
.result { margin-top: 1.5rem; padding: 1rem; border-radius: 4px; }
.result.error { background: #fdecea; color: #611a15; }
.result.success { background: #edf7ed; color: #1e4620; }
progress { width: 100%; }
.caption { font-size: 0.8rem; opacity: 0.8; }
</style>
</head>
<body>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{ChurnLabel, ChurnPrediction};

    #[test]
    fn test_empty_form_has_placeholders_selected() {
        let page = render_page(&FormValues::default(), ResultArea::Empty);

        assert!(page.contains("Make Prediction"));
        assert!(page.contains("<option value=\"\" selected>Select a country</option>"));
        assert!(page.contains("name=\"balance\" min=\"0\" max=\"250898.09\" step=\"0.01\""));
        assert!(page.contains("name=\"estimated_salary\" min=\"11.58\" max=\"199992.48\""));
        assert!(!page.contains("class=\"result"));
    }

    #[test]
    fn test_submitted_values_are_kept() {
        let values = FormValues {
            geography: Some("Germany".to_string()),
            has_cr_card: Some("no".to_string()),
            age: Some("40".to_string()),
            ..Default::default()
        };
        let page = render_page(&values, ResultArea::Empty);

        assert!(page.contains("<option value=\"Germany\" selected>Germany</option>"));
        assert!(page.contains("<option value=\"no\" selected>no</option>"));
        assert!(page.contains("value=\"40\""));
    }

    #[test]
    fn test_churn_verdict_uses_error_tone() {
        let verdict =
            Verdict::from_prediction(&ChurnPrediction::new(ChurnLabel::Churn, 0.9), "ann");
        let page = render_page(&FormValues::default(), ResultArea::Verdict(&verdict));

        assert!(page.contains("class=\"result error\" data-outcome=\"churn\""));
        assert!(page.contains("Sorry Ann! The model predicts you might churn."));
        assert!(page.contains("<progress max=\"100\" value=\"90\">"));
        assert!(page.contains("may not be 100% accurate"));
    }

    #[test]
    fn test_error_notice() {
        let error = AppError::UnseenCategory {
            column: "Geography".to_string(),
            value: "<missing>".to_string(),
        };
        let page = render_page(&FormValues::default(), ResultArea::Error(&error));

        assert!(page.contains("data-code=\"UNSEEN_CATEGORY\""));
        assert!(page.contains("&lt;missing&gt;"));
    }

    #[test]
    fn test_name_is_escaped() {
        let values = FormValues {
            name: "<script>\"x\"".to_string(),
            ..Default::default()
        };
        let page = render_page(&values, ResultArea::Empty);
        assert!(page.contains("value=\"&lt;script&gt;&quot;x&quot;\""));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_values_from_unparseable_body() {
        let values: FormValues =
            serde_urlencoded::from_str("name=ann&age=&balance=12.50&geography=Spain").unwrap();

        assert_eq!(values.name, "ann");
        assert_eq!(values.age.as_deref(), Some(""));
        assert_eq!(values.balance.as_deref(), Some("12.50"));
        assert_eq!(values.gender, None);

        let page = render_page(&values, ResultArea::Empty);
        assert!(page.contains("<option value=\"Spain\" selected>Spain</option>"));
    }
}
