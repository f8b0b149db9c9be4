use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::domain::AppraisalReport;
use super::form::{ApartmentQuery, FormChoices, FormErrors, FORM_FIELDS};
use super::session::SessionValues;

/// URL prefix the chart file is served under.
pub const STATIC_PREFIX: &str = "/static";

/// Field values and messages echoed back into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<&'static str, String>,
    errors: FormErrors,
}

impl FormState {
    /// Empty form prefilled from the visitor's previous appraisal.
    pub fn prefilled(session: Option<SessionValues>) -> Self {
        let mut state = Self::default();
        if let Some(values) = session {
            if let Some(price) = values.price {
                state.values.insert("price", price.to_string());
            }
            if let Some(area) = values.area {
                state.values.insert("area_m2", area.to_string());
            }
        }
        state
    }

    pub fn submitted(query: &ApartmentQuery, errors: FormErrors) -> Self {
        let values = FORM_FIELDS
            .iter()
            .filter_map(|field| query.value(field).map(|value| (*field, value.to_string())))
            .collect();
        Self { values, errors }
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }
}

fn label(field: &str) -> &'static str {
    match field {
        "price" => "Asking price (€)",
        "district" => "District",
        "neighborhood" => "Neighbourhood",
        "condition" => "Condition",
        "type" => "Apartment type",
        "room_type" => "Room type",
        "rooms" => "Rooms",
        "area_m2" => "Area (m²)",
        "accommodates" => "Accommodates",
        "lift" => "Lift",
        "views" => "Views",
        "floor" => "Floor",
        "interest_rate" => "Interest rate",
        "loan_size" => "Loan size (€)",
        _ => "",
    }
}

/// Full HTML page: the form, plus the results section when a report is given.
pub fn render_page(
    choices: &FormChoices,
    form: &FormState,
    report: Option<&AppraisalReport>,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Apartment appraisal</title>\n</head>\n<body>\n");
    html.push_str("<h1>Apartment appraisal</h1>\n");

    render_form(&mut html, choices, form);
    if let Some(report) = report {
        render_report(&mut html, report);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, choices: &FormChoices, form: &FormState) {
    html.push_str("<form method=\"get\" action=\"/\">\n");
    for field in FORM_FIELDS {
        let current = form.value(field).unwrap_or_default();
        writeln!(html, "<p>\n<label for=\"{field}\">{}</label>", label(field))
            .expect("write field label");

        match choices.options(field) {
            Some(options) => {
                writeln!(html, "<select id=\"{field}\" name=\"{field}\">")
                    .expect("write select");
                html.push_str("<option value=\"\">---------</option>\n");
                for option in options {
                    let selected = if option == current { " selected" } else { "" };
                    let option = escape_html(option);
                    writeln!(html, "<option value=\"{option}\"{selected}>{option}</option>")
                        .expect("write option");
                }
                html.push_str("</select>\n");
            }
            None => {
                writeln!(
                    html,
                    "<input id=\"{field}\" name=\"{field}\" type=\"text\" value=\"{}\">",
                    escape_html(current)
                )
                .expect("write input");
            }
        }

        if let Some(message) = form.errors().get(field) {
            writeln!(html, "<span class=\"error\">{}</span>", escape_html(message))
                .expect("write field error");
        }
        html.push_str("</p>\n");
    }
    html.push_str("<button type=\"submit\">Appraise</button>\n</form>\n");
}

fn render_report(html: &mut String, report: &AppraisalReport) {
    html.push_str("<section id=\"prediction\">\n<h2>Results</h2>\n");
    writeln!(
        html,
        "<p>Predicted price: <strong>{} €</strong></p>",
        report.price_prediction
    )
    .expect("write price prediction");
    writeln!(
        html,
        "<p>Predicted rent: <strong>{} € per night</strong></p>",
        report.rent_prediction
    )
    .expect("write rent prediction");
    writeln!(
        html,
        "<p>Cost of capital: <strong>{} %</strong></p>",
        report.cost_of_capital_percent
    )
    .expect("write cost of capital");

    let verdict = match report.price_difference {
        diff if diff > 0 => "below the estimate",
        diff if diff < 0 => "above the estimate",
        _ => "at the estimate",
    };
    writeln!(
        html,
        "<p>Price difference: <strong>{} €</strong> (asking price is {verdict})</p>",
        report.price_difference
    )
    .expect("write price difference");

    if let Some(file) = report
        .chart_path
        .as_deref()
        .and_then(|path| path.file_name())
        .and_then(|name| name.to_str())
    {
        writeln!(
            html,
            "<img src=\"{STATIC_PREFIX}/{}?v={}\" alt=\"Ten-year return projection\">",
            escape_html(file),
            report.generated_at.timestamp_millis()
        )
        .expect("write chart");
    }

    if let Some(pitch) = report.pitch.text() {
        writeln!(html, "<h3>Sales pitch</h3>\n<p class=\"pitch\">{}</p>", escape_html(pitch))
            .expect("write pitch");
    }
    html.push_str("</section>\n");
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
