//! Server-rendered HTML for every page.

use crate::api::ModelMetadata;
use crate::navigation::{Navigation, Route};
use crate::pages::analytics::{self, AnalyticsData, AnalyticsPage, ChartData, ChartKind, Section};
use crate::pages::batch::BatchPage;
use crate::pages::home::{ServiceBadge, FEATURES, STEPS};
use crate::pages::predict::{FieldKind, FormField, PredictPage, ACTION_FIELD, FORM_SECTIONS, RESET_ACTION};
use crate::pages::results::{GradeBucket, ResultsView};
use crate::record::yes_no;
use std::fmt::Write;
use std::time::Duration;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; max-width: 960px; margin: 0 auto; padding: 20px; background: #fafafa; }
    nav { display: flex; gap: 10px; align-items: center; background: #1976d2; padding: 12px 20px; border-radius: 8px; }
    nav .brand { color: white; font-weight: bold; margin-right: auto; }
    nav a { color: #e3f2fd; text-decoration: none; padding: 6px 12px; border-radius: 4px; }
    nav a.active { background: #1565c0; color: white; }
    .container { background: white; padding: 25px; border-radius: 10px; margin-top: 20px; }
    .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 15px; }
    .form-group { margin: 10px 0; }
    label { display: block; margin-bottom: 5px; font-weight: bold; }
    input, select, textarea { width: 100%; padding: 8px; border: 1px solid #ddd; border-radius: 4px; box-sizing: border-box; }
    .field-error { color: #c62828; font-size: 0.85em; }
    button, .button { background: #1976d2; color: white; padding: 10px 20px; border: none; border-radius: 4px; cursor: pointer; margin: 5px; text-decoration: none; display: inline-block; }
    button.secondary, .button.secondary { background: #757575; }
    .banner { padding: 15px; border-radius: 5px; margin: 15px 0; }
    .success { background: #d4edda; color: #155724; border: 1px solid #c3e6cb; }
    .error { background: #f8d7da; color: #721c24; border: 1px solid #f5c6cb; }
    .warning { background: #fff3cd; color: #856404; border: 1px solid #ffeaa7; }
    .info { background: #d1ecf1; color: #0c5460; border: 1px solid #bee5eb; }
    .grade { font-size: 3em; font-weight: bold; }
    .bar { background: #1976d2; height: 18px; border-radius: 3px; }
    .table { width: 100%; border-collapse: collapse; margin: 15px 0; }
    .table th, .table td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }
    .table th { background: #f8f9fa; }
    .steps a { margin-right: 8px; }
    .steps a.active { font-weight: bold; }
    footer { text-align: center; color: #777; margin: 30px 0 10px; font-size: 0.9em; }
"#;

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(active: Option<Route>, title: &str, head: &str, body: &str) -> String {
    let mut nav = String::new();
    for route in Route::MENU {
        let class = if Some(route) == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, r#"<a href="{}"{}>{} {}</a>"#, route.path(), class, route.icon(), route.title());
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title} - Student Grade Predictor</title>
    {head}
    <style>{STYLE}</style>
</head>
<body>
    <nav><span class="brand">🎓 Student Grade Predictor</span>{nav}</nav>
    <div class="container">
{body}
    </div>
    <footer>Student Grade Predictor · predictions served by the grade prediction service</footer>
</body>
</html>"#,
        title = escape(title),
    )
}

fn error_banner(error: Option<&str>, details: &[String]) -> String {
    let Some(error) = error else {
        return String::new();
    };
    let mut html = format!(r#"<div class="banner error"><strong>{}</strong>"#, escape(error));
    if !details.is_empty() {
        html.push_str("<ul>");
        for detail in details {
            let _ = write!(html, "<li>{}</li>", escape(detail));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

fn link(label: &str, to: &Navigation, secondary: bool) -> String {
    let class = if secondary { "button secondary" } else { "button" };
    format!(r#"<a class="{class}" href="{}">{}</a>"#, escape(&to.url()), escape(label))
}

pub fn home_page(badge: &ServiceBadge) -> String {
    let status = match badge {
        ServiceBadge::Healthy { r2_score, mae } => {
            let mut text = "✅ Prediction service is online".to_string();
            if let Some(r2) = r2_score {
                let _ = write!(text, " · R² {r2:.4}");
            }
            if let Some(mae) = mae {
                let _ = write!(text, " · MAE {mae:.2}");
            }
            format!(r#"<div class="banner success">{}</div>"#, escape(&text))
        }
        ServiceBadge::Degraded(status) => format!(
            r#"<div class="banner warning">⚠️ Prediction service reports status "{}" and has no model loaded</div>"#,
            escape(status)
        ),
        ServiceBadge::Unreachable(message) => {
            format!(r#"<div class="banner error">❌ {}</div>"#, escape(message))
        }
    };

    let mut features = String::new();
    for (icon, title, text) in FEATURES {
        let _ = write!(features, "<div><h3>{icon} {title}</h3><p>{text}</p></div>");
    }
    let mut steps = String::new();
    for step in STEPS {
        let _ = write!(steps, "<li>{step}</li>");
    }

    let body = format!(
        r#"<h1>Student Grade Predictor</h1>
<p>Predict a student's final grade (0-20) from their profile, family background and study habits.</p>
{status}
<div class="grid">{features}</div>
<h2>How it works</h2>
<ol>{steps}</ol>
{start}"#,
        start = link("Start Predicting", &Navigation::to(Route::Predict), false),
    );
    layout(Some(Route::Home), "Home", "", &body)
}

fn form_control(field: &FormField, value: &str) -> String {
    match field.kind {
        FieldKind::Number => format!(
            r#"<input type="number" id="{name}" name="{name}" value="{value}" step="1">"#,
            name = field.name,
            value = escape(value),
        ),
        FieldKind::Choice(list) => select(field.name, value, &list()),
        FieldKind::YesNo => select(
            field.name,
            value,
            &[(yes_no::as_str(true), "Yes"), (yes_no::as_str(false), "No")],
        ),
    }
}

fn select(name: &str, value: &str, options: &[(&str, &str)]) -> String {
    let mut html = format!(r#"<select id="{name}" name="{name}">"#);
    for (code, label) in options {
        let selected = if *code == value { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{code}"{selected}>{}</option>"#, escape(label));
    }
    html.push_str("</select>");
    html
}

pub fn predict_page(page: &PredictPage) -> String {
    let mut sections = String::new();
    for section in FORM_SECTIONS {
        let _ = write!(sections, r#"<h2>{}</h2><div class="grid">"#, section.title);
        for field in section.fields {
            let value = page.draft().value_of(field.name).unwrap_or_default();
            let _ = write!(
                sections,
                r#"<div class="form-group"><label for="{}">{}</label>{}"#,
                field.name,
                field.label,
                form_control(field, &value)
            );
            if let Some(message) = page.errors().get(field.name) {
                let _ = write!(sections, r#"<div class="field-error">{}</div>"#, escape(message));
            }
            sections.push_str("</div>");
        }
        sections.push_str("</div>");
    }

    let summary = if page.errors().is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="banner warning">Please fix {} field(s) before predicting.</div>"#,
            page.errors().len()
        )
    };

    let body = format!(
        r#"<h1>⚡ Predict Student Grade</h1>
<p>Fill in the student's information. All 32 attributes are sent to the prediction service.</p>
{summary}
{banner}
<form method="post" action="{action}">
{sections}
<div>
    <button type="submit" name="{ACTION_FIELD}" value="predict">🎯 Predict Grade</button>
    <button type="submit" class="secondary" name="{ACTION_FIELD}" value="{RESET_ACTION}">Reset</button>
</div>
</form>"#,
        banner = error_banner(page.error(), page.service_errors()),
        action = Route::Predict.path(),
    );
    layout(Some(Route::Predict), "Predict", "", &body)
}

/// Confirmation shown after a successful prediction, moving on to the
/// results page once `after` has elapsed.
pub fn redirecting_page(page: &PredictPage, after: Duration, to: &Navigation) -> String {
    let url = escape(&to.url());
    let head = format!(
        r#"<meta http-equiv="refresh" content="{:.3};url={url}">"#,
        after.as_secs_f64()
    );
    let grade = page
        .result()
        .map(|r| format!("{:.2}", r.predicted_grade))
        .unwrap_or_default();
    let body = format!(
        r#"<div class="banner success">
    <strong>Prediction complete!</strong> Predicted final grade: {grade} / 20. Redirecting to results...
</div>
<p><a href="{url}">Continue to results</a></p>"#
    );
    layout(Some(Route::Predict), "Predict", &head, &body)
}

pub fn results_page(view: &ResultsView) -> String {
    let mut actions = String::new();
    for (i, (label, to)) in view.actions().iter().enumerate() {
        actions.push_str(&link(label, to, i > 0));
    }

    let body = match view {
        ResultsView::NoData => format!(
            r#"<h1>🎯 Prediction Results</h1>
<div class="banner info">No prediction data available. Please make a prediction first.</div>
{actions}"#
        ),
        ResultsView::Prediction { result, bucket } => {
            let text = bucket.interpretation();
            let mut points = String::new();
            for point in text.points {
                let _ = write!(points, "<li>{point}</li>");
            }
            let mut confidence = String::new();
            if let Some(r2) = result.r2_score() {
                let _ = write!(confidence, "<li>Model R² score: {r2:.4}</li>");
            }
            if let Some(mae) = result.mae() {
                let _ = write!(confidence, "<li>Mean absolute error: {mae:.2} grades</li>");
            }
            let confidence = if confidence.is_empty() {
                String::new()
            } else {
                format!("<h3>Model Confidence</h3><ul>{confidence}</ul>")
            };

            format!(
                r#"<h1>🎯 Prediction Results</h1>
<div class="banner {tone}">
    <div>Predicted Final Grade</div>
    <div class="grade">{grade:.2}</div>
    <div>Range: 0-20 · {name}</div>
</div>
{confidence}
<h2>{icon} {headline}</h2>
<p>{summary}</p>
<ul>{points}</ul>
<p><strong>Recommendation:</strong> {recommendation}</p>
{scale}
{actions}"#,
                tone = bucket.tone(),
                grade = result.predicted_grade,
                name = bucket.name(),
                icon = text.icon,
                headline = text.headline,
                summary = text.summary,
                recommendation = text.recommendation,
                scale = grade_scale(*bucket),
            )
        }
    };
    layout(None, "Results", "", &body)
}

fn grade_scale(current: GradeBucket) -> String {
    let mut rows = String::new();
    for bucket in GradeBucket::ALL {
        let marker = if bucket == current { " ◀" } else { "" };
        let _ = write!(rows, "<tr><td>{}</td><td>{}{marker}</td></tr>", bucket.name(), bucket.interpretation().headline);
    }
    format!(r#"<h3>Grade Scale</h3><table class="table">{rows}</table>"#)
}

// Only the targeted section is shown; with no target, the initial one.
const SECTION_STYLE: &str = r#"<style>
    .analytics-section { display: none; }
    .analytics-section:target { display: block; }
    .sections:not(:has(.analytics-section:target)) > .initial { display: block; }
</style>"#;

fn section_anchor(index: usize) -> String {
    format!("#section-{index}")
}

/// URL of the request that performs the metadata fetch, opening on `index`.
fn analytics_load_url(index: usize) -> String {
    format!("{}?section={index}&load=1{}", Route::Analytics.path(), section_anchor(index))
}

fn section_controls(index: usize) -> String {
    let mut page = AnalyticsPage::at(index);
    let back = match page.previous() {
        Some(nav) => format!(r#"<a class="button secondary" href="{}">← Back to Predict</a>"#, escape(&nav.url())),
        None => format!(r#"<a class="button secondary" href="{}">← Previous</a>"#, section_anchor(page.index())),
    };

    let mut page = AnalyticsPage::at(index);
    page.next();
    let forward = if page.index() == index {
        String::new()
    } else {
        format!(r#"<a class="button" href="{}">Next →</a>"#, section_anchor(page.index()))
    };
    format!("<div>{back}{forward}</div>")
}

fn section_content(section: Section, metadata: &ModelMetadata) -> String {
    match section {
        Section::Charts => analytics::charts(metadata).iter().map(chart).collect(),
        Section::Insights => {
            let mut html = String::from(r#"<div class="grid">"#);
            for insight in analytics::insights(metadata) {
                let _ = write!(
                    html,
                    r#"<div class="banner info"><h3>{} {}</h3><p>{}</p></div>"#,
                    insight.icon,
                    escape(&insight.title),
                    escape(&insight.text)
                );
            }
            html.push_str("</div>");
            html
        }
        Section::Statistics => {
            let mut html = String::from(r#"<table class="table">"#);
            for stat in analytics::statistics(metadata) {
                let _ = write!(
                    html,
                    "<tr><th>{} {}</th><td>{}</td></tr>",
                    stat.icon,
                    stat.label,
                    escape(&stat.value)
                );
            }
            html.push_str("</table>");
            html
        }
    }
}

/// Loading view while metadata is pending; once loaded, every section is
/// rendered from the one fetch and switched in the browser.
pub fn analytics_page(page: &AnalyticsPage) -> String {
    let title = "📊 Model Analytics";
    match page.data() {
        AnalyticsData::Loading => {
            let head = format!(
                r#"<meta http-equiv="refresh" content="0;url={}">"#,
                escape(&analytics_load_url(page.index()))
            );
            let body = format!(r#"<h1>{title}</h1><div class="banner info">Loading analytics...</div>"#);
            layout(Some(Route::Analytics), "Analytics", &head, &body)
        }
        AnalyticsData::NoData => {
            let body = format!(
                r#"<h1>{title}</h1>
<div class="banner warning">No analytics data available. Make sure the prediction service is running and has a trained model.</div>
{}"#,
                link("Go to Predict", &Navigation::to(Route::Predict), false)
            );
            layout(Some(Route::Analytics), "Analytics", "", &body)
        }
        AnalyticsData::Loaded(metadata) => {
            let mut sections = String::new();
            for (i, section) in Section::ALL.iter().enumerate() {
                let mut steps = String::new();
                for (j, other) in Section::ALL.iter().enumerate() {
                    let class = if i == j { " class=\"active\"" } else { "" };
                    let _ = write!(steps, r#"<a href="{}"{class}>{}. {}</a>"#, section_anchor(j), j + 1, other.title());
                }
                let initial = if i == page.index() { " initial" } else { "" };
                let _ = write!(
                    sections,
                    r#"<section id="section-{i}" class="analytics-section{initial}">
<div class="steps">{steps}</div>
<h2>{}</h2>
{}
{}
</section>"#,
                    section.title(),
                    section_content(*section, metadata),
                    section_controls(i),
                );
            }
            let body = format!(r#"<h1>{title}</h1><div class="sections">{sections}</div>"#);
            layout(Some(Route::Analytics), "Analytics", SECTION_STYLE, &body)
        }
    }
}

fn chart(data: &ChartData) -> String {
    let mut html = format!("<h3>{}</h3>", escape(&data.title));
    match data.kind {
        ChartKind::Pie => {
            html.push_str("<ul>");
            for (label, value) in data.labels.iter().zip(&data.values) {
                let _ = write!(html, "<li>{}: {value:.2}%</li>", escape(label));
            }
            html.push_str("</ul>");
        }
        ChartKind::Line | ChartKind::Bar => {
            let max = data.values.iter().copied().fold(0.0_f64, f64::max);
            html.push_str(r#"<table class="table">"#);
            for (label, value) in data.labels.iter().zip(&data.values) {
                let width = if max > 0.0 { (value / max * 100.0).clamp(0.0, 100.0) } else { 0.0 };
                let _ = write!(
                    html,
                    r#"<tr><td>{}</td><td style="width: 60%"><div class="bar" style="width: {width:.1}%"></div></td><td>{value:.4}</td></tr>"#,
                    escape(label)
                );
            }
            html.push_str("</table>");
        }
    }
    let _ = write!(html, "<p><em>{}</em></p>", escape(&data.footer));
    html
}

pub fn batch_page(page: &BatchPage, template: &str) -> String {
    let mut problems = String::new();
    if !page.row_errors().is_empty() {
        problems.push_str(r#"<div class="banner warning"><strong>Please fix the CSV before predicting.</strong><ul>"#);
        for error in page.row_errors() {
            let location = if error.row == 0 {
                "Header".to_string()
            } else {
                format!("Row {}", error.row)
            };
            let _ = write!(problems, "<li>{location}: {}</li>", escape(&error.message));
        }
        problems.push_str("</ul></div>");
    }

    let summary = match page.summary() {
        Some(summary) => {
            let mut html = format!(
                r#"<h2>Batch Results</h2>
<div class="banner success">{} students · mean predicted grade {:.2}{}</div>"#,
                summary.count,
                summary.mean_grade,
                summary.r2_score.map(|r2| format!(" · R² {r2:.4}")).unwrap_or_default()
            );
            html.push_str(r#"<table class="table"><tr><th>Bucket</th><th>Students</th></tr>"#);
            for (bucket, count) in &summary.bucket_counts {
                let _ = write!(html, "<tr><td>{}</td><td>{count}</td></tr>", bucket.name());
            }
            html.push_str(r#"</table><table class="table"><tr><th>Student</th><th>Predicted Grade</th><th>Assessment</th></tr>"#);
            for row in &summary.rows {
                let _ = write!(
                    html,
                    r#"<tr><td>{}</td><td>{:.2}</td><td class="{}">{}</td></tr>"#,
                    row.student,
                    row.grade,
                    row.bucket.tone(),
                    row.bucket.name()
                );
            }
            html.push_str("</table>");
            html
        }
        None => String::new(),
    };

    let body = format!(
        r#"<h1>📁 Batch Student Prediction</h1>
<p>Paste CSV data with one student per row. The header must name all 32 attributes.</p>
{banner}
{problems}
<form method="post" action="{action}">
    <textarea name="csv" rows="10" placeholder="{placeholder}">{csv}</textarea>
    <button type="submit">📊 Predict Batch</button>
</form>
{summary}"#,
        banner = error_banner(page.error(), page.service_errors()),
        action = Route::Batch.path(),
        placeholder = escape(template),
        csv = escape(page.csv()),
    );
    layout(Some(Route::Batch), "Batch", "", &body)
}

pub fn not_found_page(path: &str) -> String {
    let body = format!(
        r#"<h1>Page not found</h1>
<div class="banner info">There is no page at <code>{}</code>.</div>
{}"#,
        escape(path),
        link("Go Home", &Navigation::to(Route::Home), false)
    );
    layout(None, "Not Found", "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ModelConfidence, PredictionResult};

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_menu_marks_active_route() {
        let html = layout(Some(Route::Batch), "Batch", "", "");
        assert!(html.contains(r#"<a href="/batch" class="active">"#));
        assert!(html.contains(r#"<a href="/predict">"#));
    }

    #[test]
    fn test_predict_form_shows_defaults_and_errors() {
        let mut page = PredictPage::new();
        page.set_field("age", "30");
        page.begin_submit();
        let html = predict_page(&page);
        assert!(html.contains(r#"name="age" value="30""#));
        assert!(html.contains("Age must be between 15 and 22"));
        assert!(html.contains(r#"<option value="GP" selected>"#));
    }

    #[test]
    fn test_redirect_waits_before_results() {
        let mut page = PredictPage::new();
        page.begin_submit();
        let result = PredictionResult::new(14.5, None).unwrap();
        page.finish_submit(Ok(result.clone()), "http://svc", Duration::from_millis(1000));
        let html = redirecting_page(&page, Duration::from_millis(1000), &Navigation::results(result));
        assert!(html.contains(r#"content="1.000;url=/results?predicted_grade=14.5""#));
        assert!(html.contains("14.50 / 20"));
    }

    #[test]
    fn test_results_page() {
        let result = PredictionResult::new(
            18.25,
            Some(ModelConfidence {
                r2_score: Some(0.8121),
                mae: Some(1.2),
            }),
        )
        .unwrap();
        let html = results_page(&ResultsView::from_handoff(Some(result)));
        assert!(html.contains("18.25"));
        assert!(html.contains("Excellent Performance (18-20)"));
        assert!(html.contains("R² score: 0.8121"));

        let empty = results_page(&ResultsView::NoData);
        assert!(empty.contains("No prediction data available"));
        assert!(empty.contains(r#"href="/predict""#));
    }

    #[test]
    fn test_analytics_loading_view_refreshes_into_fetch() {
        let html = analytics_page(&AnalyticsPage::at(1));
        assert!(html.contains("Loading analytics..."));
        assert!(html.contains(r#"content="0;url=/analytics?section=1&amp;load=1#section-1""#));
    }

    #[test]
    fn test_loaded_analytics_renders_every_section() {
        let mut page = AnalyticsPage::at(2);
        page.load(Ok(crate::api::ModelMetadata {
            r2_score: Some(0.8),
            ..Default::default()
        }));
        let html = analytics_page(&page);
        for section in Section::ALL {
            assert!(html.contains(&format!("<h2>{}</h2>", section.title())));
        }
        assert!(html.contains(r#"<section id="section-2" class="analytics-section initial">"#));
        assert!(html.contains(r#"<section id="section-0" class="analytics-section">"#));
        assert!(html.contains(r#"href="/predict">← Back to Predict"#));
        assert!(html.contains(r##"href="#section-1">← Previous"##));
        assert!(!html.contains("#section-3"));
        assert!(html.contains("Test Accuracy"));
    }
}
