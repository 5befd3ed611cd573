//! Minimal HTML pages: one form per report and a result page with the chart
//! embedded as a data URI.

use epichart::models::{Continent, Metric, RawParams, ReportId};
use epichart::resolver::defaults;
use epichart::ChartReport;

pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n<h1>{}</h1>\n{}\n<p><a href=\"/\">All reports</a></p>\n</body></html>\n",
        escape(title),
        escape(title),
        body
    )
}

pub fn index() -> String {
    let items: String = ReportId::ALL
        .iter()
        .map(|id| format!("<li><a href=\"/reports/{}\">{}</a></li>\n", id, title(*id)))
        .collect();
    page("Reports", &format!("<ul>\n{}</ul>", items))
}

pub fn title(id: ReportId) -> &'static str {
    match id {
        ReportId::Ranking => "Latest figures by location",
        ReportId::TimeSeries => "One location over time",
        ReportId::Ratio => "Vaccination by continent",
        ReportId::Aggregate => "Life expectancy and hospital beds",
    }
}

/// The input form, pre-filled from `raw` and showing `error` above it.
pub fn form(id: ReportId, locations: &[String], raw: &RawParams, error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(msg) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(msg)));
    }
    body.push_str(&format!("<form method=\"post\" action=\"/reports/{}\">\n", id));

    match id {
        ReportId::Ranking => {
            let chosen = raw.get_all("locations");
            for loc in locations {
                let checked = if chosen.contains(&loc.as_str()) { " checked" } else { "" };
                body.push_str(&format!(
                    "<label><input type=\"checkbox\" name=\"locations[]\" value=\"{0}\"{1}> {0}</label><br>\n",
                    escape(loc),
                    checked
                ));
            }
            body.push_str(&date_input("date", raw, defaults::RANKING_DATE));
            body.push_str(&metric_select(raw, defaults::RANKING_METRIC));
        }
        ReportId::TimeSeries => {
            body.push_str(&format!(
                "<label>country <input name=\"country\" maxlength=\"128\" value=\"{}\"></label><br>\n",
                escape(raw.get("country").unwrap_or(defaults::TIME_SERIES_LOCATION))
            ));
            body.push_str(&date_input("start_date", raw, defaults::TIME_SERIES_START));
            body.push_str(&date_input("end_date", raw, defaults::TIME_SERIES_END));
            body.push_str(&metric_select(raw, defaults::TIME_SERIES_METRIC));
        }
        ReportId::Ratio => {
            body.push_str("<label>continent <select name=\"continent\">\n");
            for c in Continent::ALL {
                let selected = if raw.get("continent") == Some(c.name()) { " selected" } else { "" };
                body.push_str(&format!(
                    "<option value=\"{0}\"{1}>{0} ({2})</option>\n",
                    c.name(),
                    selected,
                    c.snapshot_date()
                ));
            }
            body.push_str("</select></label><br>\n");
        }
        ReportId::Aggregate => {}
    }

    body.push_str("<button type=\"submit\">Draw</button>\n</form>");
    page(title(id), &body)
}

pub fn chart(report: &ChartReport) -> String {
    let mut body = format!(
        "<img alt=\"{}\" src=\"{}\">\n",
        escape(&report.labels.title),
        report.data_uri()
    );
    if let Some(total) = report.total {
        body.push_str(&format!("<p>Population: {:.0}</p>\n", total));
    }
    body.push_str(&format!("<p><a href=\"/reports/{}\">Change parameters</a></p>", report.report));
    page(title(report.report), &body)
}

fn date_input(name: &str, raw: &RawParams, default: &str) -> String {
    format!(
        "<label>{0} <input type=\"date\" name=\"{0}\" value=\"{1}\"></label><br>\n",
        name,
        escape(raw.get(name).unwrap_or(default))
    )
}

fn metric_select(raw: &RawParams, default: Metric) -> String {
    let current = raw.get("metric").unwrap_or(default.column());
    let mut out = String::from("<label>metric <select name=\"metric\">\n");
    for m in Metric::ALL {
        let selected = if m.column() == current { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            m.column(),
            selected,
            m.label()
        ));
    }
    out.push_str("</select></label><br>\n");
    out
}

fn escape(text: &str) -> String {
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
