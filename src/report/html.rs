//! HTML report page.

use crate::config::PageConfig;
use crate::dataset::Row;
use crate::narrative::summary::format_count;
use crate::report::charts::ChartSeries;
use chrono::{Datelike, NaiveDate};

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: sans-serif; line-height: 1.6; color: #333; background-color: #f5f5f5; padding: 20px; }
    .container { max-width: 1200px; margin: 0 auto; background-color: white; padding: 40px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    header { border-bottom: 3px solid #2E86AB; padding-bottom: 20px; margin-bottom: 30px; }
    h1 { color: #2E86AB; font-size: 2.5em; margin-bottom: 10px; }
    .subtitle { color: #666; font-size: 1.2em; }
    .date { color: #999; font-size: 0.9em; margin-top: 10px; }
    h2 { color: #2E86AB; font-size: 1.8em; margin-top: 40px; margin-bottom: 20px; padding-bottom: 10px; border-bottom: 2px solid #eee; }
    h3 { color: #555; font-size: 1.3em; margin-top: 30px; margin-bottom: 15px; }
    .summary { background-color: #f9f9f9; padding: 20px; border-radius: 5px; margin-bottom: 30px; border-left: 4px solid #2E86AB; }
    .summary p { margin-bottom: 10px; }
    .bar { height: 14px; background-color: #2E86AB; border-radius: 3px; }
    .bar.prior { background-color: #A23B72; opacity: 0.6; }
    table { width: 100%; border-collapse: collapse; margin: 20px 0; }
    th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
    th { background-color: #2E86AB; color: white; font-weight: bold; }
    footer { margin-top: 50px; padding-top: 20px; border-top: 1px solid #ddd; text-align: center; color: #999; font-size: 0.9em; }
"#;

/// Escapes text for use in element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replaces balanced `**text**` pairs with `<strong>`.
fn bold(line: &str) -> String {
    let pieces: Vec<&str> = line.split("**").collect();
    if pieces.len() % 2 == 0 {
        // unbalanced marker, leave as is
        return line.to_string();
    }

    let mut out = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i % 2 == 1 {
            out.push_str("<strong>");
            out.push_str(piece);
            out.push_str("</strong>");
        } else {
            out.push_str(piece);
        }
    }
    out
}

/// Converts the summary Markdown subset (headings, bold, paragraphs) to HTML.
///
/// `#` becomes `<h2>` and `##` becomes `<h3>` so the page title keeps `<h1>`.
/// Consecutive lines form one paragraph joined by `<br>`.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();

    let flush = |paragraph: &mut Vec<String>, blocks: &mut Vec<String>| {
        if !paragraph.is_empty() {
            blocks.push(format!("<p>{}</p>", paragraph.join("<br>\n")));
            paragraph.clear();
        }
    };

    for line in markdown.lines() {
        let escaped = bold(&escape_html(line));
        if let Some(text) = escaped.strip_prefix("## ") {
            flush(&mut paragraph, &mut blocks);
            blocks.push(format!("<h3>{}</h3>", text));
        } else if let Some(text) = escaped.strip_prefix("# ") {
            flush(&mut paragraph, &mut blocks);
            blocks.push(format!("<h2>{}</h2>", text));
        } else if escaped.trim().is_empty() {
            flush(&mut paragraph, &mut blocks);
        } else {
            paragraph.push(escaped);
        }
    }
    flush(&mut paragraph, &mut blocks);

    blocks.join("\n")
}

fn chart_value(series: &ChartSeries, value: f64) -> String {
    if series.is_rate {
        format!("{:.2}%", value * 100.0)
    } else {
        format_count(value)
    }
}

fn bar(class: &str, value: f64, max: f64) -> String {
    let width = if max > 0.0 { value / max * 100.0 } else { 0.0 };
    format!(
        r#"<div class="{}" style="width: {:.1}%"></div>"#,
        class,
        width.clamp(0.0, 100.0)
    )
}

fn render_chart(series: &ChartSeries) -> String {
    let mut html = format!("<div class=\"graph\">\n<h3>{}</h3>\n", escape_html(series.title));

    if series.points.is_empty() {
        html.push_str("<p>No data for this period.</p>\n</div>");
        return html;
    }

    let max = series.max_value();
    html.push_str("<table>\n");
    for point in &series.points {
        let mut bars = String::new();
        if let Some(last) = point.last_week {
            bars.push_str(&bar("bar prior", last, max));
        }
        bars.push_str(&bar("bar", point.this_week, max));

        let value = match point.last_week {
            Some(last) => format!(
                "{} &rarr; {}",
                chart_value(series, last),
                chart_value(series, point.this_week)
            ),
            None => chart_value(series, point.this_week),
        };

        html.push_str(&format!(
            "<tr><td>{}</td><td style=\"width: 60%\">{}</td><td>{}</td></tr>\n",
            escape_html(&point.label),
            bars,
            value
        ));
    }
    html.push_str("</table>\n</div>");

    html
}

fn number(row: &Row, column: &str) -> f64 {
    row.get(column).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn render_top_queries(key_column: &str, rows: &[Row]) -> String {
    let mut html = String::from(
        "<section class=\"data-tables\">\n<h2>🔍 Top Search Queries</h2>\n<table>\n<thead>\n\
         <tr><th>Rank</th><th>Query</th><th>Clicks</th><th>Impressions</th><th>CTR</th><th>Avg. position</th></tr>\n\
         </thead>\n<tbody>\n",
    );

    for (i, row) in rows.iter().enumerate() {
        let key = row.get(key_column).map(|v| v.to_string()).unwrap_or_default();
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td><td>{:.1}</td></tr>\n",
            i + 1,
            escape_html(&key),
            format_count(number(row, "clicks")),
            format_count(number(row, "impressions")),
            number(row, "ctr") * 100.0,
            number(row, "position")
        ));
    }

    html.push_str("</tbody>\n</table>\n</section>");
    html
}

/// Everything the page shows.
pub struct ReportPage<'a> {
    pub page: &'a PageConfig,
    pub report_date: NaiveDate,
    pub summary_markdown: &'a str,
    pub charts: &'a [ChartSeries],
    pub top_key_column: &'a str,
    pub top_rows: &'a [Row],
}

/// Renders the complete HTML document.
pub fn render_report(report: &ReportPage<'_>) -> String {
    let title = escape_html(&report.page.title);
    let subtitle = escape_html(&report.page.subtitle);
    let date = report.report_date.format("%Y-%m-%d");

    let mut body = String::new();
    body.push_str(&format!(
        "<header>\n<h1>{}</h1>\n<div class=\"subtitle\">{}</div>\n<div class=\"date\">Report date: {}</div>\n</header>\n",
        title, subtitle, date
    ));
    body.push_str(&format!(
        "<section class=\"summary\">\n{}\n</section>\n",
        markdown_to_html(report.summary_markdown)
    ));

    if !report.charts.is_empty() {
        body.push_str("<section class=\"graphs\">\n<h2>📊 Charts</h2>\n");
        for chart in report.charts {
            body.push_str(&render_chart(chart));
            body.push('\n');
        }
        body.push_str("</section>\n");
    }

    if !report.top_rows.is_empty() {
        body.push_str(&render_top_queries(report.top_key_column, report.top_rows));
        body.push('\n');
    }

    body.push_str(&format!(
        "<footer>\n<p>Generated by weekly_seo_report</p>\n<p>&copy; {}</p>\n</footer>\n",
        report.report_date.year()
    ));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{} - {}</title>\n<style>{}</style>\n</head>\n<body>\n<div class=\"container\">\n{}</div>\n</body>\n</html>\n",
        title, date, STYLE, body
    )
}
