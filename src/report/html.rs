// HTML report assembly

use std::path::Path;

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;
use tera::Context;

use crate::templates::TemplateEngine;

const REPORT_TEMPLATE_NAME: &str = "report.html";

const REPORT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0 auto; max-width: 1100px; padding: 24px; color: #222; }
header { border-bottom: 2px solid #3465a4; margin-bottom: 24px; }
nav ul { columns: 2; }
section { margin-bottom: 32px; }
pre { white-space: pre-wrap; word-wrap: break-word; background: #f6f8fa; padding: 16px; border-radius: 6px; font-family: inherit; }
figure { margin: 24px 0; }
figure img { max-width: 100%; border: 1px solid #ddd; }
.meta { color: #666; }
.illustrative { color: #c00; font-size: 0.9em; }
</style>
</head>
<body>
<header>
<h1>{{ title }}</h1>
<p class="meta">Generated {{ generated_at }}</p>
</header>
<section id="executive-summary">
<h2>Executive Summary</h2>
<pre>{{ summary }}</pre>
</section>
<nav>
<h2>Contents</h2>
<ul>
{% for section in sections %}<li><a href="#{{ section.key }}">{{ section.title }}</a></li>
{% endfor %}<li><a href="#visualizations">Visualizations</a></li>
</ul>
</nav>
{% for section in sections %}<section id="{{ section.key }}">
<h2>{{ section.title }}</h2>
<pre>{{ section.text }}</pre>
</section>
{% endfor %}<section id="visualizations">
<h2>Visualizations</h2>
{% if charts | length > 0 %}{% for chart in charts %}<figure>
<figcaption><h3>{{ chart.title }}</h3>{% if chart.illustrative %}<p class="illustrative">Illustrative only: no figures were found in the analysis text.</p>{% endif %}</figcaption>
<img src="{{ chart.data_uri | safe }}" alt="{{ chart.title }}">
</figure>
{% endfor %}{% else %}<p>No charts were generated.</p>
{% endif %}</section>
</body>
</html>
"##;

/// One narrative section of the report
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// Stage key, also the anchor id
    pub key: String,
    pub title: String,
    pub text: String,
}

/// A rendered chart embedded in the report
#[derive(Debug, Clone, Serialize)]
pub struct ChartImage {
    pub title: String,
    pub file_name: String,
    pub data_uri: String,
    pub illustrative: bool,
}

/// Everything the report template needs
#[derive(Debug, Clone, Serialize)]
pub struct ReportPage<'a> {
    pub title: &'a str,
    pub generated_at: String,
    pub summary: &'a str,
    pub sections: &'a [Section],
    pub charts: &'a [ChartImage],
}

/// Encode image bytes as a data URI, typed from the file extension
pub fn data_uri(path: &Path, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    format!("data:{};base64,{}", mime.essence_str(), BASE64.encode(bytes))
}

/// Render the report page. Narrative text is HTML-escaped; only the chart
/// data URIs are inserted raw.
pub fn render_page(page: &ReportPage<'_>) -> Result<String> {
    let mut engine = TemplateEngine::new();
    engine.add_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;
    let context = Context::from_serialize(page)?;
    engine.render(REPORT_TEMPLATE_NAME, &context)
}
