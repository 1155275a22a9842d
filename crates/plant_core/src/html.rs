//! HTML surface for display models.
//!
//! Layout only: every color and string comes from the display model.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::render::{
    Badge, ClassificationDisplay, ConfigurationDisplay, DisplayModel, IdentificationDisplay,
    Listing,
};

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 900px; margin: 40px auto; padding: 20px; line-height: 1.6; color: #2c3e50; }
h1, h2 { margin-bottom: 0.5rem; }
.result-main { padding: 1.5rem; border-radius: 8px; border: 2px solid; }
.alert { background: #fff3cd; border-left: 4px solid #FF9800; padding: 12px; margin: 1rem 0; border-radius: 4px; }
.metrics { display: flex; gap: 1rem; margin: 1rem 0; }
.metric { flex: 1; padding: 1rem; border: 1px solid #ecf0f1; border-radius: 8px; text-align: center; }
.metric-label { font-size: 0.9rem; color: #6c757d; }
.metric-value { font-size: 1.4rem; font-weight: bold; }
.bar { margin: 0.5rem 0; }
.bar-header { display: flex; justify-content: space-between; }
.bar-track { background: #ecf0f1; border-radius: 4px; height: 12px; }
.bar-fill { height: 12px; border-radius: 4px; }
.badge { display: inline-block; background: #ecf0f1; border-radius: 12px; padding: 2px 10px; margin: 2px; }
.taxonomy-item { margin: 2px 0; }
.similar { display: flex; flex-wrap: wrap; gap: 8px; }
.similar-image { text-align: center; }
.similar-image img { width: 120px; height: 120px; object-fit: cover; border-radius: 4px; }
.chart img, .analysed img { max-width: 100%; }
pre.report { background: #f8f9fa; padding: 1rem; border-radius: 4px; white-space: pre-wrap; }
";

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
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

/// Renders display models as HTML fragments or standalone pages.
pub struct HtmlAdapter;

impl HtmlAdapter {
    pub fn fragment(display: &DisplayModel) -> String {
        match display {
            DisplayModel::Classification(d) => classification(d),
            DisplayModel::Identification(d) => identification(d),
            DisplayModel::Configuration(d) => configuration(d),
        }
    }

    /// Standalone document with embedded CSS.
    pub fn page(display: &DisplayModel, title: &str) -> String {
        let mut html = String::with_capacity(8192);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape(title)));
        html.push_str("<style>\n");
        html.push_str(STYLE);
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str(&Self::fragment(display));
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Page for a request that failed before anything could be rendered.
    pub fn error_page(message: &str) -> String {
        let mut html = String::with_capacity(1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Error</title>\n<style>\n");
        html.push_str(STYLE);
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str(&format!(
            "<div class=\"alert\"><strong>Error:</strong> {}</div>\n",
            escape(message)
        ));
        html.push_str("</body>\n</html>\n");
        html
    }
}

fn badge(badge: &Badge) -> String {
    format!(
        "<div class=\"metric\"><div class=\"metric-label\">{}</div>\
         <div class=\"metric-value\" style=\"color: {};\">{}</div></div>\n",
        escape(badge.label),
        badge.color,
        escape(&badge.value)
    )
}

/// `data:` URI for a chart, or `None` when the payload is not a base64 PNG.
fn chart_src(png_base64: &str) -> Option<String> {
    let bytes = STANDARD.decode(png_base64.trim()).ok()?;
    match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Png) => Some(format!("data:image/png;base64,{}", png_base64.trim())),
        _ => None,
    }
}

fn classification(d: &ClassificationDisplay) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str(&format!(
        "<div class=\"result-main\" style=\"background-color: {}; border-color: {};\">\n",
        d.class_color.tint(),
        d.class_color
    ));
    html.push_str(&format!(
        "<h1 style=\"color: {};\">{}</h1>\n",
        d.class_color,
        escape(&d.predicted_class)
    ));
    html.push_str(&format!(
        "<p>Confidence: {}</p>\n</div>\n",
        escape(&d.confidence_text)
    ));
    if let Some(warning) = &d.ood_warning {
        html.push_str(&format!("<div class=\"alert\">{}</div>\n", escape(warning)));
    }

    if let Some(url) = &d.image_url {
        html.push_str(&format!(
            "<div class=\"analysed\"><img src=\"{}\" alt=\"Analysed image\"></div>\n",
            escape(url)
        ));
    }

    html.push_str("<div class=\"metrics\">\n");
    html.push_str(&badge(&d.confidence_badge));
    html.push_str(&badge(&d.entropy_badge));
    html.push_str(&badge(&d.validation_badge));
    html.push_str("</div>\n");

    html.push_str("<h2>Class probabilities</h2>\n");
    for bar in &d.probability_bars {
        html.push_str(&format!(
            "<div class=\"bar\"><div class=\"bar-header\"><span>{}</span><span>{}</span></div>\
             <div class=\"bar-track\"><div class=\"bar-fill\" style=\"width: {:.2}%; background-color: {};\"></div></div></div>\n",
            escape(&bar.label),
            escape(&bar.percent_text),
            bar.width,
            bar.color
        ));
    }

    for chart in &d.charts {
        match chart_src(&chart.png_base64) {
            Some(src) => html.push_str(&format!(
                "<div class=\"chart\"><h2>{}</h2><img src=\"{}\" alt=\"{}\"></div>\n",
                escape(chart.title),
                src,
                chart.kind.name()
            )),
            None => tracing::warn!("chart {} is not a base64 PNG, skipping", chart.kind.name()),
        }
    }

    html.push_str("<h2>Recommendation</h2>\n");
    html.push_str(&format!("<p>{}</p>\n", escape(&d.recommendation_text)));
    html.push_str(&format!(
        "<pre class=\"report\">{}</pre>\n",
        escape(&d.report)
    ));
    html
}

fn badges(items: &Listing<String>) -> String {
    match items {
        Listing::Items(names) => names
            .iter()
            .map(|n| format!("<span class=\"badge\">{}</span>", escape(n)))
            .collect(),
        Listing::Unavailable(placeholder) => {
            format!("<span class=\"badge\">{}</span>", escape(placeholder))
        }
    }
}

fn identification(d: &IdentificationDisplay) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str(&format!("<h1><em>{}</em></h1>\n", escape(&d.scientific_name)));
    html.push_str(&format!("<div>{}</div>\n", badges(&d.common_names)));

    html.push_str(&format!(
        "<div class=\"bar\"><div class=\"bar-header\"><span>Probability</span><span>{}</span></div>\
         <div class=\"bar-track\"><div class=\"bar-fill\" style=\"width: {:.2}%; background-color: {};\"></div></div></div>\n",
        escape(&d.probability_text),
        d.probability_width,
        d.probability_color
    ));

    html.push_str(&format!("<p>{}</p>\n", escape(&d.description)));
    if let Some(url) = d.reference_url.as_deref().filter(|url| is_web_url(url)) {
        html.push_str(&format!(
            "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\">More information</a></p>\n",
            escape(url)
        ));
    }

    html.push_str("<h2>Taxonomy</h2>\n");
    match &d.taxonomy {
        Listing::Items(entries) => {
            for entry in entries {
                html.push_str(&format!(
                    "<div class=\"taxonomy-item\"><strong>{}:</strong> <span>{}</span></div>\n",
                    escape(&entry.rank_label),
                    escape(&entry.value)
                ));
            }
        }
        Listing::Unavailable(placeholder) => {
            html.push_str(&format!("<p>{}</p>\n", escape(placeholder)));
        }
    }

    html.push_str("<h2>Similar images</h2>\n");
    match &d.similar_images {
        Listing::Items(thumbs) => {
            html.push_str("<div class=\"similar\">\n");
            for thumb in thumbs {
                html.push_str(&format!(
                    "<div class=\"similar-image\"><img src=\"{}\" alt=\"Similar image\" loading=\"lazy\">\
                     <div class=\"similarity\">{}</div></div>\n",
                    escape(&thumb.src),
                    escape(&thumb.similarity_text)
                ));
            }
            html.push_str("</div>\n");
        }
        Listing::Unavailable(placeholder) => {
            html.push_str(&format!("<p>{}</p>\n", escape(placeholder)));
        }
    }

    html.push_str("<h2>Synonyms</h2>\n");
    html.push_str(&format!("<div>{}</div>\n", badges(&d.synonyms)));
    html
}

fn configuration(d: &ConfigurationDisplay) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(&format!("<h1>{}</h1>\n", escape(&d.message)));
    html.push_str(&format!(
        "<p>Plant type: <strong>{}</strong></p>\n",
        escape(&d.plant_type)
    ));
    html.push_str("<ul>\n");
    for class in &d.classes {
        html.push_str(&format!(
            "<li><span style=\"color: {};\">&#9632;</span> {}</li>\n",
            class.color,
            escape(&class.label)
        ));
    }
    html.push_str("</ul>\n");
    html
}

/// Only plain web links become anchors; `javascript:` and friends are dropped.
fn is_web_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;
    use crate::render::{SimilarThumb, TaxonomyEntry};

    // PNG signature only; enough for format sniffing
    const PIXEL: &str = "iVBORw0KGgo=";

    fn identification_display() -> IdentificationDisplay {
        IdentificationDisplay {
            scientific_name: "Rosa <canina>".into(),
            common_names: Listing::Unavailable(crate::render::UNAVAILABLE),
            probability_text: "91.00%".into(),
            probability_width: 91.0,
            probability_color: Color::green(),
            description: "Dog rose & friends".into(),
            reference_url: None,
            taxonomy: Listing::Items(vec![TaxonomyEntry {
                rank_label: "Genus".into(),
                value: "Rosa".into(),
            }]),
            similar_images: Listing::Items(vec![SimilarThumb {
                src: "https://img/x.jpg?a=1&b=2".into(),
                similarity_text: "80%".into(),
            }]),
            synonyms: Listing::Unavailable(crate::render::NO_SYNONYMS),
        }
    }

    #[test]
    fn escapes_backend_text() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        let html = HtmlAdapter::fragment(&DisplayModel::Identification(identification_display()));
        assert!(html.contains("Rosa &lt;canina&gt;"));
        assert!(html.contains("Dog rose &amp; friends"));
        assert!(html.contains("x.jpg?a=1&amp;b=2"));
    }

    #[test]
    fn placeholders_and_missing_link() {
        let html = HtmlAdapter::fragment(&DisplayModel::Identification(identification_display()));
        assert!(html.contains(crate::render::UNAVAILABLE));
        assert!(html.contains(crate::render::NO_SYNONYMS));
        assert!(!html.contains("More information"));
    }

    #[rstest::rstest]
    #[case("https://en.wikipedia.org/wiki/Rosa_canina", true)]
    #[case("HTTP://example.org/rosa", true)]
    #[case("javascript:alert(1)", false)]
    #[case(" JavaScript:alert(1)", false)]
    #[case("data:text/html,<b>x</b>", false)]
    fn reference_link_only_for_web_urls(#[case] url: &str, #[case] linked: bool) {
        let display = IdentificationDisplay {
            reference_url: Some(url.into()),
            ..identification_display()
        };
        let html = HtmlAdapter::fragment(&DisplayModel::Identification(display));
        assert_eq!(html.contains("More information"), linked);
        assert!(!html.to_ascii_lowercase().contains("href=\"javascript:"));
    }

    #[test]
    fn chart_src_accepts_png_only() {
        assert!(chart_src(PIXEL).unwrap().starts_with("data:image/png;base64,"));
        assert!(chart_src("not base64!").is_none());
        // valid base64, not a PNG
        assert!(chart_src("aGVsbG8=").is_none());
    }

    #[test]
    fn page_wraps_fragment() {
        let page = HtmlAdapter::page(
            &DisplayModel::Identification(identification_display()),
            "Identification",
        );
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Identification</title>"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn error_page_escapes_message() {
        let page = HtmlAdapter::error_page("bad <input>");
        assert!(page.contains("bad &lt;input&gt;"));
    }
}
