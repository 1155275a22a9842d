//! Pure mapping from decoded results to display models.
//!
//! Nothing here touches I/O or a UI surface. A [`DisplayModel`] carries every
//! color, label and formatted string a surface needs, so an adapter such as
//! [`crate::html`] only lays it out.

use serde::Serialize;

use crate::error::MalformedResultError;
use crate::model::{
    ChartKind, ClassificationResult, ColorAnalysis, IdentificationResult, ModelConfiguration,
};
use crate::palette::{ClassPalette, Color};

/// Model confidence at or above this is shown green.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;
/// Entropy at or below this is shown green.
pub const ENTROPY_THRESHOLD: f64 = 1.0;
/// Identification probability tiers (percent).
pub const PROBABILITY_HIGH: f64 = 80.0;
pub const PROBABILITY_MEDIUM: f64 = 50.0;

pub const UNAVAILABLE: &str = "Not available";
pub const NO_SIMILAR_IMAGES: &str = "No similar images available";
pub const NO_SYNONYMS: &str = "No synonyms available";

/// Care recommendation derived from the color analysis alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Healthy,
    Stressed,
    Mixed,
    Normal,
}

impl Recommendation {
    /// First matching rule wins: green > 80, yellow > 30, green < 50 and yellow < 20.
    pub fn from_colors(colors: &ColorAnalysis) -> Self {
        let green = colors.percent_green;
        let yellow = colors.percent_yellow;
        if green > 80.0 {
            Recommendation::Healthy
        } else if yellow > 30.0 {
            Recommendation::Stressed
        } else if green < 50.0 && yellow < 20.0 {
            Recommendation::Mixed
        } else {
            Recommendation::Normal
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Recommendation::Healthy => "healthy",
            Recommendation::Stressed => "stressed",
            Recommendation::Mixed => "mixed/inconclusive",
            Recommendation::Normal => "normal",
        }
    }

    pub fn message(self, plant_type: &str) -> String {
        let subject = plant_type.to_lowercase();
        match self {
            Recommendation::Healthy => format!(
                "The {subject} shows good levels of green and appears healthy. \
                 Continue with the current care routine."
            ),
            Recommendation::Stressed => format!(
                "The {subject} shows signs of stress with significant yellow areas. \
                 Check watering, light exposure and possible pests."
            ),
            Recommendation::Mixed => format!(
                "The {subject} shows mixed results. It may be in transition or need \
                 adjustments to its care. Monitor it closely."
            ),
            Recommendation::Normal => format!(
                "The {subject} shows results within the normal range. Continue with the \
                 usual care routine and watch for changes."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub value: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityBar {
    pub label: String,
    pub percent_text: String,
    /// Bar width in percent, clamped to [0, 100].
    pub width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorMetrics {
    pub green_text: String,
    pub yellow_text: String,
    pub green_yellow_ratio_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub kind: ChartKind,
    pub title: &'static str,
    pub png_base64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDisplay {
    pub plant_type: String,
    pub predicted_class: String,
    pub class_color: Color,
    pub confidence_text: String,
    pub ood_warning: Option<String>,
    pub confidence_badge: Badge,
    pub entropy_badge: Badge,
    pub validation_badge: Badge,
    pub probability_bars: Vec<ProbabilityBar>,
    pub color_metrics: ColorMetrics,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
    pub charts: Vec<ChartPanel>,
    pub image_url: Option<String>,
    /// Plain-text summary of everything above.
    pub report: String,
}

/// A list that is either shown or replaced by an explicit placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing<T> {
    Items(Vec<T>),
    Unavailable(&'static str),
}

impl<T> Listing<T> {
    /// Absent and empty both render the placeholder.
    fn from_optional(items: Option<Vec<T>>, placeholder: &'static str) -> Self {
        match items {
            Some(items) if !items.is_empty() => Listing::Items(items),
            _ => Listing::Unavailable(placeholder),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Listing::Unavailable(_))
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Items(items) => items,
            Listing::Unavailable(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyEntry {
    pub rank_label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarThumb {
    pub src: String,
    pub similarity_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentificationDisplay {
    pub scientific_name: String,
    pub common_names: Listing<String>,
    pub probability_text: String,
    pub probability_width: f64,
    pub probability_color: Color,
    pub description: String,
    pub reference_url: Option<String>,
    pub taxonomy: Listing<TaxonomyEntry>,
    pub similar_images: Listing<SimilarThumb>,
    pub synonyms: Listing<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSwatch {
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationDisplay {
    pub message: String,
    pub plant_type: String,
    pub classes: Vec<ClassSwatch>,
}

/// Renderer output for any of the three operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayModel {
    Classification(ClassificationDisplay),
    Identification(IdentificationDisplay),
    Configuration(ConfigurationDisplay),
}

/// Format a [0, 1] fraction as a percentage with two decimals.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Read back the number from a `"87.34%"` style text.
pub fn parse_percent(text: &str) -> Option<f64> {
    text.trim().strip_suffix('%')?.trim().parse().ok()
}

pub fn probability_color(probability: f64) -> Color {
    if probability >= PROBABILITY_HIGH {
        Color::green()
    } else if probability >= PROBABILITY_MEDIUM {
        Color::amber()
    } else {
        Color::red()
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn required_text(value: &str, field: &'static str) -> Result<String, MalformedResultError> {
    if value.trim().is_empty() {
        Err(MalformedResultError::missing(field))
    } else {
        Ok(value.to_string())
    }
}

/// Maps results to display models using a palette and plant type fixed at construction.
#[derive(Debug, Clone)]
pub struct ResultRenderer {
    palette: ClassPalette,
    plant_type: String,
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new(ClassPalette::default(), "Plant")
    }
}

impl ResultRenderer {
    pub fn new(palette: ClassPalette, plant_type: impl Into<String>) -> Self {
        Self {
            palette,
            plant_type: plant_type.into(),
        }
    }

    pub fn palette(&self) -> &ClassPalette {
        &self.palette
    }

    pub fn plant_type(&self) -> &str {
        &self.plant_type
    }

    pub fn render_classification(
        &self,
        result: &ClassificationResult,
    ) -> Result<ClassificationDisplay, MalformedResultError> {
        let predicted_class = required_text(&result.predicted_class, "clase")?;
        if !self.palette.contains(&predicted_class) {
            tracing::warn!("predicted class `{predicted_class}` has no configured color");
        }
        let class_color = self.palette.color_for(&predicted_class).clone();
        let ood = &result.out_of_distribution;

        let confidence_badge = Badge {
            label: "Model confidence",
            value: format_percent(ood.confidence),
            color: if ood.confidence >= CONFIDENCE_THRESHOLD {
                Color::green()
            } else {
                Color::red()
            },
        };
        let entropy_badge = Badge {
            label: "Entropy (uncertainty)",
            value: format!("{:.3}", ood.entropy),
            color: if ood.entropy <= ENTROPY_THRESHOLD {
                Color::green()
            } else {
                Color::red()
            },
        };
        let validation_badge = if ood.is_ood {
            Badge {
                label: "Validation status",
                value: "Out of distribution".to_string(),
                color: Color::amber(),
            }
        } else {
            Badge {
                label: "Validation status",
                value: "Valid".to_string(),
                color: Color::green(),
            }
        };
        let ood_warning = ood.is_ood.then(|| {
            format!(
                "Warning: this image may not be recognisable as {}",
                self.plant_type.to_lowercase()
            )
        });

        let probability_bars = result
            .class_probabilities
            .iter()
            .enumerate()
            .map(|(idx, &p)| {
                let label = self
                    .palette
                    .labels()
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| format!("class_{idx}"));
                let color = self.palette.color_for(&label).clone();
                ProbabilityBar {
                    percent_text: format_percent(p),
                    width: (p * 100.0).clamp(0.0, 100.0),
                    color,
                    label,
                }
            })
            .collect();

        let colors = &result.color_analysis;
        let color_metrics = ColorMetrics {
            green_text: format!("{:.2}%", colors.percent_green),
            yellow_text: format!("{:.2}%", colors.percent_yellow),
            green_yellow_ratio_text: format!(
                "{:.2}",
                colors.percent_green / colors.percent_yellow.max(0.1)
            ),
        };

        let recommendation = Recommendation::from_colors(colors);
        let recommendation_text = recommendation.message(&self.plant_type);

        let charts = result
            .charts
            .iter()
            .map(|(&kind, data)| ChartPanel {
                kind,
                title: kind.title(),
                png_base64: data.clone(),
            })
            .collect();

        let mut display = ClassificationDisplay {
            plant_type: self.plant_type.clone(),
            predicted_class,
            class_color,
            confidence_text: format_percent(result.confidence),
            ood_warning,
            confidence_badge,
            entropy_badge,
            validation_badge,
            probability_bars,
            color_metrics,
            recommendation,
            recommendation_text,
            charts,
            image_url: result.image_url.clone(),
            report: String::new(),
        };
        display.report = classification_report(&display);
        Ok(display)
    }

    pub fn render_identification(
        &self,
        result: &IdentificationResult,
    ) -> Result<IdentificationDisplay, MalformedResultError> {
        let scientific_name = required_text(&result.scientific_name, "scientific_name")?;
        let probability = result.probability;

        let taxonomy = result.taxonomy.as_ref().map(|ranks| {
            ranks
                .iter()
                .map(|t| TaxonomyEntry {
                    rank_label: capitalize_first(&t.rank),
                    value: t.value.clone(),
                })
                .collect()
        });
        let similar_images = result.similar_images.as_ref().map(|images| {
            images
                .iter()
                .map(|img| SimilarThumb {
                    src: img.thumbnail_url().to_string(),
                    similarity_text: format!("{}%", (img.similarity * 100.0).round() as i64),
                })
                .collect()
        });

        Ok(IdentificationDisplay {
            scientific_name,
            common_names: Listing::from_optional(result.common_names.clone(), UNAVAILABLE),
            probability_text: format!("{probability:.2}%"),
            probability_width: probability.clamp(0.0, 100.0),
            probability_color: probability_color(probability),
            description: result.description.clone(),
            reference_url: result.reference_url.clone(),
            taxonomy: Listing::from_optional(taxonomy, UNAVAILABLE),
            similar_images: Listing::from_optional(similar_images, NO_SIMILAR_IMAGES),
            synonyms: Listing::from_optional(result.synonyms.clone(), NO_SYNONYMS),
        })
    }

    pub fn render_configuration(
        &self,
        result: &ModelConfiguration,
    ) -> Result<ConfigurationDisplay, MalformedResultError> {
        let plant_type = required_text(&result.plant_type, "tipo_planta")?;
        let classes = result
            .classes
            .iter()
            .map(|label| ClassSwatch {
                label: label.clone(),
                color: self.palette.color_for(label).clone(),
            })
            .collect();
        Ok(ConfigurationDisplay {
            message: result.message.clone(),
            plant_type,
            classes,
        })
    }
}

fn classification_report(display: &ClassificationDisplay) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!(
        "DETAILED ANALYSIS OF {}:\n\n",
        display.plant_type.to_uppercase()
    ));

    out.push_str("Image validation:\n");
    out.push_str(&format!(
        "- Model confidence: {}\n",
        display.confidence_badge.value
    ));
    out.push_str(&format!(
        "- Entropy (uncertainty): {}\n",
        display.entropy_badge.value
    ));
    let status = if display.ood_warning.is_some() {
        "OUT OF DISTRIBUTION"
    } else {
        "Valid image"
    };
    out.push_str(&format!("- Status: {status}\n\n"));

    out.push_str("Color metrics:\n");
    out.push_str(&format!(
        "- Green (healthy) area: {}\n",
        display.color_metrics.green_text
    ));
    out.push_str(&format!(
        "- Yellow/brown (stressed) area: {}\n",
        display.color_metrics.yellow_text
    ));
    out.push_str(&format!(
        "- Green/yellow ratio: {}\n\n",
        display.color_metrics.green_yellow_ratio_text
    ));

    out.push_str("Model classification:\n");
    out.push_str(&format!("- Predicted class: {}\n", display.predicted_class));
    out.push_str(&format!("- Confidence: {}\n\n", display.confidence_text));

    out.push_str("RECOMMENDATION:\n");
    out.push_str(&display.recommendation_text);
    out.push('\n');

    if display.ood_warning.is_some() {
        out.push_str("\nWARNING: this image may not be reliable. Review it manually.\n");
    }
    out
}
