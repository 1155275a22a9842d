//! Result value objects decoded from backend payloads.
//!
//! The backend speaks Spanish on the wire (`clase`, `confianza`, ...). The
//! `*Wire` structs mirror that shape with every field optional so that a
//! missing required field is reported by name instead of as a serde error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MalformedResultError;

/// Logical chart names embedded in an analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    HistogramRgb,
    Predictions,
    HsvAnalysis,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::HistogramRgb,
        ChartKind::Predictions,
        ChartKind::HsvAnalysis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::HistogramRgb => "histogram_rgb",
            ChartKind::Predictions => "predictions",
            ChartKind::HsvAnalysis => "hsv_analysis",
        }
    }

    /// Key used by the backend inside `graficos`.
    pub fn wire_key(self) -> &'static str {
        match self {
            ChartKind::HistogramRgb => "histograma_rgb",
            ChartKind::Predictions => "predicciones",
            ChartKind::HsvAnalysis => "analisis_hsv",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::HistogramRgb => "RGB histogram",
            ChartKind::Predictions => "Prediction distribution",
            ChartKind::HsvAnalysis => "HSV channel analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfDistribution {
    pub is_ood: bool,
    pub confidence: f64,
    pub entropy: f64,
    /// Argmax class index the OOD check was computed on.
    pub predicted_index: Option<usize>,
}

/// Share of green and yellow pixels; the two are independent and need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorAnalysis {
    pub percent_green: f64,
    pub percent_yellow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub predicted_class: String,
    pub confidence: f64,
    pub class_probabilities: Vec<f64>,
    pub out_of_distribution: OutOfDistribution,
    pub color_analysis: ColorAnalysis,
    /// Base64 PNG per chart.
    pub charts: BTreeMap<ChartKind, String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonRank {
    pub rank: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarImage {
    pub url: String,
    pub small_url: Option<String>,
    pub similarity: f64,
}

impl SimilarImage {
    /// Thumbnail source: the small variant when the backend provides one.
    pub fn thumbnail_url(&self) -> &str {
        self.small_url.as_deref().unwrap_or(&self.url)
    }
}

/// Species identification. The optional lists stay `None` when the backend
/// omitted them so the renderer can tell "absent" from "present".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentificationResult {
    pub scientific_name: String,
    pub common_names: Option<Vec<String>>,
    /// Percentage in [0, 100].
    pub probability: f64,
    pub description: String,
    pub reference_url: Option<String>,
    pub taxonomy: Option<Vec<TaxonRank>>,
    pub similar_images: Option<Vec<SimilarImage>>,
    pub synonyms: Option<Vec<String>>,
}

/// Outcome of uploading a model and its class mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfiguration {
    pub message: String,
    pub plant_type: String,
    pub classes: Vec<String>,
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, MalformedResultError> {
    value.ok_or(MalformedResultError::missing(field))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OodWire {
    clase: Option<usize>,
    confianza: Option<f64>,
    entropia: Option<f64>,
    es_ood: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ColorWire {
    porcentaje_verde: Option<f64>,
    porcentaje_amarillo: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnalysisWire {
    clase: Option<String>,
    confianza: Option<f64>,
    predicciones: Option<Vec<f64>>,
    ood: Option<OodWire>,
    analisis_color: Option<ColorWire>,
    #[serde(default)]
    graficos: BTreeMap<String, String>,
    imagen_url: Option<String>,
}

impl TryFrom<AnalysisWire> for ClassificationResult {
    type Error = MalformedResultError;

    fn try_from(wire: AnalysisWire) -> Result<Self, Self::Error> {
        let predicted_class = require(wire.clase, "clase")?;
        let confidence = require(wire.confianza, "confianza")?;
        let class_probabilities = require(wire.predicciones, "predicciones")?;

        let ood = require(wire.ood, "ood")?;
        let out_of_distribution = OutOfDistribution {
            is_ood: require(ood.es_ood, "ood.es_ood")?,
            confidence: require(ood.confianza, "ood.confianza")?,
            entropy: require(ood.entropia, "ood.entropia")?,
            predicted_index: ood.clase,
        };

        let color = require(wire.analisis_color, "analisis_color")?;
        let color_analysis = ColorAnalysis {
            percent_green: require(color.porcentaje_verde, "analisis_color.porcentaje_verde")?,
            percent_yellow: require(
                color.porcentaje_amarillo,
                "analisis_color.porcentaje_amarillo",
            )?,
        };

        let mut graficos = wire.graficos;
        let charts = ChartKind::ALL
            .into_iter()
            .filter_map(|kind| graficos.remove(kind.wire_key()).map(|data| (kind, data)))
            .collect();
        if !graficos.is_empty() {
            tracing::debug!(
                "ignoring unknown charts: {:?}",
                graficos.keys().collect::<Vec<_>>()
            );
        }

        Ok(Self {
            predicted_class,
            confidence,
            class_probabilities,
            out_of_distribution,
            color_analysis,
            charts,
            image_url: wire.imagen_url,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SimilarImageWire {
    url: Option<String>,
    url_small: Option<String>,
    similarity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdentificationWire {
    scientific_name: Option<String>,
    common_names: Option<Vec<String>>,
    probability: Option<f64>,
    description: Option<String>,
    url: Option<String>,
    taxonomy: Option<serde_json::Map<String, serde_json::Value>>,
    similar_images: Option<Vec<SimilarImageWire>>,
    synonyms: Option<Vec<String>>,
}

impl TryFrom<IdentificationWire> for IdentificationResult {
    type Error = MalformedResultError;

    fn try_from(wire: IdentificationWire) -> Result<Self, Self::Error> {
        let scientific_name = require(wire.scientific_name, "scientific_name")?;
        let probability = require(wire.probability, "probability")?;

        let taxonomy = wire.taxonomy.map(|ranks| {
            ranks
                .into_iter()
                .map(|(rank, value)| TaxonRank {
                    rank,
                    value: match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    },
                })
                .collect()
        });

        let similar_images = wire
            .similar_images
            .map(|images| {
                images
                    .into_iter()
                    .map(|img| {
                        let url = match (img.url, &img.url_small) {
                            (Some(url), _) => url,
                            (None, Some(small)) => small.clone(),
                            (None, None) => {
                                return Err(MalformedResultError::missing("similar_images.url"));
                            }
                        };
                        Ok(SimilarImage {
                            url,
                            small_url: img.url_small,
                            similarity: require(img.similarity, "similar_images.similarity")?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            scientific_name,
            common_names: wire.common_names,
            probability,
            description: wire.description.unwrap_or_default(),
            reference_url: wire.url.filter(|u| !u.trim().is_empty()),
            taxonomy,
            similar_images,
            synonyms: wire.synonyms,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigurationWire {
    mensaje: Option<String>,
    tipo_planta: Option<String>,
    clases: Option<Vec<String>>,
}

impl TryFrom<ConfigurationWire> for ModelConfiguration {
    type Error = MalformedResultError;

    fn try_from(wire: ConfigurationWire) -> Result<Self, Self::Error> {
        let plant_type = require(wire.tipo_planta, "tipo_planta")?;
        let classes = require(wire.clases, "clases")?;
        if classes.iter().any(|label| label.trim().is_empty()) {
            return Err(MalformedResultError::missing("clases"));
        }
        let message = wire
            .mensaje
            .unwrap_or_else(|| format!("Model and configuration loaded: {plant_type}"));
        Ok(Self {
            message,
            plant_type,
            classes,
        })
    }
}
