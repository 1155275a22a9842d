//! Command execution: one request per invocation, rendered to HTML or JSON.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use plant_core::{
    ClientConfig, DisplayModel, HtmlAdapter, HttpBackend, Operation, Phase, Session,
};

pub mod settings;

pub struct Options {
    pub backend: Option<String>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

pub enum Request {
    Analyze(PathBuf),
    Identify(PathBuf),
    LoadModel { model: PathBuf, mapping: PathBuf },
    ShowConfig,
}

pub fn run(options: Options, request: Request) -> Result<ExitCode> {
    let config_path = settings::config_path(options.config.as_deref())?;
    let stored = ClientConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    let mut config = stored.clone();
    if let Some(url) = &options.backend {
        config.backend_url = url.clone();
        config.validate().context("invalid --backend")?;
    }

    let (file, operation) = match request {
        Request::ShowConfig => {
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(ExitCode::SUCCESS);
        }
        Request::Analyze(image) => (image, Operation::Analyze),
        Request::Identify(image) => (image, Operation::Identify),
        Request::LoadModel { model, mapping } => (model, Operation::LoadModel { mapping }),
    };

    let backend = HttpBackend::new(&config.backend_url, config.timeout())?;
    let mut session = Session::new(backend, config);
    session.select(file);
    if session.submit(&operation).is_none() {
        bail!("no file selected for submission");
    }

    match session.state().phase() {
        Phase::Showing { display, .. } => {
            emit(display, &options)?;
            if matches!(operation, Operation::LoadModel { .. }) {
                settings::persist_model(&config_path, &stored, session.config())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Phase::Failed { message, .. } => {
            eprintln!("plantview: {message}");
            if let Some(path) = &options.output
                && !options.json
            {
                write_output(path, &HtmlAdapter::error_page(message))?;
            }
            Ok(ExitCode::FAILURE)
        }
        other => bail!("request did not settle: {other:?}"),
    }
}

fn emit(display: &DisplayModel, options: &Options) -> Result<()> {
    let rendered = if options.json {
        serde_json::to_string_pretty(display)? + "\n"
    } else {
        HtmlAdapter::page(display, title(display))
    };
    match &options.output {
        Some(path) => {
            write_output(path, &rendered)?;
            println!("{}", summary(display));
        }
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

fn title(display: &DisplayModel) -> &'static str {
    match display {
        DisplayModel::Classification(_) => "Plant health analysis",
        DisplayModel::Identification(_) => "Plant identification",
        DisplayModel::Configuration(_) => "Model configuration",
    }
}

/// One line for the terminal when the full result went to a file.
fn summary(display: &DisplayModel) -> String {
    match display {
        DisplayModel::Classification(d) => {
            let mut line = format!(
                "{} ({}), recommendation: {}",
                d.predicted_class,
                d.confidence_text,
                d.recommendation.category()
            );
            if d.ood_warning.is_some() {
                line.push_str(" [out of distribution]");
            }
            line
        }
        DisplayModel::Identification(d) => {
            format!("{} ({})", d.scientific_name, d.probability_text)
        }
        DisplayModel::Configuration(d) => format!(
            "{} [{}]",
            d.message,
            d.classes
                .iter()
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_core::render::{ClassSwatch, ConfigurationDisplay};
    use plant_core::{ClassificationResult, ColorAnalysis, OutOfDistribution, ResultRenderer};
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn classification(is_ood: bool) -> DisplayModel {
        let result = ClassificationResult {
            predicted_class: "Saludable".into(),
            confidence: 0.912,
            class_probabilities: vec![0.912, 0.05, 0.038],
            out_of_distribution: OutOfDistribution {
                is_ood,
                confidence: 0.912,
                entropy: 0.3,
                predicted_index: Some(0),
            },
            color_analysis: ColorAnalysis {
                percent_green: 88.0,
                percent_yellow: 3.0,
            },
            charts: BTreeMap::new(),
            image_url: None,
        };
        DisplayModel::Classification(
            ResultRenderer::default()
                .render_classification(&result)
                .unwrap(),
        )
    }

    #[rstest]
    #[case(false, "Saludable (91.20%), recommendation: healthy")]
    #[case(true, "Saludable (91.20%), recommendation: healthy [out of distribution]")]
    fn classification_summary(#[case] is_ood: bool, #[case] expected: &str) {
        assert_eq!(summary(&classification(is_ood)), expected);
    }

    #[test]
    fn configuration_summary_lists_classes() {
        let display = DisplayModel::Configuration(ConfigurationDisplay {
            message: "Modelo cargado".into(),
            plant_type: "Tomate".into(),
            classes: vec![
                ClassSwatch {
                    label: "Sana".into(),
                    color: plant_core::Color::green(),
                },
                ClassSwatch {
                    label: "Tizón".into(),
                    color: plant_core::Color::amber(),
                },
            ],
        });
        assert_eq!(summary(&display), "Modelo cargado [Sana, Tizón]");
        assert_eq!(title(&display), "Model configuration");
    }

    #[test]
    fn show_config_uses_explicit_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let options = Options {
            backend: None,
            config: Some(dir.path().join("plantview.toml")),
            output: None,
            json: false,
        };
        run(options, Request::ShowConfig)?;
        assert!(!dir.path().join("plantview.toml").exists());
        Ok(())
    }

    #[test]
    fn bad_backend_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let options = Options {
            backend: Some("localhost:5000".into()),
            config: Some(dir.path().join("plantview.toml")),
            output: None,
            json: false,
        };
        assert!(run(options, Request::ShowConfig).is_err());
    }
}
