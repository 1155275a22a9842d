//! One result view: a backend, a renderer and the view state, driven together.

use std::path::{Path, PathBuf};

use crate::client::Backend;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::render::{DisplayModel, ResultRenderer};
use crate::upload::{ImageUpload, ModelUpload};
use crate::view_state::{Event, ViewState, update};

/// What to do with the selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    Identify,
    /// The selected file is the model; the mapping travels alongside it.
    LoadModel { mapping: PathBuf },
}

pub struct Session<B> {
    backend: B,
    config: ClientConfig,
    renderer: ResultRenderer,
    state: ViewState,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B, config: ClientConfig) -> Self {
        let renderer = config.renderer();
        Self {
            backend,
            config,
            renderer,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Current configuration, including labels adopted from a loaded model.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns false when the selection was ignored.
    pub fn select(&mut self, file: impl Into<PathBuf>) -> bool {
        self.dispatch(Event::Select(file.into()))
    }

    pub fn reset(&mut self) -> bool {
        self.dispatch(Event::Reset)
    }

    fn dispatch(&mut self, event: Event) -> bool {
        let next = update(&self.state, event);
        let accepted = next.version() != self.state.version();
        self.state = next;
        accepted
    }

    /// Send the selected file and settle the view with the outcome.
    ///
    /// Returns `None` when the submission was inert (nothing selected, or a
    /// request already in flight).
    pub fn submit(&mut self, operation: &Operation) -> Option<&ViewState> {
        if !self.dispatch(Event::Submit) {
            tracing::debug!("submission ignored in state v{}", self.state.version());
            return None;
        }
        let ticket = self.state.ticket()?;
        let file = self.state.file()?.clone();

        let outcome = self.run(operation, &file).map_err(|err| {
            match &err {
                ClientError::Transport(cause) => tracing::warn!("transport failure: {cause}"),
                ClientError::Domain(msg) => tracing::info!("backend rejected request: {msg}"),
                other => tracing::warn!("request failed: {other}"),
            }
            err.user_message()
        });
        self.dispatch(Event::Settle { ticket, outcome });
        Some(&self.state)
    }

    fn run(&mut self, operation: &Operation, file: &Path) -> Result<DisplayModel, ClientError> {
        match operation {
            Operation::Analyze => {
                let image = ImageUpload::from_path(file)?;
                let result = self.backend.analyze_image(&image)?;
                Ok(DisplayModel::Classification(
                    self.renderer.render_classification(&result)?,
                ))
            }
            Operation::Identify => {
                let image = ImageUpload::from_path(file)?;
                let result = self.backend.identify_plant(&image)?;
                Ok(DisplayModel::Identification(
                    self.renderer.render_identification(&result)?,
                ))
            }
            Operation::LoadModel { mapping } => {
                let upload = ModelUpload::from_paths(file, mapping)?;
                let result = self.backend.load_model(&upload)?;
                let mut config = self.config.clone();
                config.apply_model(&result);
                let renderer = config.renderer();
                let display = renderer.render_configuration(&result)?;
                // Nothing is adopted unless the result rendered.
                self.config = config;
                self.renderer = renderer;
                tracing::info!(
                    "model loaded for {} with {} classes",
                    result.plant_type,
                    result.classes.len()
                );
                Ok(DisplayModel::Configuration(display))
            }
        }
    }
}
