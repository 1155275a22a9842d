//! Backend boundary: one best-effort multipart request per operation.

use std::time::Duration;

use reqwest::blocking::{Client, Response, multipart};

use crate::envelope;
use crate::error::ClientError;
use crate::model::{ClassificationResult, IdentificationResult, ModelConfiguration};
use crate::upload::{ImageUpload, ModelUpload};

pub const ANALYZE_PATH: &str = "/analizar_imagen";
pub const LOAD_MODEL_PATH: &str = "/cargar_modelo";
pub const IDENTIFY_PATH: &str = "/identificar_planta";

/// The three backend operations.
pub trait Backend {
    fn analyze_image(&self, image: &ImageUpload) -> Result<ClassificationResult, ClientError>;
    fn identify_plant(&self, image: &ImageUpload) -> Result<IdentificationResult, ClientError>;
    fn load_model(&self, upload: &ModelUpload) -> Result<ModelConfiguration, ClientError>;
}

/// Blocking HTTP implementation. No retries; the timeout bounds each request.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plant_core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn image_form(image: &ImageUpload) -> Result<multipart::Form, ClientError> {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime)?;
        Ok(multipart::Form::new().part("imagen", part))
    }

    fn post(&self, path: &str, form: multipart::Form) -> Result<String, ClientError> {
        let url = self.endpoint(path);
        tracing::info!("POST {url}");
        let response = self.client.post(&url).multipart(form).send()?;
        read_json_body(response)
    }
}

/// Body of a response that claims to be JSON; anything else is a transport failure.
fn read_json_body(response: Response) -> Result<String, ClientError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    tracing::debug!("response status {status}, json: {is_json}");
    if !is_json {
        return Err(ClientError::Transport(format!(
            "response is not JSON (HTTP {status})"
        )));
    }
    Ok(response.text()?)
}

impl Backend for HttpBackend {
    fn analyze_image(&self, image: &ImageUpload) -> Result<ClassificationResult, ClientError> {
        let body = self.post(ANALYZE_PATH, Self::image_form(image)?)?;
        envelope::classification(&body)
    }

    fn identify_plant(&self, image: &ImageUpload) -> Result<IdentificationResult, ClientError> {
        let body = self.post(IDENTIFY_PATH, Self::image_form(image)?)?;
        envelope::identification(&body)
    }

    fn load_model(&self, upload: &ModelUpload) -> Result<ModelConfiguration, ClientError> {
        let mapping = multipart::Part::bytes(upload.mapping_bytes.clone())
            .file_name(upload.mapping_file_name.clone())
            .mime_str("application/json")?;
        let form = multipart::Form::new()
            .file("modelo", &upload.model_path)
            .map_err(|source| ClientError::Io {
                path: upload.model_path.clone(),
                source,
            })?
            .part("mapeo", mapping)
            .text("tipo_planta", upload.plant_type.clone());
        let body = self.post(LOAD_MODEL_PATH, form)?;
        envelope::configuration(&body)
    }
}
