//! Client-side checks on files before they are sent to the backend.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ClientError;

/// Keys the class-mapping JSON must define.
pub const MAPPING_KEYS: [&str; 3] = ["mapeo_clases", "nombres_display", "tipo_planta"];

/// An image read into memory and confirmed to be an image by its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// A model file plus its class mapping, both checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelUpload {
    pub model_path: PathBuf,
    pub mapping_file_name: String,
    pub mapping_bytes: Vec<u8>,
    /// `tipo_planta` from the mapping; sent again as a form field.
    pub plant_type: String,
    pub display_names: Vec<String>,
}

fn read(path: &Path) -> Result<Vec<u8>, ClientError> {
    fs::read(path).map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|e| e.to_ascii_lowercase())
}

impl ImageUpload {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let format = image::guess_format(&bytes).map_err(|_| {
            ClientError::InvalidUpload(format!("{file_name} is not a recognised image file"))
        })?;
        Ok(Self {
            file_name,
            mime: format.to_mime_type(),
            bytes,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = read(path)?;
        Self::from_bytes(file_name(path), bytes)
    }
}

impl ModelUpload {
    /// Check the model extension (`h5`/`keras`), then load and check the mapping JSON.
    pub fn from_paths(model_path: &Path, mapping_path: &Path) -> Result<Self, ClientError> {
        match extension(model_path).as_deref() {
            Some("h5") | Some("keras") => {}
            _ => {
                return Err(ClientError::InvalidUpload(
                    "model file must have a .h5 or .keras extension".to_string(),
                ));
            }
        }
        if !model_path.is_file() {
            return Err(ClientError::Io {
                path: model_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        if extension(mapping_path).as_deref() != Some("json") {
            return Err(ClientError::InvalidUpload(
                "mapping file must have a .json extension".to_string(),
            ));
        }

        let mapping_bytes = read(mapping_path)?;
        let (plant_type, display_names) = check_mapping(&mapping_bytes)?;
        Ok(Self {
            model_path: model_path.to_path_buf(),
            mapping_file_name: file_name(mapping_path),
            mapping_bytes,
            plant_type,
            display_names,
        })
    }
}

/// Returns `(tipo_planta, nombres_display)` from a valid mapping.
pub fn check_mapping(bytes: &[u8]) -> Result<(String, Vec<String>), ClientError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ClientError::InvalidUpload(format!("mapping file is not valid JSON: {e}")))?;
    for key in MAPPING_KEYS {
        if value.get(key).is_none() {
            return Err(ClientError::InvalidUpload(format!(
                "mapping JSON must contain \"{key}\""
            )));
        }
    }
    let plant_type = value["tipo_planta"]
        .as_str()
        .ok_or_else(|| ClientError::InvalidUpload("\"tipo_planta\" must be a string".into()))?
        .to_string();
    let display_names = value["nombres_display"]
        .as_array()
        .and_then(|names| {
            names
                .iter()
                .map(|n| n.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| {
            ClientError::InvalidUpload("\"nombres_display\" must be a list of strings".into())
        })?;
    Ok((plant_type, display_names))
}
