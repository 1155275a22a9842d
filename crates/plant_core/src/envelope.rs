//! Decoding of the `{ success, error?, ...payload }` envelope every endpoint returns.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, MalformedResultError, UNKNOWN_BACKEND_ERROR};
use crate::model::{
    AnalysisWire, ClassificationResult, ConfigurationWire, IdentificationResult,
    IdentificationWire, ModelConfiguration,
};

/// Split a response body into its payload, or the error the backend reported.
///
/// A body that is not a JSON object is a transport problem, not a domain one.
pub fn open(body: &str) -> Result<serde_json::Map<String, Value>, ClientError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ClientError::Transport(format!("response is not JSON: {e}")))?;
    let Value::Object(mut fields) = value else {
        return Err(ClientError::Transport(
            "response is not a JSON object".to_string(),
        ));
    };

    let success = match fields.remove("success") {
        Some(Value::Bool(flag)) => flag,
        Some(_) | None => return Err(MalformedResultError::missing("success").into()),
    };
    if !success {
        let message = match fields.remove("error") {
            Some(Value::String(msg)) if !msg.trim().is_empty() => msg,
            _ => UNKNOWN_BACKEND_ERROR.to_string(),
        };
        return Err(ClientError::Domain(message));
    }
    fields.remove("error");
    Ok(fields)
}

fn payload<W, T>(body: &str) -> Result<T, ClientError>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = MalformedResultError>,
{
    let fields = open(body)?;
    let wire: W = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ClientError::Payload(e.to_string()))?;
    Ok(T::try_from(wire)?)
}

/// Decode an `/analizar_imagen` response.
pub fn classification(body: &str) -> Result<ClassificationResult, ClientError> {
    payload::<AnalysisWire, _>(body)
}

/// Decode an `/identificar_planta` response.
pub fn identification(body: &str) -> Result<IdentificationResult, ClientError> {
    payload::<IdentificationWire, _>(body)
}

/// Decode a `/cargar_modelo` response.
pub fn configuration(body: &str) -> Result<ModelConfiguration, ClientError> {
    payload::<ConfigurationWire, _>(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_surfaces_error_verbatim() {
        let body = r#"{"success": false, "error": "No se envió ninguna imagen"}"#;
        match classification(body) {
            Err(ClientError::Domain(msg)) => assert_eq!(msg, "No se envió ninguna imagen"),
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        match identification(r#"{"success": false}"#) {
            Err(ClientError::Domain(msg)) => assert_eq!(msg, UNKNOWN_BACKEND_ERROR),
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn html_error_page_is_a_transport_error() {
        let body = "<!doctype html><title>413 Request Entity Too Large</title>";
        assert!(classification(body).unwrap_err().is_transport());
    }

    #[test]
    fn json_array_is_a_transport_error() {
        assert!(configuration("[1, 2]").unwrap_err().is_transport());
    }

    #[test]
    fn missing_success_flag_is_malformed() {
        let err = configuration(r#"{"tipo_planta": "Rosa", "clases": []}"#).unwrap_err();
        assert!(matches!(err, ClientError::Malformed(MalformedResultError { field: "success" })));
    }

    #[test]
    fn wrong_field_type_is_a_payload_error() {
        let body = r#"{"success": true, "clase": 3}"#;
        let err = classification(body).unwrap_err();
        assert!(matches!(err, ClientError::Payload(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn configuration_success_decodes() {
        let body = r#"{"success": true, "mensaje": "Modelo y configuración cargados: Tomate",
                       "tipo_planta": "Tomate", "clases": ["Sana", "Tizón"]}"#;
        let cfg = configuration(body).unwrap();
        assert_eq!(cfg.plant_type, "Tomate");
        assert_eq!(cfg.classes, vec!["Sana", "Tizón"]);
    }
}
