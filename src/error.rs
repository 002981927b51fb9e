//! Error type shared by every effect module.
//!
//! Nothing here is ever shown to the visitor: callers either degrade (layout
//! fallback, skipped feature) or log and drop the affected particle.

use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FxError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("element is not laid out")]
    Layout,
    #[error("js call rejected: {0}")]
    Js(String),
    #[error("preference storage unavailable: {0}")]
    Storage(String),
    #[error("web audio unavailable: {0}")]
    Audio(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<JsValue> for FxError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<FxError> for JsValue {
    fn from(err: FxError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type FxResult<T> = Result<T, FxError>;
