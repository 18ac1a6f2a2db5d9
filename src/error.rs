//! Error types for the particle background.
//!
//! The simulation core never fails; these cover host capabilities that are
//! missing when the background is attached to a page, and invalid tunables.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("pixels_per_particle must be greater than zero")]
    ZeroSpacing,
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange { name: &'static str, min: f64, max: f64 },
    #[error("max_speed must not be negative, got {0}")]
    NegativeSpeed(f64),
    #[error("link_distance must be positive, got {0}")]
    NonPositiveLinkDistance(f64),
    #[error("link_alpha must lie in [0, 1], got {0}")]
    LinkAlphaOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("no global `window` exists")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("no element with id `{0}`")]
    CanvasNotFound(String),
    #[error("element `{0}` is not a <canvas>")]
    NotACanvas(String),
    #[error("canvas does not provide a 2d rendering context")]
    ContextUnavailable,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
