use wasm_bindgen::JsValue;

use crate::clock::ClockError;
use crate::explainer::DataError;
use crate::food::UnknownCategory;
use crate::scenario::ScenarioError;
use crate::scoring::PlacementError;
use crate::session::SessionError;

/// Crate-level error; converts into a `JsValue` at the wasm boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Category(#[from] UnknownCategory),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
    #[error("could not encode score: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for JsValue {
    fn from(e: Error) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
