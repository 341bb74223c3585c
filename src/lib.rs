//! Glucose Clock core crate.
//!
//! A browser game about blood-sugar spikes: the player sees a recorded (or
//! practice) glucose spike and drags the food they think caused it onto a 24h
//! clock. Placements are scored on timing plus a glycemic-impact bonus. An
//! explainer tab compares typical response curves per glycemic category.
//!
//! The pure modules (`clock`, `food`, `scoring`, `scenario`, `explainer`,
//! `session`) have no DOM dependency and are tested natively; `web` wires them
//! to the page.

use wasm_bindgen::prelude::*;

pub mod clock;
pub mod config;
pub mod error;
pub mod explainer;
pub mod food;
pub mod rng;
pub mod scenario;
pub mod scoring;
pub mod session;
mod web;

pub use error::{Error, Result};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (module re-instantiated in the same page) is harmless.
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Wire the page with the default configuration and start loading scenarios.
#[wasm_bindgen]
pub fn start_game() -> std::result::Result<(), JsValue> {
    web::start_game(config::GameConfig::default())
}

/// Like [`start_game`] with a (possibly partial) JSON configuration.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> std::result::Result<(), JsValue> {
    let config = config::GameConfig::from_json(json).map_err(Error::Config)?;
    web::start_game(config)
}

/// Explainer filter: `"high"`, `"medium"`, `"low"` or `"all"`.
#[wasm_bindgen]
pub fn select_food_category(category: &str) -> std::result::Result<(), JsValue> {
    web::select_food_category(category)
}

/// Score a placement given as page strings ("1:10 PM", "high", "30-45").
///
/// Returns the full result as JSON (`score`, `verdict`, `feedback`,
/// `impact_feedback`, ...). Uses the session RNG once `start_game` has run,
/// so a configured seed applies; before that it seeds from entropy.
#[wasm_bindgen]
pub fn score_placement(
    placed: &str,
    impact: &str,
    timing: &str,
    spike_time: &str,
    spike_value: f64,
    baseline_value: f64,
) -> std::result::Result<String, JsValue> {
    let scored = web::with_session(|s| s.score_strings(placed, impact, timing, spike_time, spike_value, baseline_value))
        .unwrap_or_else(|| {
            let mut rng = rng::Rng::from_entropy();
            scoring::score_from_strings(placed, impact, timing, spike_time, spike_value, baseline_value, &mut rng)
        });
    let result = scored.map_err(Error::from)?;
    serde_json::to_string(&result).map_err(|e| JsValue::from(Error::Encode(e)))
}

/// Clock label ("h:mm AM") for a dial angle in degrees, midnight at the top.
#[wasm_bindgen]
pub fn clock_time_at_angle(angle_deg: f64) -> String {
    clock::ClockTime::from_angle(angle_deg).to_string()
}
