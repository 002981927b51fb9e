//! Creeper FX core crate.
//!
//! Decoration layer for the block-themed portfolio page: a drifting pixel
//! backdrop, scroll sparkles, and the `#creeper` mascot whose personality
//! follows the page theme (calm Steve on light, explosive Creeper on dark).
//!
//! The effect logic is written against [`stage::Stage`] and
//! [`scheduler::Scheduler`]; `web` binds them to the browser and `sim`
//! (behind the `sim` feature) provides a headless document with a virtual
//! clock.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod fx;
pub mod logging;
pub mod mascot;
pub mod particles;
pub mod scheduler;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod sound;
pub mod stage;
pub mod theme;
pub mod web;

pub use config::FxConfig;
pub use error::{FxError, FxResult};
pub use theme::Mode;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::Level::Info);
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Start all effects with the default timings.
#[wasm_bindgen]
pub fn start_effects() -> Result<(), JsValue> {
    start(FxConfig::default())
}

/// Start all effects with overrides given as a JSON object.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_effects_with_config(json: &str) -> Result<(), JsValue> {
    start(FxConfig::from_json(json)?)
}

fn start(config: FxConfig) -> Result<(), JsValue> {
    logging::init(config.level());
    web::install(config)?;
    Ok(())
}
