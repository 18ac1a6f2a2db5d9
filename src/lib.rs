mod utils;

pub mod background;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod frame_loop;
pub mod particle;
pub mod surface;

pub use background::ParticleBackground;
pub use color::Color;
pub use config::FieldConfig;
pub use error::{ConfigError, Error};
pub use field::{Connection, ParticleField};
pub use frame_loop::{FrameLoop, FrameScheduler, LoopState, RafScheduler};
pub use particle::Particle;
pub use surface::Surface;

use wasm_bindgen::prelude::*;
use web_sys::console;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
}

/// Creates a background on the canvas with the given id and starts animating
/// it right away, the way the portfolio page does on `DOMContentLoaded`.
#[wasm_bindgen(js_name = startBackground)]
pub fn start_background(canvas_id: &str) -> Result<ParticleBackground, JsValue> {
    initialize();
    let background = ParticleBackground::new(canvas_id)?;
    background.start()?;
    Ok(background)
}

pub struct Timer<'a> {
    name: &'a str,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Timer<'a> {
        console::time_with_label(name);
        Timer { name }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        console::time_end_with_label(self.name);
    }
}
