// The page-facing controller: binds a <canvas> to a ParticleField, keeps it
// sized to the viewport, and drives it from requestAnimationFrame.

use crate::config::FieldConfig;
use crate::error::Error;
use crate::field::ParticleField;
use crate::frame_loop::{FrameLoop, FrameScheduler, RafScheduler};
use crate::Timer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, Window};

struct Inner {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    field: ParticleField,
    rng: StdRng,
    scheduler: RafScheduler,
    frame_loop: FrameLoop<RafScheduler>,
}

impl Inner {
    fn on_frame(&mut self) {
        if !self.frame_loop.begin_frame() {
            return;
        }
        self.field.advance_frame();
        if let Err(e) = self.field.render(&mut self.context) {
            console::warn_2(&"particle render failed:".into(), &e);
        }
        if let Err(e) = self.frame_loop.end_frame(&self.scheduler) {
            console::warn_1(&format!("particle background stalled: {}", e).into());
        }
    }

    fn regenerate(&mut self, width: u32, height: u32) {
        let _timer = if self.field.config().profile {
            Some(Timer::new("ParticleField::initialize"))
        } else {
            None
        };
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.field.handle_resize(width, height, &mut self.rng);
        console::log_1(
            &format!(
                "particle background: {} particles on {}x{}",
                self.field.particles().len(),
                width,
                height
            )
            .into(),
        );
    }

    fn update_config(&mut self, update: impl FnOnce(&mut FieldConfig)) -> Result<(), Error> {
        let mut config = self.field.config().clone();
        update(&mut config);
        self.field.set_config(config)?;
        let (width, height) = (self.field.width(), self.field.height());
        self.regenerate(width, height);
        Ok(())
    }

    fn set_hidden(&mut self, hidden: bool) -> Result<(), Error> {
        let pause_when_hidden = self.field.config().pause_when_hidden;
        follow_visibility(&mut self.frame_loop, &self.scheduler, pause_when_hidden, hidden)
    }
}

// Showing the page only undoes a pause that hiding it caused
fn follow_visibility<S: FrameScheduler>(
    frame_loop: &mut FrameLoop<S>,
    scheduler: &S,
    pause_when_hidden: bool,
    hidden: bool,
) -> Result<(), Error> {
    if !hidden {
        frame_loop.show(scheduler)
    } else {
        if pause_when_hidden {
            frame_loop.hide(scheduler);
        }
        Ok(())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // The frame closure dies with the scheduler; nothing may still be queued
        self.frame_loop.stop(&self.scheduler);
    }
}

// An event listener that unregisters itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

impl Listener {
    fn new<F>(target: EventTarget, event: &'static str, handler: F) -> Result<Listener, Error>
    where
        F: FnMut() + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        target.add_event_listener_with_callback(
            event,
            callback.as_ref().unchecked_ref::<js_sys::Function>(),
        )?;
        Ok(Listener {
            target,
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event,
            self.callback.as_ref().unchecked_ref::<js_sys::Function>(),
        );
    }
}

fn viewport_size(window: &Window) -> (u32, u32) {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0)
    };
    (dimension(window.inner_width()), dimension(window.inner_height()))
}

fn with_inner(inner: &Weak<RefCell<Inner>>, f: impl FnOnce(&mut Inner)) {
    if let Some(inner) = inner.upgrade() {
        if let Ok(mut inner) = inner.try_borrow_mut() {
            f(&mut inner);
        }
    }
}

/// Animated particle background bound to a canvas element.
///
/// ```js
/// const background = new ParticleBackground("particleCanvas");
/// background.start();
/// ```
#[wasm_bindgen]
pub struct ParticleBackground {
    // Listeners go first so they are removed before the field is torn down
    _listeners: Vec<Listener>,
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl ParticleBackground {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<ParticleBackground, JsValue> {
        Ok(Self::with_config(canvas_id, FieldConfig::default(), None)?)
    }

    /// Same as the constructor but with a deterministic particle layout.
    #[wasm_bindgen(js_name = withSeed)]
    pub fn with_seed(canvas_id: &str, seed: u32) -> Result<ParticleBackground, JsValue> {
        Ok(Self::with_config(
            canvas_id,
            FieldConfig::default(),
            Some(StdRng::seed_from_u64(seed as u64)),
        )?)
    }

    pub fn start(&self) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.frame_loop.start(&inner.scheduler)?;
        console::log_1(&"particle background started".into());
        Ok(())
    }

    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.frame_loop.stop(&inner.scheduler);
    }

    pub fn pause(&self) {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.frame_loop.pause(&inner.scheduler);
    }

    pub fn resume(&self) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        Ok(inner.frame_loop.resume(&inner.scheduler)?)
    }

    /// Resizes the canvas and regenerates every particle.
    pub fn resize(&self, width: u32, height: u32) {
        self.inner.borrow_mut().regenerate(width, height);
    }

    /// Draws one frame of the current state without advancing it.
    pub fn redraw(&self) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.field.render(&mut inner.context)
    }

    #[wasm_bindgen(getter, js_name = particleCount)]
    pub fn particle_count(&self) -> u32 {
        self.inner.borrow().field.particles().len() as u32
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().frame_loop.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.inner.borrow().frame_loop.frames() as f64
    }

    #[wasm_bindgen(js_name = setApplyOpacity)]
    pub fn set_apply_opacity(&self, apply: bool) -> Result<(), JsValue> {
        Ok(self
            .inner
            .borrow_mut()
            .update_config(|config| config.apply_opacity = apply)?)
    }

    #[wasm_bindgen(js_name = setMaxParticles)]
    pub fn set_max_particles(&self, max_particles: u32) -> Result<(), JsValue> {
        Ok(self
            .inner
            .borrow_mut()
            .update_config(|config| config.max_particles = max_particles as usize)?)
    }

    #[wasm_bindgen(js_name = setLinkDistance)]
    pub fn set_link_distance(&self, distance: f64) -> Result<(), JsValue> {
        Ok(self
            .inner
            .borrow_mut()
            .update_config(|config| config.link_distance = distance)?)
    }
}

impl ParticleBackground {
    /// Looks up the canvas by id and attaches to it. `rng` defaults to an
    /// entropy-seeded generator.
    pub fn with_config(
        canvas_id: &str,
        config: FieldConfig,
        rng: Option<StdRng>,
    ) -> Result<ParticleBackground, Error> {
        let window = web_sys::window().ok_or(Error::NoWindow)?;
        let document = window.document().ok_or(Error::NoDocument)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| Error::CanvasNotFound(canvas_id.to_owned()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::NotACanvas(canvas_id.to_owned()))?;
        Self::attach(window, document, canvas, config, rng)
    }

    pub fn attach(
        window: Window,
        document: Document,
        canvas: HtmlCanvasElement,
        config: FieldConfig,
        rng: Option<StdRng>,
    ) -> Result<ParticleBackground, Error> {
        let field = ParticleField::new(config)?;
        let context = canvas
            .get_context("2d")?
            .ok_or(Error::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::ContextUnavailable)?;
        let rng = match rng {
            Some(rng) => rng,
            None => StdRng::from_rng(rand::thread_rng()).map_err(|e| Error::Js(e.to_string()))?,
        };

        let inner = Rc::new(RefCell::new(Inner {
            canvas,
            context,
            field,
            rng,
            scheduler: RafScheduler::new(window.clone()),
            frame_loop: FrameLoop::new(),
        }));

        let frame_target = Rc::downgrade(&inner);
        inner.borrow().scheduler.set_callback(Closure::wrap(Box::new(move || {
            with_inner(&frame_target, Inner::on_frame);
        }) as Box<dyn FnMut()>));

        let (width, height) = viewport_size(&window);
        inner.borrow_mut().regenerate(width, height);

        let resize_target = Rc::downgrade(&inner);
        let resize_window = window.clone();
        let resize = Listener::new(window.into(), "resize", move || {
            let (width, height) = viewport_size(&resize_window);
            with_inner(&resize_target, |inner| inner.regenerate(width, height));
        })?;

        let visibility_target = Rc::downgrade(&inner);
        let visibility_document = document.clone();
        let visibility = Listener::new(document.into(), "visibilitychange", move || {
            let hidden = visibility_document.hidden();
            with_inner(&visibility_target, |inner| {
                if let Err(e) = inner.set_hidden(hidden) {
                    console::warn_1(&format!("particle background: {}", e).into());
                }
            });
        })?;

        Ok(ParticleBackground {
            _listeners: vec![resize, visibility],
            inner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_loop::tests::MockScheduler;
    use crate::frame_loop::LoopState;

    fn running(scheduler: &MockScheduler) -> FrameLoop<MockScheduler> {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(scheduler).unwrap();
        frame_loop
    }

    #[test]
    fn hidden_page_pauses_until_visible() {
        let scheduler = MockScheduler::default();
        let mut frame_loop = running(&scheduler);

        follow_visibility(&mut frame_loop, &scheduler, true, true).unwrap();
        assert_eq!(frame_loop.state(), LoopState::Paused);
        assert!(!frame_loop.has_pending());

        follow_visibility(&mut frame_loop, &scheduler, true, false).unwrap();
        assert!(frame_loop.is_running());
        assert!(frame_loop.has_pending());
    }

    #[test]
    fn hidden_page_keeps_running_when_disabled() {
        let scheduler = MockScheduler::default();
        let mut frame_loop = running(&scheduler);

        follow_visibility(&mut frame_loop, &scheduler, false, true).unwrap();
        assert!(frame_loop.is_running());
        follow_visibility(&mut frame_loop, &scheduler, false, false).unwrap();
        assert!(frame_loop.is_running());
        assert_eq!(scheduler.requested.borrow().len(), 1);
        assert!(scheduler.cancelled.borrow().is_empty());
    }

    #[test]
    fn explicit_pause_survives_visibility_changes() {
        let scheduler = MockScheduler::default();
        let mut frame_loop = running(&scheduler);
        frame_loop.pause(&scheduler);

        follow_visibility(&mut frame_loop, &scheduler, true, true).unwrap();
        follow_visibility(&mut frame_loop, &scheduler, true, false).unwrap();
        assert_eq!(frame_loop.state(), LoopState::Paused);
        assert_eq!(scheduler.requested.borrow().len(), 1);
    }

    #[test]
    fn stopped_loop_stays_stopped_when_page_returns() {
        let scheduler = MockScheduler::default();
        let mut frame_loop: FrameLoop<MockScheduler> = FrameLoop::new();

        follow_visibility(&mut frame_loop, &scheduler, true, true).unwrap();
        follow_visibility(&mut frame_loop, &scheduler, true, false).unwrap();
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert!(scheduler.requested.borrow().is_empty());
    }
}
