// Drives frame ticks off a one-shot "call me before the next repaint" request,
// with explicit start/stop so no frame is ever requested after a stop.

use crate::error::Error;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

pub trait FrameScheduler {
    type Handle: Copy + std::fmt::Debug;

    fn request_frame(&self) -> Result<Self::Handle, Error>;
    fn cancel_frame(&self, handle: Self::Handle);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    Paused,
}

/// Holds at most one outstanding frame request. The host calls `begin_frame`
/// when the request fires, runs the tick if told to, then calls `end_frame`
/// to chain the next request.
pub struct FrameLoop<S: FrameScheduler> {
    state: LoopState,
    pending: Option<S::Handle>,
    frames: u64,
    // Paused by `hide` rather than by the caller
    hidden: bool,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new() -> Self {
        FrameLoop {
            state: LoopState::Stopped,
            pending: None,
            frames: 0,
            hidden: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Completed ticks since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self, scheduler: &S) -> Result<(), Error> {
        self.hidden = false;
        self.schedule(scheduler)?;
        self.state = LoopState::Running;
        Ok(())
    }

    pub fn stop(&mut self, scheduler: &S) {
        self.hidden = false;
        self.state = LoopState::Stopped;
        self.cancel(scheduler);
    }

    pub fn pause(&mut self, scheduler: &S) {
        self.hidden = false;
        self.suspend(scheduler);
    }

    /// Only a paused loop resumes; a stopped one stays stopped.
    pub fn resume(&mut self, scheduler: &S) -> Result<(), Error> {
        if self.state == LoopState::Paused {
            self.start(scheduler)
        } else {
            Ok(())
        }
    }

    /// Pauses a running loop while the page is not visible. A loop that is
    /// already paused or stopped is left alone.
    pub fn hide(&mut self, scheduler: &S) {
        if self.state == LoopState::Running {
            self.suspend(scheduler);
            self.hidden = true;
        }
    }

    /// Undoes `hide`; a pause the caller asked for survives.
    pub fn show(&mut self, scheduler: &S) -> Result<(), Error> {
        if self.hidden {
            self.resume(scheduler)
        } else {
            Ok(())
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The outstanding request has fired. Returns whether a tick should run.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        self.state == LoopState::Running
    }

    pub fn end_frame(&mut self, scheduler: &S) -> Result<(), Error> {
        if self.state != LoopState::Running {
            return Ok(());
        }
        self.frames += 1;
        self.schedule(scheduler)
    }

    fn suspend(&mut self, scheduler: &S) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
            self.cancel(scheduler);
        }
    }

    // A failed request stops the loop so the state never claims a frame is coming
    fn schedule(&mut self, scheduler: &S) -> Result<(), Error> {
        if self.pending.is_none() {
            match scheduler.request_frame() {
                Ok(handle) => self.pending = Some(handle),
                Err(e) => {
                    self.state = LoopState::Stopped;
                    self.hidden = false;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn cancel(&mut self, scheduler: &S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }
}

impl<S: FrameScheduler> Default for FrameLoop<S> {
    fn default() -> Self {
        FrameLoop::new()
    }
}

/// `requestAnimationFrame` / `cancelAnimationFrame` on the window. The
/// callback is installed once with [`set_callback`](Self::set_callback) and
/// re-requested every frame.
pub struct RafScheduler {
    window: Window,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        RafScheduler {
            window,
            callback: RefCell::new(None),
        }
    }

    pub fn set_callback(&self, callback: Closure<dyn FnMut()>) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request_frame(&self) -> Result<i32, Error> {
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| Error::Js("frame callback not installed".to_owned()))?;
        Ok(self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref::<js_sys::Function>())?)
    }

    fn cancel_frame(&self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            web_sys::console::warn_2(&"cancelAnimationFrame failed:".into(), &e);
        }
    }
}
