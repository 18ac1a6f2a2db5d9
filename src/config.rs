// Tunables for the particle field. Defaults reproduce the portfolio page's
// background exactly.

use crate::color::{self, Color};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub max_particles: usize,
    /// One particle per this many pixels of viewport width.
    pub pixels_per_particle: u32,
    /// Velocity components are drawn from `[-max_speed, max_speed]`.
    pub max_speed: f64,
    /// Half-open `(min, max)` range for radii.
    pub radius: (f64, f64),
    /// Half-open `(min, max)` range for opacities.
    pub opacity: (f64, f64),
    pub palette: Vec<Color>,
    pub link_distance: f64,
    /// Alpha of a connection between coincident particles; fades to zero at `link_distance`.
    pub link_alpha: f64,
    pub link_width: f64,
    pub link_color: Color,
    pub apply_opacity: bool,
    pub pause_when_hidden: bool,
    pub profile: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            max_particles: 80,
            pixels_per_particle: 20,
            max_speed: 0.15,
            radius: (1.0, 4.0),
            opacity: (0.2, 0.8),
            palette: color::default_palette(),
            link_distance: 120.0,
            link_alpha: 0.15,
            link_width: 1.0,
            link_color: Color::LAVENDER,
            apply_opacity: false,
            pause_when_hidden: true,
            profile: false,
        }
    }
}

impl FieldConfig {
    pub fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles;
        self
    }

    pub fn with_pixels_per_particle(mut self, pixels: u32) -> Self {
        self.pixels_per_particle = pixels;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_link_distance(mut self, distance: f64) -> Self {
        self.link_distance = distance;
        self
    }

    pub fn with_apply_opacity(mut self, apply: bool) -> Self {
        self.apply_opacity = apply;
        self
    }

    pub fn with_pause_when_hidden(mut self, pause: bool) -> Self {
        self.pause_when_hidden = pause;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// `min(max_particles, floor(width / pixels_per_particle))`
    pub fn particle_count(&self, width: u32) -> usize {
        if self.pixels_per_particle == 0 {
            return 0;
        }
        ((width / self.pixels_per_particle) as usize).min(self.max_particles)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixels_per_particle == 0 {
            return Err(ConfigError::ZeroSpacing);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for &(name, (min, max)) in &[("radius", self.radius), ("opacity", self.opacity)] {
            if min > max {
                return Err(ConfigError::InvertedRange { name, min, max });
            }
        }
        if self.max_speed < 0.0 {
            return Err(ConfigError::NegativeSpeed(self.max_speed));
        }
        if !(self.link_distance > 0.0) {
            return Err(ConfigError::NonPositiveLinkDistance(self.link_distance));
        }
        if !(0.0..=1.0).contains(&self.link_alpha) {
            return Err(ConfigError::LinkAlphaOutOfRange(self.link_alpha));
        }
        Ok(())
    }
}
