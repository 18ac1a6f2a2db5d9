// Simple particle struct to keep track of individual position, velocity, size and color

use crate::color::Color;
use vecmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    pub radius: f64,
    // Carried but only drawn when `FieldConfig::apply_opacity` is set
    pub opacity: f64,
    pub color: Color,
}

impl Particle {
    pub fn new(
        pos: Vector2<f64>,
        vel: Vector2<f64>,
        radius: f64,
        opacity: f64,
        color: Color,
    ) -> Particle {
        Particle {
            pos,
            vel,
            radius,
            opacity,
            color,
        }
    }

    /// Moves the particle by one frame's velocity, then reflects each velocity
    /// component whose axis ended up outside `[0, width]` / `[0, height]`.
    ///
    /// The position is not clamped, so a particle may sit past an edge for one
    /// frame before the reflected velocity carries it back.
    pub fn advance(&mut self, width: f64, height: f64) {
        self.pos = vecmath::vec2_add(self.pos, self.vel);
        if self.pos[0] < 0.0 || self.pos[0] > width {
            self.vel[0] *= -1.0;
        }
        if self.pos[1] < 0.0 || self.pos[1] > height {
            self.vel[1] *= -1.0;
        }
    }

    pub fn distance_to(&self, other: &Particle) -> f64 {
        vecmath::vec2_len(vecmath::vec2_sub(self.pos, other.pos))
    }
}
