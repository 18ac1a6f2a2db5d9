// The particle field: a fixed-size swarm of drifting points sized to the
// viewport, with proximity lines drawn between close neighbours.

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::particle::Particle;
use crate::surface::Surface;
use rand::Rng;

/// A line to draw between two particles closer than the link distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
    pub alpha: f64,
}

pub struct ParticleField {
    width: u32,
    height: u32,
    particles: Vec<Particle>,
    config: FieldConfig,
}

impl ParticleField {
    /// An empty field; call [`initialize`](Self::initialize) to populate it.
    pub fn new(config: FieldConfig) -> Result<ParticleField, ConfigError> {
        config.validate()?;
        Ok(ParticleField {
            width: 0,
            height: 0,
            particles: Vec::new(),
            config,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Swaps the tunables. Existing particles keep their values until the next
    /// `initialize`. An invalid config is rejected and the current one kept.
    pub fn set_config(&mut self, config: FieldConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Replaces the particle sequence wholesale with a freshly randomized one
    /// sized for the given viewport.
    pub fn initialize<R: Rng>(&mut self, width: u32, height: u32, rng: &mut R) {
        self.width = width;
        self.height = height;

        let num_particles = self.config.particle_count(width);
        let mut particles = Vec::with_capacity(num_particles);
        let (min_radius, max_radius) = self.config.radius;
        let (min_opacity, max_opacity) = self.config.opacity;
        let speed = self.config.max_speed;
        for _ in 0..num_particles {
            let pos_x = rng.gen::<f64>() * width as f64;
            let pos_y = rng.gen::<f64>() * height as f64;
            let vel_x = (rng.gen::<f64>() * 2.0 - 1.0) * speed;
            let vel_y = (rng.gen::<f64>() * 2.0 - 1.0) * speed;
            let radius = rng.gen::<f64>() * (max_radius - min_radius) + min_radius;
            let opacity = rng.gen::<f64>() * (max_opacity - min_opacity) + min_opacity;
            // Validated config guarantees a non-empty palette
            let color = self.config.palette[rng.gen_range(0, self.config.palette.len())];
            particles.push(Particle::new(
                [pos_x, pos_y],
                [vel_x, vel_y],
                radius,
                opacity,
                color,
            ));
        }
        self.particles = particles;
    }

    /// Full reset: no particle survives a resize.
    pub fn handle_resize<R: Rng>(&mut self, width: u32, height: u32, rng: &mut R) {
        self.initialize(width, height, rng);
    }

    pub fn advance_frame(&mut self) {
        let width = self.width as f64;
        let height = self.height as f64;
        for particle in &mut self.particles {
            particle.advance(width, height);
        }
    }

    /// Every unordered pair closer than `link_distance`, with alpha fading
    /// linearly from `link_alpha` at distance zero to nothing at the threshold.
    ///
    /// Quadratic in the particle count; the count cap keeps this affordable.
    pub fn connections(&self) -> Vec<Connection> {
        let max_distance = self.config.link_distance;
        let mut connections = Vec::new();
        for (i, particle) in self.particles.iter().enumerate() {
            for (j, other) in self.particles.iter().enumerate().skip(i + 1) {
                let distance = particle.distance_to(other);
                if distance < max_distance {
                    connections.push(Connection {
                        from: i,
                        to: j,
                        distance,
                        alpha: self.config.link_alpha * (1.0 - distance / max_distance),
                    });
                }
            }
        }
        connections
    }

    /// Clears the surface, draws one circle per particle, then one line per
    /// connection. Particle state is left untouched.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), S::Error> {
        surface.clear(self.width as f64, self.height as f64)?;

        for p in &self.particles {
            let alpha = if self.config.apply_opacity {
                p.opacity
            } else {
                1.0
            };
            surface.fill_circle(p.pos, p.radius, p.color, alpha)?;
        }

        for connection in self.connections() {
            surface.stroke_line(
                self.particles[connection.from].pos,
                self.particles[connection.to].pos,
                self.config.link_color,
                connection.alpha,
                self.config.link_width,
            )?;
        }
        Ok(())
    }

    /// One frame tick: advance, then render the advanced state.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        self.advance_frame();
        self.render(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::convert::Infallible;
    use vecmath::Vector2;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Draw {
        Clear { width: f64, height: f64 },
        Circle { center: Vector2<f64>, radius: f64, color: Color, alpha: f64 },
        Line { from: Vector2<f64>, to: Vector2<f64>, color: Color, alpha: f64, width: f64 },
    }

    #[derive(Default)]
    pub struct Recorder {
        pub draws: Vec<Draw>,
    }

    impl Recorder {
        pub fn circles(&self) -> Vec<&Draw> {
            self.draws.iter().filter(|d| matches!(d, Draw::Circle { .. })).collect()
        }

        pub fn lines(&self) -> Vec<&Draw> {
            self.draws.iter().filter(|d| matches!(d, Draw::Line { .. })).collect()
        }
    }

    impl Surface for Recorder {
        type Error = Infallible;

        fn clear(&mut self, width: f64, height: f64) -> Result<(), Infallible> {
            self.draws.push(Draw::Clear { width, height });
            Ok(())
        }

        fn fill_circle(
            &mut self,
            center: Vector2<f64>,
            radius: f64,
            color: Color,
            alpha: f64,
        ) -> Result<(), Infallible> {
            self.draws.push(Draw::Circle { center, radius, color, alpha });
            Ok(())
        }

        fn stroke_line(
            &mut self,
            from: Vector2<f64>,
            to: Vector2<f64>,
            color: Color,
            alpha: f64,
            width: f64,
        ) -> Result<(), Infallible> {
            self.draws.push(Draw::Line { from, to, color, alpha, width });
            Ok(())
        }
    }

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn field_with(width: u32, height: u32, particles: Vec<Particle>) -> ParticleField {
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.width = width;
        field.height = height;
        field.particles = particles;
        field
    }

    fn still(x: f64, y: f64) -> Particle {
        Particle::new([x, y], [0.0, 0.0], 2.0, 0.5, Color::VIOLET)
    }

    #[test]
    fn count_matches_viewport_width() {
        let mut rng = seeded(1);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        for &(width, expected) in &[(1600, 80), (200, 10), (15, 0), (0, 0), (5000, 80), (399, 19)] {
            field.initialize(width, 600, &mut rng);
            assert_eq!(field.particles().len(), expected, "width {}", width);
        }
    }

    #[test]
    fn initial_values_respect_bounds() {
        let mut rng = seeded(2);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.initialize(1280, 720, &mut rng);
        let palette = &field.config().palette;
        for p in field.particles() {
            assert!(p.pos[0] >= 0.0 && p.pos[0] <= 1280.0);
            assert!(p.pos[1] >= 0.0 && p.pos[1] <= 720.0);
            assert!(p.vel[0] >= -0.15 && p.vel[0] <= 0.15);
            assert!(p.vel[1] >= -0.15 && p.vel[1] <= 0.15);
            assert!(p.radius >= 1.0 && p.radius < 4.0);
            assert!(p.opacity >= 0.2 && p.opacity < 0.8);
            assert!(palette.contains(&p.color));
        }
    }

    #[test]
    fn same_seed_replays_same_field() {
        let mut a = ParticleField::new(FieldConfig::default()).unwrap();
        let mut b = ParticleField::new(FieldConfig::default()).unwrap();
        a.initialize(800, 600, &mut seeded(42));
        b.initialize(800, 600, &mut seeded(42));
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn reinitialize_regenerates_fresh_sequence() {
        let mut rng = seeded(3);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.initialize(800, 600, &mut rng);
        let first = field.particles().to_vec();
        field.initialize(800, 600, &mut rng);
        assert_eq!(field.particles().len(), first.len());
        assert_ne!(field.particles(), &first[..]);
    }

    #[test]
    fn resize_resets_dimensions_and_count() {
        let mut rng = seeded(4);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.initialize(1600, 900, &mut rng);
        field.handle_resize(300, 200, &mut rng);
        assert_eq!((field.width(), field.height()), (300, 200));
        assert_eq!(field.particles().len(), 15);
        for p in field.particles() {
            assert!(p.pos[0] <= 300.0 && p.pos[1] <= 200.0);
        }
    }

    #[test]
    fn advance_flips_velocity_on_overshoot() {
        let mut field = field_with(
            1000,
            500,
            vec![Particle::new([999.95, 250.0], [0.3, 0.0], 2.0, 0.5, Color::LILAC)],
        );
        field.advance_frame();
        let p = field.particles()[0];
        assert!((p.pos[0] - 1000.25).abs() < 1e-9);
        assert_eq!(p.vel, [-0.3, 0.0]);
    }

    #[test]
    fn velocity_magnitude_never_changes() {
        let mut rng = seeded(5);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.initialize(400, 300, &mut rng);
        let speeds = |field: &ParticleField| -> Vec<[f64; 2]> {
            field
                .particles()
                .iter()
                .map(|p| [p.vel[0].abs(), p.vel[1].abs()])
                .collect()
        };
        let before = speeds(&field);
        for _ in 0..10_000 {
            field.advance_frame();
        }
        let after = speeds(&field);
        assert_eq!(before, after);
        for p in field.particles() {
            assert!(p.pos[0] >= -0.15 && p.pos[0] <= 400.15);
            assert!(p.pos[1] >= -0.15 && p.pos[1] <= 300.15);
        }
    }

    #[test]
    fn tiny_viewport_is_a_no_op() {
        let mut rng = seeded(6);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.initialize(15, 15, &mut rng);
        field.advance_frame();
        let mut recorder = Recorder::default();
        field.render(&mut recorder).unwrap();
        assert_eq!(recorder.draws, vec![Draw::Clear { width: 15.0, height: 15.0 }]);
    }

    #[test]
    fn connection_alpha_fades_with_distance() {
        let field = field_with(1000, 600, vec![still(0.0, 0.0), still(100.0, 0.0)]);
        let connections = field.connections();
        assert_eq!(connections.len(), 1);
        let c = connections[0];
        assert_eq!((c.from, c.to), (0, 1));
        assert_eq!(c.distance, 100.0);
        assert!((c.alpha - 0.15 * (1.0 - 100.0 / 120.0)).abs() < 1e-12);
        assert!((c.alpha - 0.025).abs() < 1e-9);
    }

    #[test]
    fn no_connection_at_or_beyond_threshold() {
        let field = field_with(
            1000,
            600,
            vec![still(0.0, 0.0), still(120.0, 0.0), still(500.0, 500.0)],
        );
        assert!(field.connections().is_empty());
    }

    #[test]
    fn coincident_particles_link_at_full_alpha() {
        let field = field_with(1000, 600, vec![still(50.0, 50.0), still(50.0, 50.0)]);
        let connections = field.connections();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].alpha, 0.15);
    }

    #[test]
    fn render_draws_one_circle_per_particle_and_one_line_per_close_pair() {
        // a-b 100 apart, b-c 60 apart, a-c 160 apart
        let field = field_with(
            1000,
            600,
            vec![still(0.0, 0.0), still(100.0, 0.0), still(160.0, 0.0)],
        );
        let mut recorder = Recorder::default();
        field.render(&mut recorder).unwrap();

        assert_eq!(recorder.draws[0], Draw::Clear { width: 1000.0, height: 600.0 });
        assert_eq!(recorder.circles().len(), 3);
        let lines = recorder.lines();
        assert_eq!(lines.len(), 2);
        for line in lines {
            match line {
                Draw::Line { color, width, .. } => {
                    assert_eq!(*color, Color::LAVENDER);
                    assert_eq!(*width, 1.0);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn circles_ignore_opacity_unless_enabled() {
        let particle = Particle::new([5.0, 5.0], [0.0, 0.0], 3.0, 0.4, Color::LILAC);
        let mut field = field_with(100, 100, vec![particle]);
        let circle = |alpha| Draw::Circle {
            center: [5.0, 5.0],
            radius: 3.0,
            color: Color::LILAC,
            alpha,
        };

        let mut recorder = Recorder::default();
        field.render(&mut recorder).unwrap();
        assert_eq!(recorder.circles(), vec![&circle(1.0)]);

        field
            .set_config(FieldConfig::default().with_apply_opacity(true))
            .unwrap();
        let mut recorder = Recorder::default();
        field.render(&mut recorder).unwrap();
        assert_eq!(recorder.circles(), vec![&circle(0.4)]);
    }

    #[test]
    fn tick_renders_advanced_state() {
        let particle = Particle::new([10.0, 10.0], [1.0, 2.0], 1.0, 0.5, Color::VIOLET);
        let mut field = field_with(100, 100, vec![particle]);
        let mut recorder = Recorder::default();
        field.tick(&mut recorder).unwrap();
        match recorder.circles()[0] {
            Draw::Circle { center, .. } => assert_eq!(*center, [11.0, 12.0]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn render_leaves_state_untouched() {
        let mut rng = seeded(7);
        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        field.initialize(640, 480, &mut rng);
        let before = field.particles().to_vec();
        field.render(&mut Recorder::default()).unwrap();
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let empty = FieldConfig::default().with_palette(Vec::new());
        assert_eq!(ParticleField::new(empty.clone()).err(), Some(ConfigError::EmptyPalette));

        let mut field = ParticleField::new(FieldConfig::default()).unwrap();
        assert_eq!(field.set_config(empty), Err(ConfigError::EmptyPalette));
        assert_eq!(field.config(), &FieldConfig::default());
    }
}
