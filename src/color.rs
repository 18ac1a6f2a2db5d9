// Simple color struct, created from an unsigned 32 representing RRGGBBAA

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Deep violet, the first swatch of the background palette.
    pub const VIOLET: Color = Color::from_u32(0x7347a6ff);
    /// Pale lilac, the second swatch.
    pub const LILAC: Color = Color::from_u32(0xb9a4e7ff);
    /// Light lavender used for every connection line.
    pub const LAVENDER: Color = Color::from_u32(0xc4b5fdff);

    pub const fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    // Own alpha channel scaled by `alpha`, clamped to [0, 1]
    pub fn alpha_with(self, alpha: f64) -> f64 {
        (self.a as f64 / 255.0 * alpha).max(0.0).min(1.0)
    }

    /// CSS `rgba()` string with the given alpha multiplied into the color's own alpha.
    pub fn to_css(self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            self.alpha_with(alpha)
        )
    }
}

pub fn default_palette() -> Vec<Color> {
    vec![Color::VIOLET, Color::LILAC]
}
