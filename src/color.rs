//! Colour ramps for magnitude shading.

use glam::Vec3;

/// An 8-bit RGBA colour, as handed to the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert from linear 0.0-1.0 components, clamping out-of-range values.
    pub fn from_vec3(color: Vec3) -> Self {
        let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        Self::rgb(c.x.round() as u8, c.y.round() as u8, c.z.round() as u8)
    }

    /// Components as 0.0-1.0 floats.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Background behind the plot.
pub const BACKGROUND_COLOUR: Color = Color::rgb(20, 20, 24);

/// Axes and labels.
pub const FOREGROUND_COLOUR: Color = Color::rgb(220, 220, 220);

/// Particle markers.
pub const PARTICLE_COLOUR: Color = Color::rgb(100, 100, 100);

/// Colour ramps for mapping a normalized magnitude to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Blue through cyan, green and yellow to red (default).
    #[default]
    Heat,

    /// Viridis - perceptually uniform, colorblind-friendly (purple to yellow).
    Viridis,

    /// Magma - perceptually uniform (black to yellow through red).
    Magma,

    /// Ocean - cool blues and teals.
    Ocean,

    /// Grayscale - black to white.
    Grayscale,
}

impl Palette {
    /// Get the color stops for this palette (5 colors).
    pub fn colors(&self) -> [Vec3; 5] {
        match self {
            Palette::Heat => [
                Vec3::new(0.0, 0.0, 1.0), // Blue
                Vec3::new(0.0, 1.0, 1.0), // Cyan
                Vec3::new(0.0, 1.0, 0.0), // Green
                Vec3::new(1.0, 1.0, 0.0), // Yellow
                Vec3::new(1.0, 0.0, 0.0), // Red
            ],
            Palette::Viridis => [
                Vec3::new(0.267, 0.004, 0.329), // Dark purple
                Vec3::new(0.282, 0.140, 0.458), // Purple
                Vec3::new(0.127, 0.566, 0.551), // Teal
                Vec3::new(0.369, 0.789, 0.383), // Green
                Vec3::new(0.993, 0.906, 0.144), // Yellow
            ],
            Palette::Magma => [
                Vec3::new(0.001, 0.0, 0.014),   // Black
                Vec3::new(0.329, 0.071, 0.435), // Purple
                Vec3::new(0.716, 0.215, 0.475), // Pink
                Vec3::new(0.994, 0.541, 0.380), // Orange
                Vec3::new(0.987, 0.991, 0.749), // Light yellow
            ],
            Palette::Ocean => [
                Vec3::new(0.0, 0.05, 0.15),
                Vec3::new(0.0, 0.2, 0.4),
                Vec3::new(0.0, 0.4, 0.6),
                Vec3::new(0.2, 0.6, 0.8),
                Vec3::new(0.6, 0.85, 1.0),
            ],
            Palette::Grayscale => [
                Vec3::new(0.0, 0.0, 0.0), // Black
                Vec3::new(0.25, 0.25, 0.25),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.75, 0.75, 0.75),
                Vec3::new(1.0, 1.0, 1.0), // White
            ],
        }
    }

    /// Colour at `t` along the ramp, linearly interpolated between stops.
    ///
    /// `t` is clamped to 0.0-1.0; NaN maps to the first stop.
    pub fn sample(&self, t: f32) -> Color {
        let stops = self.colors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let scaled = t * (stops.len() - 1) as f32;
        let index = (scaled.floor() as usize).min(stops.len() - 2);
        let local = scaled - index as f32;

        Color::from_vec3(stops[index].lerp(stops[index + 1], local))
    }
}
