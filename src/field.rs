//! Vector fields defined by a pair of bivariate functions.
//!
//! Each component is carried twice: as a Rust closure, evaluated on the host
//! by the [`VectorFieldSampler`](crate::VectorFieldSampler), and as a WGSL
//! expression in the variable `p: vec2<f32>`, spliced into the particle
//! kernel. The two must describe the same function.
//!
//! # Example
//!
//! ```ignore
//! use fieldflow::{BivariateFunction, VectorField};
//!
//! // (x, y) -> (sin(y), x / 2)
//! let field = VectorField::new(
//!     BivariateFunction::new(|p| p.y.sin(), "sin(p.y)"),
//!     BivariateFunction::new(|p| p.x * 0.5, "p.x * 0.5"),
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use glam::Vec2;

/// A scalar function of a cartesian point.
#[derive(Clone)]
pub struct BivariateFunction {
    function: Arc<dyn Fn(Vec2) -> f32 + Send + Sync>,
    wgsl: String,
}

impl BivariateFunction {
    /// Pair a host closure with its WGSL equivalent.
    pub fn new<F>(function: F, wgsl: impl Into<String>) -> Self
    where
        F: Fn(Vec2) -> f32 + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            wgsl: wgsl.into(),
        }
    }

    /// The constant function.
    pub fn constant(value: f32) -> Self {
        Self::new(move |_| value, format!("{value:?}"))
    }

    pub fn evaluate(&self, point: Vec2) -> f32 {
        (self.function)(point)
    }

    /// WGSL expression in `p`.
    pub fn wgsl(&self) -> &str {
        &self.wgsl
    }
}

impl fmt::Debug for BivariateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BivariateFunction")
            .field("wgsl", &self.wgsl)
            .finish_non_exhaustive()
    }
}

/// A 2D vector field: one function per component.
#[derive(Clone, Debug)]
pub struct VectorField {
    x_function: BivariateFunction,
    y_function: BivariateFunction,
}

impl VectorField {
    pub fn new(x_function: BivariateFunction, y_function: BivariateFunction) -> Self {
        Self {
            x_function,
            y_function,
        }
    }

    /// Zero everywhere.
    pub fn zero() -> Self {
        Self::new(BivariateFunction::constant(0.0), BivariateFunction::constant(0.0))
    }

    /// Counter-clockwise rotation about the origin: (-y, x).
    pub fn rotation() -> Self {
        Self::new(
            BivariateFunction::new(|p| -p.y, "-p.y"),
            BivariateFunction::new(|p| p.x, "p.x"),
        )
    }

    /// Saddle point at the origin: (x, -y).
    pub fn saddle() -> Self {
        Self::new(
            BivariateFunction::new(|p| p.x, "p.x"),
            BivariateFunction::new(|p| -p.y, "-p.y"),
        )
    }

    /// Flow outward from the origin: (x, y).
    pub fn source() -> Self {
        Self::new(
            BivariateFunction::new(|p| p.x, "p.x"),
            BivariateFunction::new(|p| p.y, "p.y"),
        )
    }

    /// Flow into the origin: (-x, -y).
    pub fn sink() -> Self {
        Self::new(
            BivariateFunction::new(|p| -p.x, "-p.x"),
            BivariateFunction::new(|p| -p.y, "-p.y"),
        )
    }

    /// Interfering sine waves: (sin(y), sin(x)).
    pub fn waves() -> Self {
        Self::new(
            BivariateFunction::new(|p| p.y.sin(), "sin(p.y)"),
            BivariateFunction::new(|p| p.x.sin(), "sin(p.x)"),
        )
    }

    pub fn x_function(&self) -> &BivariateFunction {
        &self.x_function
    }

    pub fn y_function(&self) -> &BivariateFunction {
        &self.y_function
    }

    /// Field direction at a cartesian point.
    pub fn evaluate(&self, point: Vec2) -> Vec2 {
        Vec2::new(self.x_function.evaluate(point), self.y_function.evaluate(point))
    }

    /// WGSL definition of `fn field(p: vec2<f32>) -> vec2<f32>`.
    pub fn to_wgsl(&self) -> String {
        format!(
            r#"fn field(p: vec2<f32>) -> vec2<f32> {{
    return vec2<f32>({x}, {y});
}}
"#,
            x = self.x_function.wgsl(),
            y = self.y_function.wgsl(),
        )
    }
}
