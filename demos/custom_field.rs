//! A user-defined field: a damped spiral.
//!
//! Each component is given twice, as a Rust closure for the arrow grid and as
//! the same expression in WGSL for the particle kernel. The two must agree or
//! the particles will drift across the arrows.
//!
//! Run with: `cargo run --example custom_field`

use fieldflow::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let spiral = VectorField::new(
        BivariateFunction::new(|p| -p.y - 0.2 * p.x, "-p.y - 0.2 * p.x"),
        BivariateFunction::new(|p| p.x - 0.2 * p.y, "p.x - 0.2 * p.y"),
    );

    let result = Visualizer::new(spiral)
        .with_title("fieldflow - damped spiral")
        .with_palette(Palette::Magma)
        .with_particle_count(20_000)
        .run();

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
