//! Saddle point, coloured with the viridis ramp.
//!
//! Run with: `cargo run --example saddle`

use fieldflow::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = Visualizer::new(VectorField::saddle())
        .with_title("fieldflow - saddle")
        .with_palette(Palette::Viridis)
        .run();

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
