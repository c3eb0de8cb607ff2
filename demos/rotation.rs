//! Counter-clockwise rotation about the origin.
//!
//! Run with: `cargo run --example rotation`
//!
//! Drag to pan, scroll to zoom. Set `RUST_LOG=fieldflow=debug` to follow
//! viewport changes.

use fieldflow::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = Visualizer::new(VectorField::rotation())
        .with_title("fieldflow - rotation")
        .run();

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
