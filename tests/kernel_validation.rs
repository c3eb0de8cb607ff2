//! The particle kernel must compile with every field the crate ships and with
//! user-style custom fields.

use fieldflow::constants::KERNEL_FILE_PATH;
use fieldflow::gpu::load_kernel_source;
use fieldflow::{BivariateFunction, KernelError, VectorField};
use std::path::Path;

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn kernel_for(field: &VectorField) -> String {
    load_kernel_source(Path::new(KERNEL_FILE_PATH), field)
        .unwrap_or_else(|e| panic!("kernel should load: {e}"))
}

#[test]
fn test_kernel_compiles_with_every_preset() {
    for (name, field) in [
        ("zero", VectorField::zero()),
        ("rotation", VectorField::rotation()),
        ("saddle", VectorField::saddle()),
        ("source", VectorField::source()),
        ("sink", VectorField::sink()),
        ("waves", VectorField::waves()),
    ] {
        let source = kernel_for(&field);
        if let Err(e) = validate_wgsl(&source) {
            panic!("kernel with {name} field failed:\n{e}");
        }
    }
}

#[test]
fn test_kernel_compiles_with_custom_field() {
    let field = VectorField::new(
        BivariateFunction::new(|p| p.x * p.y, "p.x * p.y"),
        BivariateFunction::new(|p| (p.x - p.y).cos(), "cos(p.x - p.y)"),
    );
    validate_wgsl(&kernel_for(&field)).unwrap();
}

#[test]
fn test_kernel_entry_point_and_workgroup_size() {
    let module = validate_wgsl(&kernel_for(&VectorField::rotation())).unwrap();

    let main = module
        .entry_points
        .iter()
        .find(|ep| ep.name == "main")
        .expect("kernel has a main entry point");
    assert_eq!(main.stage, naga::ShaderStage::Compute);
    assert_eq!(main.workgroup_size, [256, 1, 1]);
}

#[test]
fn test_kernel_without_field_is_rejected() {
    let kernel = std::fs::read_to_string(KERNEL_FILE_PATH).unwrap();
    assert!(validate_wgsl(&kernel).is_err());
}

#[test]
fn test_broken_field_expression_is_rejected() {
    let field = VectorField::new(
        BivariateFunction::new(|p| p.x, "p.x +"),
        BivariateFunction::constant(0.0),
    );
    assert!(validate_wgsl(&kernel_for(&field)).is_err());
}

#[test]
fn test_missing_kernel_reports_path() {
    let err = load_kernel_source(Path::new("kernels/nope.wgsl"), &VectorField::zero()).unwrap_err();
    match err {
        KernelError::Io { path, .. } => assert_eq!(path, Path::new("kernels/nope.wgsl")),
        other => panic!("expected io error, got {other}"),
    }
}
