//! Build script to generate build-time information

use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build date and git sha surface in /health/detailed
    EmitBuilder::builder().build_date().git_sha(true).emit()?;

    Ok(())
}
