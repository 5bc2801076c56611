//! Turning emitted IR text into a native executable: `llc` then the system
//! C compiler (spec.md §6's side-effect files and linking step).
//!
//! These are collaborator concerns spec.md §1 explicitly puts out of scope
//! for the core, but a complete crate still needs them built; `pl0c-drv`
//! calls straight into this module rather than shelling out itself.

use std::path::Path;
use std::process::Command;

use crate::error::{CodeGenError, Result};

/// Writes `ir_text` to `bc_path` (spec.md: textual IR despite the `.bc`
/// name), then invokes `llc_path -filetype=obj bc_path -o obj_path`.
pub fn emit_object_file(ir_text: &str, bc_path: &Path, obj_path: &Path, llc_path: &str) -> Result<()> {
    std::fs::write(bc_path, ir_text)?;

    let output = Command::new(llc_path)
        .arg("-filetype=obj")
        .arg(bc_path)
        .arg("-o")
        .arg(obj_path)
        .output()?;

    if !output.status.success() {
        return Err(CodeGenError::LlcFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Links `obj_path` into `out_path` with the system C compiler, matching
/// spec.md §6's `gcc <basename>.o -o <out>`. Honors `$CC` so the same code
/// works on toolchains where `gcc` isn't the system default.
pub fn link_executable(obj_path: &Path, out_path: &Path) -> Result<()> {
    let cc = std::env::var("CC").unwrap_or_else(|_| "gcc".to_string());

    let output = Command::new(&cc).arg(obj_path).arg("-o").arg(out_path).output()?;

    if !output.status.success() {
        return Err(CodeGenError::LinkFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
