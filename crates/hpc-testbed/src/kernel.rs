//! Kernel aus Quelltext bauen; bei Fehlern Build-Log zurückgeben.

use std::path::Path;

use opencl3::{context::Context, device::Device, kernel::Kernel, program::Program};
use tracing::{debug, error};

#[cfg(feature = "metrics")]
use crate::metrics::record;
#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::{ClError, cl_try};

/// Quelltext von Platte lesen.
pub fn load_source(path: impl AsRef<Path>) -> Result<String, ClError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ClError::KernelSource {
        path: path.display().to_string(),
        cwd: std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|_| "<unknown>".to_string()),
        source,
    })
}

/// Programm für genau ein Gerät bauen und Kernel `name` daraus erzeugen.
pub fn build(
    context: &Context,
    device: &Device,
    source: &str,
    name: &str,
    options: &str,
) -> Result<Kernel, ClError> {
    #[cfg(feature = "metrics")]
    let t = Instant::now();

    let mut program = cl_try!(
        Program::create_from_source(context, source),
        "clCreateProgramWithSource"
    );

    if let Err(e) = program.build(&[device.id()], options) {
        let log = program.get_build_log(device.id()).unwrap_or_default();
        let status = program.get_build_status(device.id()).unwrap_or(e.0);
        error!(kernel = name, code = e.0, "program build failed");
        return Err(ClError::Build {
            kernel: name.to_string(),
            status,
            options: options.to_string(),
            log,
        });
    }
    debug!(kernel = name, options, "program built");

    let kernel = cl_try!(Kernel::create(&program, name), "clCreateKernel");

    #[cfg(feature = "metrics")]
    record("build_kernel", t);

    Ok(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path_and_cwd() {
        let err = load_source("does/not/exist.cl").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("does/not/exist.cl"), "{msg}");
        assert!(msg.contains("cwd:"), "{msg}");
    }

    #[test]
    fn shipped_kernel_is_readable() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/kernels/scan_by_key.cl");
        let src = load_source(path).unwrap();
        assert!(src.contains("__kernel void scan_by_key"));
    }

    #[test]
    fn broken_source_returns_build_log() {
        let Ok(env) = crate::ClEnv::init(&crate::ClSelection::default()) else {
            return; // kein OpenCL-Gerät
        };
        let err = build(&env.context, &env.device, "__kernel void k( { }", "k", "").unwrap_err();
        match err {
            ClError::Build { kernel, .. } => assert_eq!(kernel, "k"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
