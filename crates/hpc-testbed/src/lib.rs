//! Testbed für segmentierte Scans (scan-by-key) auf OpenCL-Geräten.
//!
//! Host-Teil (immer verfügbar): CPU-Referenz, Toleranzregeln, Fixture-Typen,
//! Vergleich und Test-Runner. Geräte-Teil nur mit Feature `opencl`.

pub mod approx;
pub mod cli;
pub mod compare;
pub mod crash;
pub mod runner;
pub mod scan;
pub mod suite;
pub mod udd;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "opencl")]
pub mod buffer;
#[cfg(feature = "opencl")]
pub mod device_scan;
#[cfg(feature = "opencl")]
pub mod kernel;
#[cfg(feature = "opencl")]
pub mod platform;

pub use approx::{ApproxEq, F32_TOLERANCE, F64_TOLERANCE};
pub use cli::{DeviceKind, Options};
pub use compare::{Comparison, Mismatch, compare_slices};
pub use runner::{Outcome, Runner, Summary};
pub use scan::{
    exclusive_scan_by_key, inclusive_scan_by_key, inclusive_scan_by_key_into, segments,
    staircase_keys,
};

#[cfg(feature = "opencl")]
pub use buffer::{DeviceVec, EventGuard, InFlight, Queued, Ready};
#[cfg(feature = "opencl")]
pub use platform::{ClEnv, ClSelection};

// ─── Fehler‑Typ ───────────────────────────────────────────────────────
#[derive(thiserror::Error, Debug)]
pub enum ClError {
    /// OpenCL-Aufruf lieferte einen Statuscode != CL_SUCCESS
    #[error("{call} failed with OpenCL error code {code}")]
    Api { call: &'static str, code: i32 },

    #[error("failed to build kernel `{kernel}` (status {status}, options \"{options}\"):\n{log}")]
    Build {
        kernel: String,
        status: i32,
        options: String,
        log: String,
    },

    #[error("can't open kernel file '{path}' (cwd: {cwd}): {source}")]
    KernelSource {
        path: String,
        cwd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no OpenCL platforms found")]
    NoPlatforms,

    #[error("{what} index {index} out of range ({available} available)")]
    OutOfRange {
        what: &'static str,
        index: usize,
        available: usize,
    },

    #[error("length mismatch: keys={keys}, values={values}")]
    LengthMismatch { keys: usize, values: usize },

    #[error("invalid buffer length: {0}")]
    InvalidSize(usize),

    /// Host-Elementgröße passt nicht zum Kerneltyp
    #[error("{what} element is {host} bytes on the host, kernel type `{kernel_type}` has {device}")]
    ElementSize {
        what: &'static str,
        kernel_type: &'static str,
        host: usize,
        device: usize,
    },
}

/// Statuscode prüfen: `0` ist Erfolg, alles andere wird zu `ClError::Api`.
#[inline]
pub fn cl_check(code: i32, call: &'static str) -> Result<(), ClError> {
    if code == 0 {
        Ok(())
    } else {
        Err(ClError::Api { call, code })
    }
}

/// Makro: wandelt `Result<_, opencl3 ClError>` in `ClError::Api` mit Aufrufnamen
#[cfg(feature = "opencl")]
macro_rules! cl_try {
    ($expr:expr, $call:literal) => {
        ($expr).map_err(|e: opencl3::error_codes::ClError| crate::ClError::Api {
            call: $call,
            code: e.0,
        })?
    };
}
#[cfg(feature = "opencl")]
pub(crate) use cl_try;

#[cfg(feature = "opencl")]
impl From<opencl3::error_codes::ClError> for ClError {
    fn from(err: opencl3::error_codes::ClError) -> Self {
        ClError::Api {
            call: "OpenCL",
            code: err.0,
        }
    }
}

impl From<i32> for ClError {
    fn from(code: i32) -> Self {
        ClError::Api {
            call: "OpenCL",
            code,
        }
    }
}
