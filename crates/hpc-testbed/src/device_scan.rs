//! Geräteseitiger inklusiver Scan-by-Key (das getestete Gegenstück zur
//! CPU-Referenz in [`crate::scan`]).

use std::mem::size_of;
use std::rc::Rc;

use bytemuck::Pod;
use opencl3::{kernel::{ExecuteKernel, Kernel}, types::cl_uint};
use tracing::debug;

#[cfg(feature = "metrics")]
use crate::metrics::record;
#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::buffer::{DeviceVec, EventGuard, Queued};
use crate::platform::ClEnv;
use crate::udd::{OPENCL_TYPES, UddtD4, UddtI2, UddtM2, UddtM3};
use crate::{ClError, cl_try, kernel};

const SCAN_BY_KEY_SRC: &str = include_str!("../kernels/scan_by_key.cl");
const KERNEL_NAME: &str = "scan_by_key";

/// Typen und Verknüpfungen, mit denen der Kernel instanziiert wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgram {
    pub key_type: &'static str,
    pub value_type: &'static str,
    /// OpenCL-Ausdruck in `a`, `b`
    pub key_eq: &'static str,
    /// OpenCL-Ausdruck in `a`, `b`
    pub combine: &'static str,
    pub needs_fp64: bool,
    /// `sizeof(KEY_T)` bzw. `sizeof(VAL_T)` auf dem Gerät
    pub key_size: usize,
    pub value_size: usize,
}

impl ScanProgram {
    pub const I32_ADD: Self = Self {
        key_type: "int",
        value_type: "int",
        key_eq: "((a) == (b))",
        combine: "((a) + (b))",
        needs_fp64: false,
        key_size: size_of::<i32>(),
        value_size: size_of::<i32>(),
    };
    pub const F32_ADD: Self = Self {
        key_type: "int",
        value_type: "float",
        key_eq: "((a) == (b))",
        combine: "((a) + (b))",
        needs_fp64: false,
        key_size: size_of::<i32>(),
        value_size: size_of::<f32>(),
    };
    pub const I2_ADD: Self = Self {
        key_type: "int",
        value_type: "uddtI2",
        key_eq: "((a) == (b))",
        combine: "add_i2((a), (b))",
        needs_fp64: false,
        key_size: size_of::<i32>(),
        value_size: size_of::<UddtI2>(),
    };
    pub const D4_MULT: Self = Self {
        key_type: "int",
        value_type: "uddtD4",
        key_eq: "((a) == (b))",
        combine: "mult_d4((a), (b))",
        needs_fp64: true,
        key_size: size_of::<i32>(),
        value_size: size_of::<UddtD4>(),
    };
    pub const M3_MIX: Self = Self {
        key_type: "uddtM2",
        value_type: "uddtM3",
        key_eq: "m2_equal_to((a), (b))",
        combine: "mix_m3((a), (b))",
        needs_fp64: true,
        key_size: size_of::<UddtM2>(),
        value_size: size_of::<UddtM3>(),
    };

    /// Host-Typen `K`/`V` müssen elementweise so groß sein wie `KEY_T`/`VAL_T`,
    /// sonst liest oder schreibt der Kernel über die Puffer hinaus.
    pub fn check_layout<K, V>(&self) -> Result<(), ClError> {
        if size_of::<K>() != self.key_size {
            return Err(ClError::ElementSize {
                what: "key",
                kernel_type: self.key_type,
                host: size_of::<K>(),
                device: self.key_size,
            });
        }
        if size_of::<V>() != self.value_size {
            return Err(ClError::ElementSize {
                what: "value",
                kernel_type: self.value_type,
                host: size_of::<V>(),
                device: self.value_size,
            });
        }
        Ok(())
    }

    /// vollständiger Quelltext: Typen + Makros + Kernelkörper
    pub fn source(&self) -> String {
        format!(
            "{OPENCL_TYPES}\n\
             #define KEY_T {}\n\
             #define VAL_T {}\n\
             #define KEY_EQ(a, b) {}\n\
             #define COMBINE(a, b) {}\n\
             {SCAN_BY_KEY_SRC}",
            self.key_type, self.value_type, self.key_eq, self.combine
        )
    }
}

/// Ein für `program` gebauter Kernel auf einem Gerät.
pub struct DeviceScan {
    env: Rc<ClEnv>,
    kernel: Kernel,
    program: ScanProgram,
}

impl std::fmt::Debug for DeviceScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceScan")
            .field("device", &self.env.device_name())
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl DeviceScan {
    pub fn new(env: Rc<ClEnv>, program: ScanProgram) -> Result<Self, ClError> {
        let kernel = kernel::build(
            &env.context,
            &env.device,
            &program.source(),
            KERNEL_NAME,
            "",
        )?;
        Ok(Self { env, kernel, program })
    }

    pub fn program(&self) -> &ScanProgram {
        &self.program
    }

    /// Inklusiver Scan auf dem Gerät; Schlüsselgleichheit und Verknüpfung
    /// kommen aus dem [`ScanProgram`].
    pub fn inclusive_scan_by_key<K: Pod, V: Pod>(
        &self,
        keys: &[K],
        values: &[V],
    ) -> Result<Vec<V>, ClError> {
        self.program.check_layout::<K, V>()?;
        if keys.len() != values.len() {
            return Err(ClError::LengthMismatch { keys: keys.len(), values: values.len() });
        }
        let n = keys.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        let n_arg = cl_uint::try_from(n).map_err(|_| ClError::InvalidSize(n))?;

        let (ctx, queue) = (&self.env.context, &self.env.queue);
        let d_keys = DeviceVec::<K, Queued>::from_slice(ctx, queue, keys)?;
        let d_vals = DeviceVec::<V, Queued>::from_slice(ctx, queue, values)?;
        let d_out = DeviceVec::<V, Queued>::new(ctx, n)?.launch();

        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let evt = cl_try!(
            unsafe {
                ExecuteKernel::new(&self.kernel)
                    .set_arg(d_keys.raw())
                    .set_arg(d_vals.raw())
                    .set_arg(d_out.raw())
                    .set_arg(&n_arg)
                    .set_global_work_size(n)
                    .enqueue_nd_range(queue)
            },
            "clEnqueueNDRangeKernel"
        );
        let d_out = d_out.into_ready(EventGuard::new(evt))?;

        #[cfg(feature = "metrics")]
        record("scan_by_key_kernel", t);

        debug!(n, value_type = self.program.value_type, "device scan finished");
        d_out.read(queue)
    }
}

/// `int`-Schlüssel, `int`-Werte, Addition
pub fn inclusive_scan_by_key_i32_add(
    env: Rc<ClEnv>,
    keys: &[i32],
    values: &[i32],
) -> Result<Vec<i32>, ClError> {
    DeviceScan::new(env, ScanProgram::I32_ADD)?.inclusive_scan_by_key(keys, values)
}

/// `int`-Schlüssel, `float`-Werte, Addition
pub fn inclusive_scan_by_key_f32_add(
    env: Rc<ClEnv>,
    keys: &[i32],
    values: &[f32],
) -> Result<Vec<f32>, ClError> {
    DeviceScan::new(env, ScanProgram::F32_ADD)?.inclusive_scan_by_key(keys, values)
}
