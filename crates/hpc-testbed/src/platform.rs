//! Plattform- und Geräteauswahl, Kontext und Queue für den Testlauf.

use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    device::{CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_GPU, Device},
    error_codes::{CL_DEVICE_NOT_FOUND, ClError as RawClError},
    platform::{Platform, get_platforms},
    types::cl_device_type,
};
use tracing::{debug, info};

use crate::{ClError, DeviceKind, Options, cl_try};

impl DeviceKind {
    pub fn cl_type(self) -> cl_device_type {
        match self {
            DeviceKind::All => CL_DEVICE_TYPE_ALL,
            DeviceKind::Gpu => CL_DEVICE_TYPE_GPU,
            DeviceKind::Cpu => CL_DEVICE_TYPE_CPU,
        }
    }
}

/// Welche Plattform / welches Gerät getestet wird
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClSelection {
    pub platform: usize,
    pub device: usize,
    pub kind: DeviceKind,
}

impl From<&Options> for ClSelection {
    fn from(o: &Options) -> Self {
        Self { platform: o.platform, device: o.device, kind: o.kind() }
    }
}

/// Abfragbare Geräteinformationen (für `--query-opencl`)
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub kind: &'static str,
    pub compute_units: u32,
    pub max_clock_mhz: u32,
    pub global_mem_bytes: u64,
    pub max_work_group_size: usize,
    pub fp64: bool,
}

impl DeviceInfo {
    pub fn of(device: &Device) -> Self {
        let ty = device.dev_type().unwrap_or(0);
        let kind = if ty & CL_DEVICE_TYPE_GPU != 0 {
            "GPU"
        } else if ty & CL_DEVICE_TYPE_CPU != 0 {
            "CPU"
        } else {
            "other"
        };
        Self {
            name: device.name().unwrap_or_default().trim().to_string(),
            vendor: device.vendor().unwrap_or_default().trim().to_string(),
            version: device.version().unwrap_or_default().trim().to_string(),
            kind,
            compute_units: device.max_compute_units().unwrap_or(0),
            max_clock_mhz: device.max_clock_frequency().unwrap_or(0),
            global_mem_bytes: device.global_mem_size().unwrap_or(0),
            max_work_group_size: device.max_work_group_size().unwrap_or(1),
            fp64: device.double_fp_config().map(|c| c != 0).unwrap_or(false),
        }
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] CU={} Freq={}Mhz Mem={}MiB WG={} fp64={}",
            self.name,
            self.kind,
            self.compute_units,
            self.max_clock_mhz,
            self.global_mem_bytes / (1024 * 1024),
            self.max_work_group_size,
            if self.fp64 { "yes" } else { "no" },
        )
    }
}

fn platforms() -> Result<Vec<Platform>, ClError> {
    let list = cl_try!(get_platforms(), "clGetPlatformIDs");
    if list.is_empty() {
        return Err(ClError::NoPlatforms);
    }
    info!("found {} OpenCL platform(s)", list.len());
    Ok(list)
}

/// `CL_DEVICE_NOT_FOUND` heißt nur: keine Geräte dieses Typs
fn none_found_is_empty<T>(r: Result<Vec<T>, RawClError>) -> Result<Vec<T>, ClError> {
    match r {
        Err(RawClError(CL_DEVICE_NOT_FOUND)) => Ok(Vec::new()),
        other => Ok(cl_try!(other, "clGetDeviceIDs")),
    }
}

fn devices_of(platform: &Platform, kind: DeviceKind) -> Result<Vec<Device>, ClError> {
    let ids = none_found_is_empty(platform.get_devices(kind.cl_type()))?;
    Ok(ids.into_iter().map(Device::new).collect())
}

/// Alle Plattformen und Geräte ausgeben.
pub fn query(kind: DeviceKind) -> Result<(), ClError> {
    for (p, platform) in platforms()?.iter().enumerate() {
        println!(
            "Platform #{p}: {} | {} | {}",
            platform.name().unwrap_or_default(),
            platform.vendor().unwrap_or_default(),
            platform.version().unwrap_or_default(),
        );
        // Plattform ohne passende Geräte ist kein Fehler
        let devices = devices_of(platform, kind).unwrap_or_default();
        if devices.is_empty() {
            println!("    (no devices)");
        }
        for (d, device) in devices.iter().enumerate() {
            let info = DeviceInfo::of(device);
            println!("    Device #{d}: {info}");
            println!("        vendor: {}  version: {}", info.vendor, info.version);
        }
    }
    Ok(())
}

/// Eine Plattform, ein Gerät, ein Kontext, eine Queue.
pub struct ClEnv {
    pub device: Device,
    pub context: Context,
    pub queue: CommandQueue,
    pub info: DeviceInfo,
    pub platform_name: String,
}

impl std::fmt::Debug for ClEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClEnv")
            .field("platform", &self.platform_name)
            .field("device", &self.info.name)
            .finish_non_exhaustive()
    }
}

impl ClEnv {
    pub fn init(sel: &ClSelection) -> Result<Self, ClError> {
        let list = platforms()?;
        let platform = list.get(sel.platform).ok_or(ClError::OutOfRange {
            what: "platform",
            index: sel.platform,
            available: list.len(),
        })?;
        let platform_name = platform.name().unwrap_or_default();
        debug!("selected platform #{}: {}", sel.platform, platform_name);

        let mut devices = devices_of(platform, sel.kind)?;
        let available = devices.len();
        if sel.device >= available {
            return Err(ClError::OutOfRange { what: "device", index: sel.device, available });
        }
        let device = devices.swap_remove(sel.device);
        let info = DeviceInfo::of(&device);
        info!("selected device #{}: {}", sel.device, info);

        let context = cl_try!(Context::from_device(&device), "clCreateContext");
        // OpenCL-1.2-API, damit auch ältere Treiber funktionieren
        #[allow(deprecated)]
        let queue = cl_try!(CommandQueue::create_default(&context, 0), "clCreateCommandQueue");

        Ok(Self { device, context, queue, info, platform_name })
    }

    pub fn device_name(&self) -> &str {
        &self.info.name
    }

    pub fn supports_fp64(&self) -> bool {
        self.info.fp64
    }
}
