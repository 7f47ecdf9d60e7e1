//! Kommandozeilenoptionen des Scan-by-Key-Testprogramms.

use clap::{ArgAction, Parser};

/// Scan-by-key test command line options
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "scan-by-key-test")]
#[command(about = "Scan-by-key correctness tests against a CPU reference")]
#[command(version)]
pub struct Options {
    /// Print queryable platform and device info and return
    #[arg(short = 'q', long = "query-opencl")]
    pub query_opencl: bool,

    /// Specify the platform under test
    #[arg(short, long, default_value_t = 0)]
    pub platform: usize,

    /// Specify the device under test
    #[arg(short, long, default_value_t = 0)]
    pub device: usize,

    /// Only consider GPU devices
    #[arg(long, conflicts_with_all = ["cpu", "all"])]
    pub gpu: bool,

    /// Only consider CPU devices
    #[arg(long, conflicts_with = "all")]
    pub cpu: bool,

    /// Consider every device type (default)
    #[arg(long)]
    pub all: bool,

    /// Run only tests whose name contains this substring
    #[arg(long)]
    pub filter: Option<String>,

    /// List registered tests and return
    #[arg(long)]
    pub list: bool,

    /// Number of elements for device tests
    #[arg(long, default_value_t = 1 << 4)]
    pub length: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Welche Gerätetypen berücksichtigt werden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    All,
    Gpu,
    Cpu,
}

impl Options {
    pub fn kind(&self) -> DeviceKind {
        if self.gpu {
            DeviceKind::Gpu
        } else if self.cpu {
            DeviceKind::Cpu
        } else {
            DeviceKind::All
        }
    }

    /// Standard-Filterdirektive für `tracing_subscriber::EnvFilter`
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
