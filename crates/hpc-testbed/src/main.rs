//! Scan-by-Key-Testprogramm: wählt Plattform/Gerät, baut die Kernel und
//! vergleicht Geräteergebnisse gegen die CPU-Referenz.
//!
//! ```bash
//! cargo run -p hpc-testbed --features opencl -- --query-opencl
//! cargo run -p hpc-testbed --features opencl -- -p 0 -d 1 --filter MixedM3
//! ```

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hpc_testbed::{ClEnv, ClSelection, Options, Runner, crash, platform, suite};

fn main() -> Result<ExitCode> {
    // 1. Absturzprotokoll vor allem anderen
    crash::install();

    let opts = Options::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(opts.log_directive())),
        )
        .with_target(false)
        .init();

    // 2. nur Plattform-/Geräteinfo
    if opts.query_opencl {
        platform::query(opts.kind()).context("querying OpenCL platforms")?;
        return Ok(ExitCode::SUCCESS);
    }

    // 3. Referenzfälle; --list braucht kein Gerät
    let mut runner = Runner::new();
    suite::register_reference(&mut runner);

    if opts.list {
        for name in suite::listing(&runner, opts.filter.as_deref()) {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    // 4. Gerät, Kontext, Queue, dann Gerätefälle
    let sel = ClSelection::from(&opts);
    let env = Rc::new(
        ClEnv::init(&sel)
            .with_context(|| format!("platform #{} / device #{}", sel.platform, sel.device))?,
    );
    println!("Device under test : {}", env.device_name());
    suite::register_device(&mut runner, env, opts.length);

    // 5. Ausführen + Bilanz
    let summary = runner.run(opts.filter.as_deref());
    summary.print();

    #[cfg(feature = "metrics")]
    hpc_testbed::metrics::summary();

    Ok(if summary.exit_code() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
