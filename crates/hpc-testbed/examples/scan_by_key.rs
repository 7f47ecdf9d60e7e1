// Einzelner Scan-by-Key auf dem ersten Gerät, Ergebnis gegen die CPU-Referenz.
//
//   cargo run -p hpc-testbed --features opencl --example scan_by_key

use std::rc::Rc;

use hpc_testbed::device_scan::{DeviceScan, ScanProgram};
use hpc_testbed::{ClEnv, ClError, ClSelection, compare_slices, inclusive_scan_by_key, staircase_keys};

#[cfg(feature = "metrics")]
use hpc_testbed::metrics::summary;

fn main() -> Result<(), ClError> {
    /* ---------- 1. OpenCL-Setup ---------------------------------- */
    let env = Rc::new(ClEnv::init(&ClSelection::default())?);
    println!("device: {}", env.info);

    /* ---------- 2. Hostdaten ------------------------------------- */
    let n       = 1 << 12;
    let keys    = staircase_keys(n, 1_i32, |k| k + 1);
    let vals: Vec<f32> = (0..n).map(|i| (i % 7) as f32 * 0.125).collect();

    /* ---------- 3. Gerät + Referenz ------------------------------ */
    let scan     = DeviceScan::new(Rc::clone(&env), ScanProgram::F32_ADD)?;
    let actual   = scan.inclusive_scan_by_key(&keys, &vals)?;
    let expected = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |a, b| a + b)?;

    /* ---------- 4. Verifizieren & Ausgabe ----------------------- */
    let cmp = compare_slices(&expected, &actual);
    println!(
        "scan_by_key n={n}: {} mismatches, last = {}",
        cmp.mismatches.len(),
        actual[n - 1]
    );

    #[cfg(feature = "metrics")]
    summary();

    Ok(())
}
