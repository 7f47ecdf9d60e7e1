#![cfg(feature = "metrics")]

use once_cell::sync::Lazy;
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

/* ───────────── Roh‑Latenzen ─────────────────────────── */

static TIMES: Lazy<Mutex<Vec<(&'static str, u128)>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// Im Wrapper aufrufen: `record("upload", Instant::now());`
pub fn record(name: &'static str, start: Instant) {
    let dur = start.elapsed().as_micros();
    if let Ok(mut times) = TIMES.lock() {
        times.push((name, dur));
    }
}

/* ───────────── Transfer‑Volumen ──────────────────────── */

pub static BYTES_UP:   AtomicUsize = AtomicUsize::new(0);
pub static BYTES_DOWN: AtomicUsize = AtomicUsize::new(0);

/// Statistik je Aufrufname: (Anzahl, Mittel µs, p95 µs)
pub fn snapshot() -> BTreeMap<&'static str, (usize, u128, u128)> {
    let mut map: BTreeMap<&'static str, Vec<u128>> = BTreeMap::new();
    if let Ok(times) = TIMES.lock() {
        for &(name, us) in times.iter() {
            map.entry(name).or_default().push(us);
        }
    }
    map.into_iter()
        .map(|(name, mut v)| {
            v.sort_unstable();
            let mean = v.iter().sum::<u128>() / v.len() as u128;
            let p95 = v[((v.len() * 95) / 100).saturating_sub(1)];
            (name, (v.len(), mean, p95))
        })
        .collect()
}

/* ───────────── Zusammenfassung ausgeben ─────────────── */

/// Am Programmende aufrufen, z. B. in `main()`
pub fn summary() {
    println!("── metrics summary ──");
    for (name, (n, mean, p95)) in snapshot() {
        println!("{:<18} n={:>4} mean={:>6} µs   p95={:>6} µs", name, n, mean, p95);
    }
    let up = BYTES_UP.load(Ordering::Relaxed);
    let down = BYTES_DOWN.load(Ordering::Relaxed);
    println!("H2D: {} KiB   D2H: {} KiB", up / 1024, down / 1024);
}
