//! Minimaler Test-Runner: registrieren, filtern, ausführen, zählen.
//!
//! Ein fehlschlagender oder panischer Fall hält die übrigen nicht an; die
//! Bilanz wird am Ende ausgegeben und bestimmt den Exit-Code.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

type CaseFn = Box<dyn Fn() -> Outcome>;

struct Case {
    name: String,
    run: CaseFn,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub passed: usize,
    pub failed: Vec<String>,
    pub skipped: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed.len() + self.skipped
    }

    /// 0 ohne Fehlschläge, sonst 1
    pub fn exit_code(&self) -> i32 {
        if self.failed.is_empty() { 0 } else { 1 }
    }

    pub fn print(&self) {
        println!(
            "\n{} tests run: {} passed, {} failed, {} skipped",
            self.total(),
            self.passed,
            self.failed.len(),
            self.skipped
        );
        if self.failed.is_empty() {
            return;
        }
        for name in &self.failed {
            println!("  FAILED  {name}");
        }
        println!("\nFailed tests detected in test pass; please run test again with:");
        println!("\t--filter=<XXX> to select a specific failing test of interest, or");
        println!("\tRUST_BACKTRACE=1 to capture the panic backtrace of a failing test");
    }
}

#[derive(Default)]
pub struct Runner {
    cases: Vec<Case>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name in der Form `Gruppe.Fall`
    pub fn add<F>(&mut self, name: impl Into<String>, run: F)
    where
        F: Fn() -> Outcome + 'static,
    {
        self.cases.push(Case {
            name: name.into(),
            run: Box::new(run),
        });
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Namen, die `filter` auswählt, in Registrierungsreihenfolge
    pub fn matching(&self, filter: Option<&str>) -> Vec<&str> {
        self.names().filter(|n| selects(n, filter)).collect()
    }

    /// Alle Fälle ausführen, deren Name `filter` enthält (`None` = alle).
    pub fn run(&self, filter: Option<&str>) -> Summary {
        let mut summary = Summary::default();
        for case in &self.cases {
            if !selects(&case.name, filter) {
                debug!(test = %case.name, "filtered out");
                continue;
            }

            println!("[ RUN      ] {}", case.name);
            let t = Instant::now();
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (case.run)())) {
                Ok(o) => o,
                Err(payload) => Outcome::Failed(format!("panicked: {}", panic_message(&*payload))),
            };
            let ms = t.elapsed().as_millis();

            match outcome {
                Outcome::Passed => {
                    summary.passed += 1;
                    println!("[       OK ] {} ({ms} ms)", case.name);
                }
                Outcome::Skipped(why) => {
                    summary.skipped += 1;
                    warn!(test = %case.name, "skipped: {why}");
                    println!("[  SKIPPED ] {} ({why})", case.name);
                }
                Outcome::Failed(msg) => {
                    error!(test = %case.name, "{msg}");
                    println!("{msg}");
                    println!("[  FAILED  ] {} ({ms} ms)", case.name);
                    summary.failed.push(case.name.clone());
                }
            }
        }
        info!(
            passed = summary.passed,
            failed = summary.failed.len(),
            skipped = summary.skipped,
            "test pass finished"
        );
        summary
    }
}

/// Teilstring-Filter; `None` wählt alles.
pub fn selects(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| name.contains(f))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_do_not_stop_the_pass() {
        let mut r = Runner::new();
        r.add("A.fails", || Outcome::Failed("nope".into()));
        r.add("A.passes", || Outcome::Passed);
        r.add("B.skips", || Outcome::Skipped("no device".into()));
        let s = r.run(None);
        assert_eq!(s.passed, 1);
        assert_eq!(s.failed, vec!["A.fails".to_string()]);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.exit_code(), 1);
    }

    #[test]
    fn panics_are_tallied_as_failures() {
        let mut r = Runner::new();
        r.add("P.boom", || panic!("kaputt"));
        r.add("P.ok", || Outcome::Passed);
        let s = r.run(None);
        assert_eq!(s.failed, vec!["P.boom".to_string()]);
        assert_eq!(s.passed, 1);
    }

    #[test]
    fn filter_selects_by_substring() {
        let mut r = Runner::new();
        r.add("Inclusive.I2", || Outcome::Passed);
        r.add("Exclusive.I2", || Outcome::Failed("x".into()));
        let s = r.run(Some("Inclusive"));
        assert_eq!(s.total(), 1);
        assert_eq!(s.exit_code(), 0);
    }

    #[test]
    fn matching_uses_the_run_filter() {
        let mut r = Runner::new();
        r.add("Inclusive.I2", || Outcome::Passed);
        r.add("Exclusive.I2", || Outcome::Passed);
        assert_eq!(r.matching(None), vec!["Inclusive.I2", "Exclusive.I2"]);
        assert_eq!(r.matching(Some("Excl")), vec!["Exclusive.I2"]);
        assert!(r.matching(Some("D4")).is_empty());
    }

    #[test]
    fn empty_pass_exits_zero() {
        let r = Runner::new();
        assert!(r.is_empty());
        assert_eq!(r.run(None).exit_code(), 0);
    }

    #[test]
    fn panic_message_extracts_strings() {
        let p: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*p), "static");
        let p: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*p), "owned");
    }
}
