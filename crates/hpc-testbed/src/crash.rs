//! Absturzprotokoll: Panic-Hook, der Ort und Meldung über `tracing` loggt
//! und danach den vorherigen Hook aufruft.

use std::panic;
use std::sync::Once;

static INSTALL: Once = Once::new();

/// Hook einmalig registrieren; weitere Aufrufe sind wirkungslos.
pub fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "<unknown>".to_string());
            let thread = std::thread::current();
            tracing::error!(
                thread = thread.name().unwrap_or("<unnamed>"),
                %location,
                "panic: {}",
                payload_text(info)
            );
            previous(info);
        }));
    });
}

fn payload_text(info: &panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string payload>".to_string()
    }
}
