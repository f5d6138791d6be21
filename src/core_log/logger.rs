use env_logger::{Builder, Env};
use log::error;
use std::backtrace::Backtrace;
use std::io::Write;

/// Initializes the logger with the `[timestamp] [level] message` format.
///
/// `RUST_LOG` takes precedence; otherwise the filter is `info`, or `debug`
/// when `verbose` is set.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Routes panics through the logger together with the stack of the
/// panicking thread. Command handlers are recovered at the dispatch
/// boundary, so this is where their trace ends up.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "Panic at {}: {}, Trace:\n{}",
            location,
            panic_message(info.payload()),
            Backtrace::force_capture()
        );
    }));
}

/// Extracts the human-readable part of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
