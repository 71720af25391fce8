//! Minimal stderr logger.

use std::io::Write;
use std::sync::Once;

/// Map repeated `-v` flags to a level. Warnings always show.
pub fn level_for(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Install the stderr logger, if not already installed.
pub fn init_logging(verbosity: u8) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        struct StderrLog;
        static LOG: StderrLog = StderrLog;
        impl log::Log for StderrLog {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::max_level()
            }

            fn log(&self, record: &log::Record) {
                if !self.enabled(record.metadata()) {
                    return;
                }
                let _ = writeln!(
                    std::io::stderr().lock(),
                    "[{} {} {}] {}",
                    chrono::Utc::now().format("%H:%M:%S"),
                    record.level(),
                    record.module_path().unwrap_or("?"),
                    record.args()
                );
            }

            fn flush(&self) {
                let _ = std::io::stderr().flush();
            }
        }
        if log::set_logger(&LOG).is_ok() {
            log::set_max_level(level_for(verbosity));
        }
    });
}
