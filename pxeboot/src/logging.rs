use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, set_logger, set_max_level};

pub struct Logger {
    color: bool,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if !self.color {
            log_println!("[{:}] {}", record.level(), record.args());
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 37,  // White
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };
        log_println!(
            "\u{1B}[{}m[{:}] {}\u{1B}[0m",
            color,
            record.level(),
            record.args(),
        );
    }

    fn flush(&self) {}
}

/// Level from `PXEBOOT_LOG` (`error`, `warn`, `info`, `debug`, `trace`, `off`).
pub fn level_from_env() -> Option<LevelFilter> {
    std::env::var("PXEBOOT_LOG").ok()?.parse().ok()
}

pub fn init(level: LevelFilter, color: bool) -> Result<(), SetLoggerError> {
    let logger = Box::leak(Box::new(Logger { color }));
    set_logger(logger)?;
    set_max_level(level);
    Ok(())
}

/// Debug record that only exists in debug builds.
#[macro_export]
macro_rules! debug_ex {
    // debug_ex!(target: "my_target", "a {} event", "log")
    (target: $target:expr, $($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            use log::{log,Level};
            log!(target: $target, Level::Debug, $($arg)+)
        }
    };

    // debug_ex!("a {} event", "log")
    ($($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            use log::{log,Level};
            log!(Level::Debug, $($arg)+)
        }
    }
}
