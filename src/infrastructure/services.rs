//! Logging sinks and clocks for the ambient logging layer.

use crate::domain::logging::TimeProvider;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserTimeProvider, ConsoleLogger};

#[cfg(target_arch = "wasm32")]
mod browser {
    use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

    /// Writes entries to the browser console with the matching level method
    pub struct ConsoleLogger {
        min_level: LogLevel,
    }

    impl ConsoleLogger {
        pub fn new(min_level: LogLevel) -> Self {
            Self { min_level }
        }

        pub fn new_production() -> Self {
            Self::new(LogLevel::Info)
        }

        pub fn new_development() -> Self {
            Self::new(LogLevel::Debug)
        }
    }

    impl Logger for ConsoleLogger {
        fn log(&self, entry: LogEntry) {
            let line: wasm_bindgen::JsValue = entry.format_line().into();
            match entry.level {
                LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
                LogLevel::Info => web_sys::console::info_1(&line),
                LogLevel::Warn => web_sys::console::warn_1(&line),
                LogLevel::Error => web_sys::console::error_1(&line),
            }
        }

        fn min_level(&self) -> LogLevel {
            self.min_level
        }
    }

    /// Wall clock from `Date.now()`
    #[derive(Debug, Default)]
    pub struct BrowserTimeProvider;

    impl BrowserTimeProvider {
        pub fn new() -> Self {
            Self
        }
    }

    impl TimeProvider for BrowserTimeProvider {
        fn current_timestamp(&self) -> u64 {
            js_sys::Date::now() as u64
        }

        fn format_timestamp(&self, timestamp: u64) -> String {
            let date = js_sys::Date::new(&(timestamp as f64).into());
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                date.get_hours(),
                date.get_minutes(),
                date.get_seconds(),
                date.get_milliseconds()
            )
        }
    }
}

/// Wall clock for native builds
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn current_timestamp(&self) -> u64 {
        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Date::now() as u64
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        }
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let ms_of_day = timestamp % 86_400_000;
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            ms_of_day / 3_600_000,
            ms_of_day / 60_000 % 60,
            ms_of_day / 1000 % 60,
            ms_of_day % 1000
        )
    }
}
