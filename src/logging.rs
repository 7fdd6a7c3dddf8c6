//! Logging macros
//!
//! One set of macros for every build:
//! - Firmware (`firmware` feature): forwards to defmt, shipped over RTT
//! - Host unit tests: prints to stdout
//! - Other host builds: arguments are type-checked, nothing is emitted
//!
//! Format strings must stay within the subset both backends understand:
//! `{}` for numbers and `&str`, `{:?}` for enums and structs.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        ::std::println!("[INFO] {}", ::std::format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        ::std::println!("[WARN] {}", ::std::format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        ::std::println!("[DEBUG] {}", ::std::format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
