//! Console output macros with optional routing through `tracing`.
//!
//! Every user-facing line goes through one of these macros. In normal mode
//! they print to stdout (stderr for errors). When `STITCHLOG_DEBUG` or
//! `RUST_LOG` is set they emit `tracing` events instead, so console output
//! and structured logs never interleave.
//!
//! | macro                | prefix | normal mode | debug mode        |
//! |----------------------|--------|-------------|-------------------|
//! | `msg_print!`         |        | `println!`  | `tracing::info!`  |
//! | `msg_success!`       | ✅     | `println!`  | `tracing::info!`  |
//! | `msg_info!`          | ℹ️     | `println!`  | `tracing::info!`  |
//! | `msg_warning!`       | ⚠️     | `println!`  | `tracing::warn!`  |
//! | `msg_error!`         | ❌     | `eprintln!` | `tracing::error!` |
//! | `msg_debug!`         | 🔍     | silent      | `tracing::debug!` |
//!
//! `msg_error_anyhow!` and `msg_bail_anyhow!` build and return
//! `anyhow::Error` values carrying the same ❌ prefix.
//!
//! ```rust
//! use stitchlog::{msg_info, msg_success};
//! use stitchlog::libs::messages::Message;
//!
//! msg_success!(Message::ConfigSaved("config.json".to_string()));
//! msg_info!(Message::ReportEmpty, true);
//! ```

use std::sync::OnceLock;

/// Debug flag read once per process.
pub const DEBUG_ENV: &str = "STITCHLOG_DEBUG";

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var(DEBUG_ENV).is_ok() || std::env::var("RUST_LOG").is_ok())
}

#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", $msg);
        } else {
            println!("{}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\n{}\n", $msg);
        } else {
            println!("\n{}\n", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("✅ {}", $msg);
        } else {
            println!("✅ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\n✅ {}\n", $msg);
        } else {
            println!("\n✅ {}\n", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", $msg);
        } else {
            eprintln!("❌ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("\n❌ {}\n", $msg);
        } else {
            eprintln!("\n❌ {}\n", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("⚠️ {}", $msg);
        } else {
            println!("⚠️ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("\n⚠️ {}\n", $msg);
        } else {
            println!("\n⚠️ {}\n", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", $msg);
        } else {
            println!("ℹ️ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\nℹ️ {}\n", $msg);
        } else {
            println!("\nℹ️ {}\n", $msg);
        }
    };
}

/// Only emitted in debug mode.
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("❌ {}", $msg)
    };
}

#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("❌ {}", $msg)
    };
}
