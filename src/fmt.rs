// src/fmt.rs

//! Logging shim / 日志适配
//!
//! Forwards to `defmt` when the `defmt` feature is enabled, otherwise to the `log` facade
//! (default `log` feature). With neither, log statements compile to nothing.
//! 启用 `defmt` 特性时转发到 `defmt`，否则转发到 `log`（默认 `log` 特性）。两者都未启用时日志语句为空。
//!
//! Format strings must stay within the common subset of both crates (`{}`, `{:?}`, `{:#x}`).
//! 格式字符串只能使用两者都支持的子集。

#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)+);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::trace!($($arg)+);
    }};
}

macro_rules! debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)+);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::debug!($($arg)+);
    }};
}

macro_rules! warn {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)+);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::warn!($($arg)+);
    }};
}
