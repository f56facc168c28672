// src/error.rs

//! Driver error type / 驱动错误类型

use core::fmt;

/// Errors returned by every driver operation.
/// 所有驱动操作返回的错误。
///
/// `E` is the error type of the underlying [`Transport`](crate::Transport).
/// `E` 为底层 [`Transport`](crate::Transport) 的错误类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Address outside `0..=0x3FFFFF`, or not aligned to the erase granularity.
    /// 地址越界，或未按擦除粒度对齐。
    InvalidAddress,
    /// AAI write shorter than 2 bytes, or an empty read.
    /// AAI 写入少于 2 字节，或读取长度为 0。
    InvalidLength,
    /// BUSY was still set after the configured number of status polls.
    /// 轮询次数用尽后 BUSY 仍为 1。
    Timeout,
    /// The transport failed / 传输层错误
    Transport(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidAddress => f.write_str("address out of range or misaligned"),
            Error::InvalidLength => f.write_str("invalid transfer length"),
            Error::Timeout => f.write_str("timed out waiting for the device to become ready"),
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
