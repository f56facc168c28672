// src/lib.rs

//! SST25VF032B SPI Flash Driver Library
//! SST25VF032B SPI Flash 驱动库
//!
//! This library drives the Microchip (SST) SST25VF032B 32-Mbit serial Flash memory.
//! 该库提供了对 Microchip (SST) SST25VF032B 32Mbit 串行 Flash 存储器的操作。
//!
//! # Usage / 使用方法
//!
//! 1. Wrap the SPI bus and CS pin in a [`SpiTransport`] (or implement [`Transport`] yourself).
//! 2. Create a `Sst25vf032b` instance with a delay source and a [`Config`].
//! 3. Call `init()` to put /CS in its idle state.
//! 4. Call `clear_write_protection()` once, then read, program and erase.
//!
//! 1. 用 [`SpiTransport`] 包装 SPI 总线和 CS 引脚（或自行实现 [`Transport`]）。
//! 2. 使用延时源和 [`Config`] 创建 `Sst25vf032b` 实例。
//! 3. 调用 `init()` 使 /CS 进入空闲状态。
//! 4. 调用一次 `clear_write_protection()`，之后即可读取、编程和擦除。
//!
//! ```no_run
//! # fn demo<SPI, CS, D>(spi: SPI, cs: CS, delay: D)
//! # where
//! #     SPI: embedded_hal::spi::SpiBus<u8>,
//! #     CS: embedded_hal::digital::OutputPin,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! use sst25vf032b::{Config, SpiTransport, Sst25vf032b};
//!
//! let mut flash = Sst25vf032b::new(SpiTransport::new(spi, cs), delay, Config::default());
//! flash.init().unwrap();
//!
//! if flash.read_jedec_id().unwrap().is_sst25vf032b() {
//!     flash.clear_write_protection().unwrap();
//!     flash.erase_sector_4k(0x000000).unwrap();
//!     // Odd length: the byte at 0x000005 is padded with 0x00 / 奇数长度：0x000005 处填充 0x00
//!     flash.aai_program(0x000000, b"hello").unwrap();
//!
//!     let mut buf = [0u8; 5];
//!     flash.read(0x000000, &mut buf).unwrap();
//! }
//! # }
//! ```
//!
//! # Important Notes / 重要事项
//!
//! * **Error Handling / 错误处理**:
//!   Every operation returns [`Error`], wrapping the transport's own error type.
//!   Chip-select is released on every path, including errors.
//!   所有操作都返回 [`Error`]，其中包含传输层自身的错误类型。任何路径下（包括出错）片选都会被释放。
//! * **Blocking / 阻塞**:
//!   All operations are blocking. Erase and program wait for BUSY to clear, bounded by [`Config`].
//!   所有操作均为阻塞式。擦除和编程会等待 BUSY 清零，等待上限由 [`Config`] 决定。
//! * **Logging / 日志**:
//!   Logs through `log` by default, or `defmt` with the `defmt` feature.
//!   默认通过 `log` 输出日志，启用 `defmt` 特性时使用 `defmt`。

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible below / 必须最先声明，日志宏才能在后续模块中使用
#[macro_use]
mod fmt;

mod command;
mod error;
#[cfg(test)]
mod mock;
mod sst25vf032b;
mod transport;

// Re-export public items for easy access / 重新导出公共项，方便库使用者直接访问
pub use command::{Command, command_and_address, decode_address, encode_address};
pub use error::Error;
pub use sst25vf032b::{
    Config, DeviceId, JedecId, Sst25vf032b, Status, // Driver and types / 驱动与类型
    BLOCK_32K_SIZE, BLOCK_64K_SIZE, CAPACITY, MAX_ADDRESS, SECTOR_SIZE, // Geometry / 容量布局
    DEVICE_ID, JEDEC_CAPACITY, JEDEC_MEM_TYPE, MANUFACTURER_ID, // Constants / 常量
};
pub use transport::{SpiTransport, SpiTransportError, Transport};
