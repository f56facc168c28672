// src/transport.rs

//! Transport layer / 传输层
//!
//! The driver never touches SPI or GPIO registers. It talks to the bus through [`Transport`],
//! which only knows how to move chip-select and exchange single bytes.
//! 驱动不直接访问 SPI/GPIO 寄存器，只通过 [`Transport`] 控制片选并逐字节收发。

use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::Error;

/// Byte-level link to the flash chip / 与 Flash 芯片之间的字节级链路
pub trait Transport {
    /// Error reported by the link / 链路错误类型
    type Error: Debug;

    /// One-time set-up. Leaves chip-select deasserted (high).
    /// 一次性初始化，片选保持无效（高电平）。
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Drive /CS low / 拉低 /CS
    fn assert_select(&mut self) -> Result<(), Self::Error>;

    /// Drive /CS high / 拉高 /CS
    fn deassert_select(&mut self) -> Result<(), Self::Error>;

    /// Full-duplex exchange of one byte, blocking until done.
    /// 全双工交换一个字节，阻塞直到完成。
    fn transfer_byte(&mut self, tx: u8) -> Result<u8, Self::Error>;
}

// --- Chip-select guard / 片选守卫 ---

/// Chip-select held low for one command. Dropping it raises /CS.
/// 在一条命令期间保持片选为低，释放时拉高 /CS。
///
/// Call [`Selected::release`] on the success path to observe deassert errors; on early
/// returns the drop handler deasserts and discards any error.
/// 正常路径调用 [`Selected::release`] 以获取拉高片选时的错误；提前返回时由 drop 拉高片选并忽略错误。
pub(crate) struct Selected<'a, T: Transport> {
    transport: &'a mut T,
    active: bool,
}

impl<'a, T: Transport> Selected<'a, T> {
    pub(crate) fn new(transport: &'a mut T) -> Result<Self, Error<T::Error>> {
        if let Err(e) = transport.assert_select() {
            // Pin state is unknown after a failed assert; put it back to idle.
            let _ = transport.deassert_select();
            return Err(Error::Transport(e));
        }
        Ok(Self {
            transport,
            active: true,
        })
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) -> Result<(), Error<T::Error>> {
        for &byte in bytes {
            self.transport.transfer_byte(byte).map_err(Error::Transport)?;
        }
        Ok(())
    }

    /// Clocks out zeros and stores what comes back.
    pub(crate) fn read(&mut self, buf: &mut [u8]) -> Result<(), Error<T::Error>> {
        for slot in buf.iter_mut() {
            *slot = self.transport.transfer_byte(0x00).map_err(Error::Transport)?;
        }
        Ok(())
    }

    pub(crate) fn release(mut self) -> Result<(), Error<T::Error>> {
        self.active = false;
        self.transport.deassert_select().map_err(Error::Transport)
    }
}

impl<T: Transport> Drop for Selected<'_, T> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.transport.deassert_select();
        }
    }
}

// --- embedded-hal adapter / embedded-hal 适配器 ---

/// [`Transport`] over an `embedded-hal` SPI bus and a GPIO output for /CS.
/// 基于 `embedded-hal` SPI 总线和 /CS GPIO 输出的 [`Transport`] 实现。
///
/// # Arguments / 参数
/// * `spi`: A configured SPI bus in mode 0 or 3. / 已配置好的 SPI 总线（模式 0 或 3）。
/// * `cs`: A GPIO output pin for /CS. / 用于 /CS 的 GPIO 输出引脚。
pub struct SpiTransport<SPI, CS> {
    spi: SPI,
    cs: CS,
}

/// Errors from [`SpiTransport`] / [`SpiTransport`] 的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiTransportError<S, P> {
    SpiError(S),
    PinError(P),
}

impl<SPI, CS> SpiTransport<SPI, CS> {
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Gives back the bus and pin / 归还总线和引脚
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Transport for SpiTransport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    type Error = SpiTransportError<SPI::Error, CS::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        // Force CS high (deselected) / 强制CS为高电平（未选中状态）
        self.cs.set_high().map_err(SpiTransportError::PinError)
    }

    fn assert_select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(SpiTransportError::PinError)
    }

    fn deassert_select(&mut self) -> Result<(), Self::Error> {
        // Let the last byte leave the shifter before raising CS / 拉高 CS 前确保最后一个字节已发送完毕
        let flushed = self.spi.flush().map_err(SpiTransportError::SpiError);
        self.cs.set_high().map_err(SpiTransportError::PinError)?;
        flushed
    }

    fn transfer_byte(&mut self, tx: u8) -> Result<u8, Self::Error> {
        let mut buf = [tx];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(SpiTransportError::SpiError)?;
        Ok(buf[0])
    }
}
