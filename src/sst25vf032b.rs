// src/sst25vf032b.rs

//! SST25VF032B SPI Flash Driver / SST25VF032B SPI 闪存驱动
//!
//! Based on `embedded-hal` 1.0 delay and the crate's [`Transport`] trait.
//! 基于 `embedded-hal` 1.0 延时接口与本库的 [`Transport`] 特征。
//!
//! Implements the SST25VF032B instruction set: read, high-speed read, byte program,
//! AAI word program, sector/block/chip erase, status register and identification.
//! 实现了 SST25VF032B 指令集：读取、高速读取、字节编程、AAI 字编程、扇区/块/全片擦除、
//! 状态寄存器与 ID 读取。
//!
//! **Hardware Requirements / 硬件要求**:
//! Pull `/WP` and `/HOLD` high (e.g., 10kΩ to VCC). After power-up all blocks are
//! write-protected; call [`Sst25vf032b::clear_write_protection`] before programming.
//! 将 `/WP` 和 `/HOLD` 引脚拉高（例如通过 10kΩ 电阻连接到 VCC）。上电后所有块均处于写保护状态，
//! 编程前需调用 [`Sst25vf032b::clear_write_protection`]。

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;

use crate::command::{Command, command_and_address};
use crate::error::Error;
use crate::transport::{Selected, Transport};

// --- Public Constants / 公共常量 ---

/// SST Manufacturer ID / SST 制造商 ID
pub const MANUFACTURER_ID: u8 = 0xBF;
/// SST25VF032B Device ID (Read-ID, 0x90) / SST25VF032B 器件 ID
pub const DEVICE_ID: u8 = 0x4A;
/// SST25VF032B JEDEC Memory Type / JEDEC 存储器类型
pub const JEDEC_MEM_TYPE: u8 = 0x25;
/// SST25VF032B JEDEC Capacity / JEDEC 容量
pub const JEDEC_CAPACITY: u8 = 0x4A;

/// Total size, 4 MByte / 总容量 4MB
pub const CAPACITY: u32 = 4 * 1024 * 1024;
/// Highest byte address / 最高字节地址
pub const MAX_ADDRESS: u32 = CAPACITY - 1;
/// Sector Size (4KB) / 扇区大小 (4KB)
pub const SECTOR_SIZE: u32 = 4 * 1024;
/// 32KB Block Size / 32KB 块大小
pub const BLOCK_32K_SIZE: u32 = 32 * 1024;
/// 64KB Block Size / 64KB 块大小
pub const BLOCK_64K_SIZE: u32 = 64 * 1024;

/// Filler for the second byte of an odd-length AAI tail.
const AAI_PAD: u8 = 0x00;

// --- Status Register / 状态寄存器 ---

bitflags! {
    /// Status Register bits (Datasheet Table 4) / 状态寄存器位定义（数据手册表 4）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Write in progress / 正在写入
        const BUSY = 1 << 0;
        /// Write-Enable Latch / 写使能锁存
        const WEL = 1 << 1;
        const BP0 = 1 << 2;
        const BP1 = 1 << 3;
        const BP2 = 1 << 4;
        const BP3 = 1 << 5;
        /// Auto Address Increment mode active / AAI 模式
        const AAI = 1 << 6;
        /// Block Protection Lock-Down / 块保护锁定
        const BPL = 1 << 7;
    }
}

impl Status {
    /// Bits cleared by [`Sst25vf032b::clear_write_protection`].
    /// [`Sst25vf032b::clear_write_protection`] 清除的位。
    pub const CLEARED_BY_UNPROTECT: Status = Status::BP0.union(Status::BP1).union(Status::BP2);
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u8:#x})", self.bits())
    }
}

// --- Identification / 器件标识 ---

/// Result of Read-ID (0x90) / Read-ID (0x90) 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    pub manufacturer: u8,
    pub device: u8,
}

impl DeviceId {
    pub fn is_sst25vf032b(&self) -> bool {
        self.manufacturer == MANUFACTURER_ID && self.device == DEVICE_ID
    }
}

/// Result of Read JEDEC ID (0x9F) / JEDEC ID (0x9F) 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JedecId {
    pub manufacturer: u8,
    pub memory_type: u8,
    pub capacity: u8,
}

impl JedecId {
    pub fn is_sst25vf032b(&self) -> bool {
        self.manufacturer == MANUFACTURER_ID
            && self.memory_type == JEDEC_MEM_TYPE
            && self.capacity == JEDEC_CAPACITY
    }
}

// --- Configuration / 配置 ---

/// Busy-poll policy / 忙等待轮询策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Config {
    /// Maximum status reads per wait before giving up with [`Error::Timeout`].
    /// 每次等待的最大状态读取次数，超出则返回 [`Error::Timeout`]。
    pub poll_limit: u32,
    /// Delay between two busy status reads, in microseconds.
    /// 两次忙状态读取之间的延时（微秒）。
    pub poll_interval_us: u32,
}

impl Default for Config {
    /// Covers a chip erase (50 ms max) with a wide margin at the default interval.
    fn default() -> Self {
        Self {
            poll_limit: 100_000,
            poll_interval_us: 10,
        }
    }
}

// --- Driver Struct / 驱动结构体 ---

/// SST25VF032B Driver Instance / SST25VF032B 驱动实例
///
/// Owns the transport, so no two commands can ever overlap on the bus.
/// 独占传输层，因此总线上不会出现交错的命令。
pub struct Sst25vf032b<T, D> {
    transport: T,
    delay: D,
    config: Config,
}

type Result<R, T> = core::result::Result<R, Error<<T as Transport>::Error>>;

// --- Driver Implementation / 驱动实现 ---
impl<T: Transport, D: DelayNs> Sst25vf032b<T, D> {
    /// Creates a new driver instance.
    /// 创建一个新的驱动实例。
    ///
    /// # Arguments / 参数
    /// * `transport`: The link to the chip. / 与芯片的链路。
    /// * `delay`: Sleeps between busy polls. / 忙轮询之间的延时源。
    /// * `config`: Busy-poll policy. / 忙等待策略。
    pub fn new(transport: T, delay: D, config: Config) -> Self {
        Self {
            transport,
            delay,
            config,
        }
    }

    /// Initializes the transport, leaving /CS deasserted.
    /// 初始化传输层，/CS 保持无效。
    pub fn init(&mut self) -> Result<(), T> {
        self.transport.init().map_err(Error::Transport)?;
        debug!("sst25vf032b: transport initialized");
        Ok(())
    }

    /// Gives back the transport and delay / 归还传输层与延时源
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    // --- Private Helper Functions / 私有辅助函数 ---

    fn select(&mut self) -> Result<Selected<'_, T>, T> {
        Selected::new(&mut self.transport)
    }

    /// Sends a single-byte command with no data.
    /// 发送单字节命令（无数据）。
    fn command(&mut self, cmd: Command) -> Result<(), T> {
        let mut cs = self.select()?;
        cs.write(&[cmd.opcode()])?;
        cs.release()
    }

    /// Sends `cmd` + 24-bit address, optional dummy byte, then reads into `buf`.
    fn read_with(&mut self, cmd: Command, address: u32, buf: &mut [u8]) -> Result<(), T> {
        check_range::<T::Error>(address, buf.len())?;
        let mut cs = self.select()?;
        cs.write(&command_and_address(cmd, address))?;
        for _ in 0..cmd.dummy_bytes() {
            cs.write(&[0x00])?;
        }
        cs.read(buf)?;
        cs.release()
    }

    /// Runs `op` with the write latch armed, then disarms it even if `op` failed.
    /// The device clears WEL after every mutating command, so each call re-arms it.
    fn with_write_enabled<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, T>,
    ) -> Result<R, T> {
        let result = match self.enable_write() {
            Ok(()) => op(self),
            Err(e) => Err(e),
        };
        let disabled = self.disable_write();
        let value = result?;
        disabled?;
        Ok(value)
    }

    fn erase(&mut self, cmd: Command, address: u32, size: u32) -> Result<(), T> {
        if address > MAX_ADDRESS || address % size != 0 {
            return Err(Error::InvalidAddress);
        }
        debug!("sst25vf032b: erase {:#x} ({} bytes)", address, size);
        self.with_write_enabled(|dev| {
            let mut cs = dev.select()?;
            cs.write(&command_and_address(cmd, address))?;
            cs.release()?;
            dev.wait_until_ready()
        })
    }

    // --- Status Register / 状态寄存器 ---

    /// Reads the Status Register.
    /// 读取状态寄存器。
    pub fn read_status(&mut self) -> Result<u8, T> {
        let mut cs = self.select()?;
        cs.write(&[Command::ReadStatus.opcode()])?;
        let mut buf = [0u8; 1];
        cs.read(&mut buf)?;
        cs.release()?;
        Ok(buf[0])
    }

    /// Reads the Status Register as [`Status`] flags.
    /// 以 [`Status`] 标志位形式读取状态寄存器。
    pub fn status(&mut self) -> Result<Status, T> {
        self.read_status().map(Status::from_bits_retain)
    }

    /// Checks the BUSY bit / 检查 BUSY 位
    pub fn is_busy(&mut self) -> Result<bool, T> {
        Ok(self.status()?.contains(Status::BUSY))
    }

    /// Polls until BUSY clears, up to [`Config::poll_limit`] reads.
    /// 轮询直到 BUSY 清零，最多读取 [`Config::poll_limit`] 次。
    pub fn wait_until_ready(&mut self) -> Result<(), T> {
        let limit = self.config.poll_limit.max(1);
        for poll in 1..=limit {
            if !self.is_busy()? {
                return Ok(());
            }
            if poll < limit {
                trace!("sst25vf032b: busy, poll {}", poll);
                self.delay.delay_us(self.config.poll_interval_us);
            }
        }
        warn!("sst25vf032b: still busy after {} polls", limit);
        Err(Error::Timeout)
    }

    // --- Write Latch / 写使能锁存 ---

    /// Sets WEL / 置位写使能锁存
    pub fn enable_write(&mut self) -> Result<(), T> {
        self.command(Command::WriteEnable)
    }

    /// Clears WEL and leaves AAI mode / 清除写使能锁存并退出 AAI 模式
    pub fn disable_write(&mut self) -> Result<(), T> {
        self.command(Command::WriteDisable)
    }

    // --- Read / 读取 ---

    /// Standard Read, up to 25 MHz.
    /// 标准读取（最高 25 MHz）。
    ///
    /// # Arguments / 参数
    /// * `address`: The 24-bit address to start reading from. / 开始读取的 24 位地址。
    /// * `buf`: The buffer to read data into. / 用于存储读取数据的缓冲区。
    pub fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), T> {
        self.read_with(Command::Read, address, buf)
    }

    /// High-Speed Read with one dummy byte, up to 80 MHz.
    /// 高速读取（带一个虚拟字节，最高 80 MHz）。
    pub fn high_speed_read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), T> {
        self.read_with(Command::HighSpeedRead, address, buf)
    }

    // --- Erase / 擦除 ---

    /// Erases the whole array to 0xFF.
    /// 全片擦除为 0xFF。
    pub fn erase_chip(&mut self) -> Result<(), T> {
        debug!("sst25vf032b: chip erase");
        self.with_write_enabled(|dev| {
            dev.command(Command::ChipErase)?;
            dev.wait_until_ready()
        })
    }

    /// Erases a 4KB sector. `address` must be 4KB-aligned.
    /// 擦除一个 4KB 扇区，地址必须按 4KB 对齐。
    pub fn erase_sector_4k(&mut self, address: u32) -> Result<(), T> {
        self.erase(Command::SectorErase4K, address, SECTOR_SIZE)
    }

    /// Erases a 32KB block. `address` must be 32KB-aligned.
    /// 擦除一个 32KB 块，地址必须按 32KB 对齐。
    pub fn erase_block_32k(&mut self, address: u32) -> Result<(), T> {
        self.erase(Command::BlockErase32K, address, BLOCK_32K_SIZE)
    }

    /// Erases a 64KB block. `address` must be 64KB-aligned.
    /// 擦除一个 64KB 块，地址必须按 64KB 对齐。
    pub fn erase_block_64k(&mut self, address: u32) -> Result<(), T> {
        self.erase(Command::BlockErase64K, address, BLOCK_64K_SIZE)
    }

    // --- Program / 编程 ---

    /// Programs one byte. The target must be erased (0xFF).
    /// 编程单个字节，目标地址必须已擦除（0xFF）。
    pub fn byte_program(&mut self, address: u32, byte: u8) -> Result<(), T> {
        check_range::<T::Error>(address, 1)?;
        self.with_write_enabled(|dev| {
            let mut cs = dev.select()?;
            cs.write(&command_and_address(Command::ByteProgram, address))?;
            cs.write(&[byte])?;
            cs.release()?;
            dev.wait_until_ready()
        })
    }

    /// Programs `data` with Auto Address Increment, two bytes per command.
    /// 使用 AAI 模式编程 `data`，每条命令写入两个字节。
    ///
    /// An odd-length buffer has its last byte paired with a `0x00` filler, so the
    /// byte after the buffer is programmed to zero.
    /// 奇数长度时最后一个字节与 `0x00` 填充字节配对写入，缓冲区之后的一个字节会被写为 0。
    ///
    /// **Note**: The target area must be erased. `data` must hold at least 2 bytes.
    /// **注意**: 目标区域必须已擦除，`data` 至少 2 字节。
    pub fn aai_program(&mut self, address: u32, data: &[u8]) -> Result<(), T> {
        if data.len() < 2 {
            return Err(Error::InvalidLength);
        }
        // The filler byte lands one past the data on odd lengths.
        let span = data.len() + data.len() % 2;
        check_range::<T::Error>(address, span)?;
        debug!("sst25vf032b: AAI program {} bytes at {:#x}", data.len(), address);

        let (first, rest) = data.split_at(2);
        self.with_write_enabled(|dev| {
            let mut cs = dev.select()?;
            cs.write(&command_and_address(Command::AaiWordProgram, address))?;
            cs.write(first)?;
            cs.release()?;
            dev.wait_until_ready()?;

            for word in rest.chunks(2) {
                let pair = [word[0], word.get(1).copied().unwrap_or(AAI_PAD)];
                trace!("sst25vf032b: AAI word {:#x} {:#x}", pair[0], pair[1]);
                let mut cs = dev.select()?;
                cs.write(&[Command::AaiWordProgram.opcode(), pair[0], pair[1]])?;
                cs.release()?;
                dev.wait_until_ready()?;
            }
            Ok(())
        })
    }

    // --- Identification / 器件标识 ---

    /// Reads manufacturer and device ID (0x90).
    /// 读取制造商 ID 与器件 ID（0x90）。
    pub fn read_id(&mut self) -> Result<DeviceId, T> {
        let mut cs = self.select()?;
        // Address 0x000000 returns manufacturer first / 地址 0 时先返回制造商 ID
        cs.write(&command_and_address(Command::ReadId, 0))?;
        let mut buf = [0u8; 2];
        cs.read(&mut buf)?;
        cs.release()?;
        Ok(DeviceId {
            manufacturer: buf[0],
            device: buf[1],
        })
    }

    /// Reads the JEDEC ID (0x9F).
    /// 读取 JEDEC ID（0x9F）。
    pub fn read_jedec_id(&mut self) -> Result<JedecId, T> {
        let mut cs = self.select()?;
        cs.write(&[Command::ReadJedecId.opcode()])?;
        let mut buf = [0u8; 3];
        cs.read(&mut buf)?;
        cs.release()?;
        Ok(JedecId {
            manufacturer: buf[0],
            memory_type: buf[1],
            capacity: buf[2],
        })
    }

    // --- Status Register Write / 状态寄存器写入 ---

    /// Issues Enable-Write-Status-Register (0x50).
    /// 发送使能写状态寄存器命令（0x50）。
    pub fn enable_write_status(&mut self) -> Result<(), T> {
        self.command(Command::EnableWriteStatus)
    }

    /// Writes the Status Register (BP0-BP3, BPL).
    /// 写状态寄存器（BP0-BP3、BPL）。
    ///
    /// Uses Enable-Write-Status-Register rather than the write latch and does not poll BUSY.
    /// 使用 EWSR 而非写使能锁存，不轮询 BUSY。
    pub fn write_status_register(&mut self, value: u8) -> Result<(), T> {
        self.enable_write_status()?;
        let mut cs = self.select()?;
        cs.write(&[Command::WriteStatus.opcode(), value])?;
        cs.release()
    }

    /// Clears BP0, BP1 and BP2, keeping every other Status Register bit.
    /// 清除 BP0、BP1、BP2，保留状态寄存器其余位。
    pub fn clear_write_protection(&mut self) -> Result<(), T> {
        let status = self.read_status()?;
        let unprotected = status & !Status::CLEARED_BY_UNPROTECT.bits();
        debug!("sst25vf032b: status {:#x} -> {:#x}", status, unprotected);
        self.with_write_enabled(|dev| dev.write_status_register(unprotected))
    }

    // --- SO Busy Output / SO 忙状态输出 ---

    /// Routes RY/BY# to the SO pin during AAI programming (EBSY).
    /// AAI 编程期间将忙状态输出到 SO 引脚（EBSY）。
    pub fn enable_busy_output(&mut self) -> Result<(), T> {
        self.command(Command::EnableSoBusy)
    }

    /// Returns SO to normal data output (DBSY).
    /// 恢复 SO 为普通数据输出（DBSY）。
    pub fn disable_busy_output(&mut self) -> Result<(), T> {
        self.command(Command::DisableSoBusy)
    }
}

/// Rejects empty spans and spans running past [`MAX_ADDRESS`].
fn check_range<E>(address: u32, len: usize) -> core::result::Result<(), Error<E>> {
    if len == 0 {
        return Err(Error::InvalidLength);
    }
    let last = u64::from(address) + len as u64 - 1;
    if last > u64::from(MAX_ADDRESS) {
        return Err(Error::InvalidAddress);
    }
    Ok(())
}
