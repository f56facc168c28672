// src/command.rs

//! SST25VF032B instruction set and address framing.
//! SST25VF032B 指令集与地址帧编码。
//!
//! Opcode values follow the datasheet instruction table (Table 5) and are part of the wire contract.
//! 操作码取自数据手册指令表（表 5），属于线上协议的一部分。

/// SST25VF032B Command Definitions / SST25VF032B 命令定义
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Read, up to 25 MHz / 读取（最高 25 MHz）
    Read = 0x03,
    /// High-Speed Read, one dummy byte after the address / 高速读取，地址后跟一个虚拟字节
    HighSpeedRead = 0x0B,
    /// Erase 4 KByte sector / 擦除 4KB 扇区
    SectorErase4K = 0x20,
    /// Erase 32 KByte block / 擦除 32KB 块
    BlockErase32K = 0x52,
    /// Erase 64 KByte block / 擦除 64KB 块
    BlockErase64K = 0xD8,
    /// Erase full array / 全片擦除
    ChipErase = 0x60,
    /// Program one data byte / 单字节编程
    ByteProgram = 0x02,
    /// Auto Address Increment word program / 自动地址递增字编程
    AaiWordProgram = 0xAD,
    /// Read Status Register / 读取状态寄存器
    ReadStatus = 0x05,
    /// Enable Write Status Register / 使能写状态寄存器
    EnableWriteStatus = 0x50,
    /// Write Status Register / 写状态寄存器
    WriteStatus = 0x01,
    /// Write Enable / 写使能
    WriteEnable = 0x06,
    /// Write Disable, also leaves AAI mode / 写禁止，同时退出 AAI 模式
    WriteDisable = 0x04,
    /// Read manufacturer and device ID / 读取厂商与器件 ID
    ReadId = 0x90,
    /// Read JEDEC ID / 读取 JEDEC ID
    ReadJedecId = 0x9F,
    /// Route RY/BY# status to SO during AAI / 在 AAI 期间将忙状态输出到 SO
    EnableSoBusy = 0x70,
    /// Stop routing RY/BY# to SO / 停止将忙状态输出到 SO
    DisableSoBusy = 0x80,
}

impl Command {
    /// The raw opcode byte / 原始操作码字节
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Number of dummy bytes clocked after the address field.
    /// 地址之后需要发送的虚拟字节数。
    pub const fn dummy_bytes(self) -> usize {
        match self {
            Command::HighSpeedRead => 1,
            _ => 0,
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd.opcode()
    }
}

/// Packs a 24-bit address, most significant byte first. Bits above A23 are dropped.
/// 打包 24 位地址（高字节在前），A23 以上的位被丢弃。
pub const fn encode_address(address: u32) -> [u8; 3] {
    [
        ((address >> 16) & 0xFF) as u8, // A23-A16
        ((address >> 8) & 0xFF) as u8,  // A15-A8
        (address & 0xFF) as u8,         // A7-A0
    ]
}

/// Inverse of [`encode_address`] / [`encode_address`] 的逆运算
pub const fn decode_address(frame: [u8; 3]) -> u32 {
    ((frame[0] as u32) << 16) | ((frame[1] as u32) << 8) | frame[2] as u32
}

/// Opcode followed by the 3 address bytes.
/// 操作码 + 3 字节地址。
pub const fn command_and_address(cmd: Command, address: u32) -> [u8; 4] {
    let addr = encode_address(address);
    [cmd.opcode(), addr[0], addr[1], addr[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_match_datasheet() {
        let table = [
            (Command::Read, 0x03),
            (Command::HighSpeedRead, 0x0B),
            (Command::SectorErase4K, 0x20),
            (Command::ByteProgram, 0x02),
            (Command::AaiWordProgram, 0xAD),
            (Command::BlockErase32K, 0x52),
            (Command::ChipErase, 0x60),
            (Command::BlockErase64K, 0xD8),
            (Command::ReadStatus, 0x05),
            (Command::EnableWriteStatus, 0x50),
            (Command::WriteStatus, 0x01),
            (Command::WriteEnable, 0x06),
            (Command::WriteDisable, 0x04),
            (Command::ReadId, 0x90),
            (Command::ReadJedecId, 0x9F),
            (Command::EnableSoBusy, 0x70),
            (Command::DisableSoBusy, 0x80),
        ];
        for (cmd, opcode) in table {
            assert_eq!(u8::from(cmd), opcode, "{:?}", cmd);
        }
    }

    #[test]
    fn address_is_big_endian() {
        assert_eq!(encode_address(0x123456), [0x12, 0x34, 0x56]);
        assert_eq!(
            command_and_address(Command::Read, 0x3FFFFF),
            [0x03, 0x3F, 0xFF, 0xFF]
        );
    }

    #[test]
    fn address_frame_survives_decode_over_full_range() {
        for address in 0..=crate::MAX_ADDRESS {
            assert_eq!(decode_address(encode_address(address)), address);
        }
    }

    #[test]
    fn high_bits_are_truncated() {
        assert_eq!(encode_address(0x0140_0001), [0x40, 0x00, 0x01]);
    }

    #[test]
    fn only_high_speed_read_has_dummy_byte() {
        assert_eq!(Command::HighSpeedRead.dummy_bytes(), 1);
        assert_eq!(Command::Read.dummy_bytes(), 0);
        assert_eq!(Command::ReadJedecId.dummy_bytes(), 0);
    }
}
