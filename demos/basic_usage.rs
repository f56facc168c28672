// demos/basic_usage.rs
//
// Build with / 构建命令: cargo build --release --features demo --target thumbv7em-none-eabihf

#![no_std]
#![no_main]

// --- Force link defmt-rtt and panic-probe ---
// --- 强制链接 defmt-rtt 和 panic-probe ---
use defmt_rtt as _; // Global import to prevent optimization / 全局导入，确保符号不被优化掉
use panic_probe as _; // Global import to prevent optimization / 全局导入，确保符号不被优化掉
// -------------------------------------------------

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    spi::{Config as SpiConfig, Spi},
    time::Hertz,
};
use embassy_time::{Delay, Duration, Timer};

// Import the library / 导入库
use sst25vf032b::{Config, SECTOR_SIZE, SpiTransport, Sst25vf032b, Status};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let mut peripheral_config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        peripheral_config.rcc.hse = Some(Hse {
            freq: Hertz(25_000_000),
            mode: HseMode::Oscillator,
        });
        peripheral_config.rcc.pll1 = Some(Pll {
            source: PllSource::HSE,
            prediv: PllPreDiv::DIV5,
            mul: PllMul::MUL160,
            divp: Some(PllDiv::DIV2),
            divq: Some(PllDiv::DIV2),
            divr: Some(PllDiv::DIV2),
        });
        peripheral_config.rcc.sys = Sysclk::PLL1_P;
        peripheral_config.rcc.ahb_pre = AHBPrescaler::DIV2;
        peripheral_config.rcc.apb1_pre = APBPrescaler::DIV2;
        peripheral_config.rcc.apb2_pre = APBPrescaler::DIV2;
        peripheral_config.rcc.apb3_pre = APBPrescaler::DIV2;
        peripheral_config.rcc.apb4_pre = APBPrescaler::DIV2;
    }
    let p = embassy_stm32::init(peripheral_config);

    info!("SST25VF032B Driver Test Started / SST25VF032B驱动测试启动");

    // SPI Configuration / SPI配置
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = Hertz(1_000_000); // Start with 1MHz for stability / 初始用1MHz（确保稳定）
    spi_config.mode = embassy_stm32::spi::Mode {
        polarity: embassy_stm32::spi::Polarity::IdleLow, // SPI Mode 0: Idle low / 模式0：空闲低电平
        phase: embassy_stm32::spi::Phase::CaptureOnFirstTransition, // SPI Mode 0: Sample on first edge / 模式0：第一个跳变沿采样
    };

    // Initialize SPI (Adjust pins for your hardware) / 初始化SPI（根据你的硬件调整引脚）
    let spi = Spi::new_blocking(
        p.SPI5,
        p.PF7, // SCK
        p.PF9, // MOSI
        p.PF8, // MISO
        spi_config,
    );

    // Initialize CS pin (Adjust pin for your hardware) / 初始化CS引脚（根据你的硬件调整引脚）
    let cs = Output::new(p.PF6, Level::High, Speed::High); // PF6 connected to /CS / PF6 连接 /CS

    // Create driver instance and initialize / 创建设备实例并初始化
    let mut flash = Sst25vf032b::new(SpiTransport::new(spi, cs), Delay, Config::default());
    if let Err(e) = flash.init() {
        error!("Init failed: {:?} / 初始化失败: {:?}", e, e);
    }

    // Blocks are write-protected after power-up / 上电后所有块默认写保护
    match flash.clear_write_protection() {
        Ok(()) => info!("Write protection cleared / 已清除写保护"),
        Err(e) => error!("Failed to clear write protection: {:?} / 清除写保护失败: {:?}", e, e),
    }

    loop {
        info!("\n--- Starting Test Cycle / 开始测试周期 ---");

        // 1. Read JEDEC ID (Verify communication) / 读取JEDEC ID（验证通信正确性）
        match flash.read_jedec_id() {
            Ok(id) => {
                info!("JEDEC ID: {:?} / JEDEC ID: {:?}", id, id);
                if id.is_sst25vf032b() {
                    info!("✅ Device identified successfully: SST25VF032B / ✅ 设备识别成功：SST25VF032B");
                } else {
                    warn!("❌ ID mismatch, possible communication error / ❌ ID不匹配，可能通信异常");
                }
            }
            Err(e) => error!("Failed to read JEDEC ID: {:?} / 读取JEDEC ID失败: {:?}", e, e),
        }

        // 2. Read Status Register (Verify device status) / 读取状态寄存器（验证设备状态）
        match flash.status() {
            Ok(status) => {
                info!("Status Register: {} / 状态寄存器: {}", status, status);
                info!("  BUSY: {} / WEL: {} / BPL: {}",
                    status.contains(Status::BUSY),
                    status.contains(Status::WEL),
                    status.contains(Status::BPL));
            }
            Err(e) => error!("Failed to read Status Register: {:?} / 读取状态寄存器失败: {:?}", e, e),
        }

        // 3. Sector Erase (Note address alignment) / 扇区擦除 (注意地址对齐)
        match flash.erase_sector_4k(0x000000) {
            Ok(()) => info!("Sector erase successful (Address 0x000000, Size {} bytes) / 扇区擦除成功 (地址 0x000000, 大小 {} bytes)", SECTOR_SIZE, SECTOR_SIZE),
            Err(e) => error!("Sector erase failed: {:?} / 扇区擦除失败: {:?}", e, e),
        }

        // 4. AAI program an odd-length buffer / AAI 编程奇数长度数据
        let write_data = [0xAB, 0xCD, 0xEF, 0x12, 0x34, 0x56, 0x78];
        match flash.aai_program(0x000000, &write_data) {
            Ok(()) => info!("Data written successfully / 写入数据成功"),
            Err(e) => error!("Failed to write data: {:?} / 写入数据失败: {:?}", e, e),
        }

        // 5. High-speed read back, including the 0x00 filler / 高速回读（包含 0x00 填充字节）
        let mut read_after_write = [0u8; 8];
        match flash.high_speed_read(0x000000, &mut read_after_write) {
            Ok(()) => {
                info!("Read data after writing: {:02X} / 写入后读取数据: {:02X}", read_after_write, read_after_write);
                if read_after_write[..7] == write_data && read_after_write[7] == 0x00 {
                    info!("✅ Written data is correct / ✅ 写入数据正确");
                } else {
                    warn!("❌ Written data mismatch / ❌ 写入数据不匹配");
                }
            }
            Err(e) => error!("Failed to read written data: {:?} / 读取写入数据失败: {:?}", e, e),
        }

        // 6. Erase again and verify / 再次擦除并验证
        let mut read_after_erase = [0u8; 16];
        let erased = flash
            .erase_sector_4k(0x000000)
            .and_then(|()| flash.read(0x000000, &mut read_after_erase));
        match erased {
            Ok(()) if read_after_erase.iter().all(|&x| x == 0xFF) => {
                info!("✅ Erase successful, data restored to 0xFF / ✅ 擦除成功，数据恢复为0xFF");
            }
            Ok(()) => warn!("❌ Erase failed, data not restored to 0xFF / ❌ 擦除失败，数据未恢复为0xFF"),
            Err(e) => error!("Failed to erase/read: {:?} / 擦除/读取失败: {:?}", e, e),
        }

        Timer::after(Duration::from_secs(5)).await;
    }
}
