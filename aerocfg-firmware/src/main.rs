//! aerocfg - flight controller boot firmware
//!
//! Brings up an STM32F042 board, loads the configuration record and hands
//! the validated record and its shaping tables to the control loop.
//!
//! Boot sequence:
//! 1. Init peripherals
//! 2. Bind the configuration medium (on-chip flash page or AT24 EEPROM)
//! 3. Load, with a factory reset if the reset button is held
//! 4. Run the control loop on the loaded record

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use aerocfg_core::{ConfigStore, LoadOutcome, Medium};
use aerocfg_drivers::indicator::BlinkAck;
use aerocfg_hal::StoreError;
use aerocfg_hal_stm32f0::StatusPin;

#[cfg(all(feature = "medium-flash", feature = "medium-eeprom"))]
compile_error!("select only one of `medium-flash` and `medium-eeprom`");

#[cfg(not(any(feature = "medium-flash", feature = "medium-eeprom")))]
compile_error!("select one of `medium-flash` or `medium-eeprom`");

/// Offset of the record in the external EEPROM
#[cfg(feature = "medium-eeprom")]
const CONFIG_EEPROM_OFFSET: usize = 0;

/// Control loop period
const LOOP_PERIOD: Duration = Duration::from_millis(20);

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("aerocfg firmware starting...");

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    // Status LED acknowledges every save
    let led = StatusPin::new(Output::new(p.PB3, Level::Low, Speed::Low));
    let ack = BlinkAck::new(led, Delay);

    // Holding the button at power-on restores factory defaults
    let reset_button = Input::new(p.PA0, Pull::Up);
    let factory_reset = reset_button.is_low();
    if factory_reset {
        warn!("Reset button held, restoring factory defaults");
    }

    #[cfg(feature = "medium-flash")]
    let medium = {
        use aerocfg_core::FlashMedium;
        use aerocfg_hal_stm32f0::flash::{Stm32PageFlash, CONFIG_PAGE_OFFSET};

        info!("Config medium: flash page at {=u32:#x}", CONFIG_PAGE_OFFSET);
        FlashMedium::new(Stm32PageFlash::new(p.FLASH), CONFIG_PAGE_OFFSET)
    };

    #[cfg(feature = "medium-eeprom")]
    let medium = {
        use aerocfg_core::EepromMedium;
        use aerocfg_drivers::eeprom::At24Eeprom;
        use aerocfg_hal_stm32f0::BlockingI2c;
        use embassy_stm32::i2c::{Config as I2cConfig, I2c};
        use embassy_stm32::time::Hertz;

        let mut i2c_config = I2cConfig::default();
        i2c_config.frequency = Hertz(400_000);
        let i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, i2c_config);

        info!("Config medium: AT24 EEPROM at offset {=usize}", CONFIG_EEPROM_OFFSET);
        EepromMedium::new(At24Eeprom::at24c32(BlockingI2c::new(i2c)), CONFIG_EEPROM_OFFSET)
    };

    let medium = match medium {
        Ok(medium) => medium,
        Err(e) => halt(e).await,
    };

    let (config, outcome) = ConfigStore::with_ack(medium, ack).load_with_reset(factory_reset);
    match outcome {
        LoadOutcome::Stored => info!("Configuration loaded"),
        LoadOutcome::Restored { reason, persisted } => {
            warn!("Factory defaults in use: {} (persisted: {})", reason, persisted)
        }
    }

    let record = config.record();
    info!(
        "Variant {}, rx mode {=u8}, arm mode {}",
        config.hardware_variant(),
        record.rc.rx_mode,
        record.arm_mode()
    );
    info!(
        "Stick curve {}, throttle curve {}",
        config.tables().stick(),
        config.tables().throttle()
    );

    control_loop(config).await
}

/// Holds the loaded configuration for the control code
async fn control_loop<M: Medium, A: aerocfg_core::Acknowledge>(
    config: aerocfg_core::LoadedConfig<M, A>,
) -> ! {
    let mut ticks: u32 = 0;
    loop {
        Timer::after(LOOP_PERIOD).await;
        ticks = ticks.wrapping_add(1);

        // Once a second, report the throttle command at mid stick
        if ticks % 50 == 0 {
            let tables = config.tables();
            trace!(
                "throttle@50% = {=u16}us, roll@+250 = {=i16}",
                tables.throttle_command(500),
                tables.stick_command(250)
            );
        }
    }
}

/// The record has nowhere to live; keep the board inert
async fn halt(e: StoreError) -> ! {
    error!("Config medium unusable: {}", e);
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
