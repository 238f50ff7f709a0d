//! Canonical fault code table and the classifier.
//!
//! The code-to-class mapping is fixed at compile time. Peripheral channel
//! drivers report one of these codes together with their device id and the
//! raw faulty value; [`classify`] turns that into a [`FaultRecord`]. Codes
//! not present in the table classify as persistent-fatal.

use crate::faults::{FaultClass, FaultRecord};

// Device ids of the peripheral channels that report into the core.
/// Battery supply voltage monitor.
pub const DEVICE_UBAT: u16 = 0x0001;
/// Core supply voltage monitor.
pub const DEVICE_VCORE: u16 = 0x0002;
/// Reference voltage monitor.
pub const DEVICE_VREF: u16 = 0x0003;
/// Analog input bank.
pub const DEVICE_AIN: u16 = 0x0010;
/// PWM output bank.
pub const DEVICE_PWM: u16 = 0x0020;
/// Digital output bank.
pub const DEVICE_DOUT: u16 = 0x0021;
/// Pulse-width decoder bank.
pub const DEVICE_PWD: u16 = 0x0030;
/// Program / data flash.
pub const DEVICE_FLASH: u16 = 0x0040;
/// Diagnostic UART.
pub const DEVICE_UART: u16 = 0x0050;
/// CAN controller.
pub const DEVICE_CAN: u16 = 0x0060;
/// Ethernet download interface.
pub const DEVICE_ETH: u16 = 0x0070;
/// Clock and PLL monitor.
pub const DEVICE_CLOCK: u16 = 0x0080;
/// On-die temperature sensor.
pub const DEVICE_TSENS: u16 = 0x0081;
/// Main core self-monitoring.
pub const DEVICE_CORE: u16 = 0x00f0;
/// Companion watchdog processor bus.
pub const DEVICE_COMPANION: u16 = 0x00f1;

// Supply voltage monitors (1..=9)
/// Battery voltage below the warning threshold.
pub const VMON_UBAT_UNDERVOLTAGE: u16 = 1;
/// Battery voltage above the protection threshold.
pub const VMON_UBAT_OVERVOLTAGE: u16 = 2;
/// Core supply below the brown-out threshold.
pub const VMON_VCORE_UNDERVOLTAGE: u16 = 3;
/// Core supply above the absolute maximum.
pub const VMON_VCORE_OVERVOLTAGE: u16 = 4;
/// Reference voltage drifted outside tolerance.
pub const VMON_VREF_DRIFT: u16 = 5;
/// Supply rail shorted.
pub const VMON_SUPPLY_SHORT: u16 = 6;
/// IO supply below threshold.
pub const VMON_VDDIO_UNDERVOLTAGE: u16 = 7;
/// IO supply above threshold.
pub const VMON_VDDIO_OVERVOLTAGE: u16 = 8;
/// Internal charge pump failed to regulate.
pub const VMON_CHARGE_PUMP_FAIL: u16 = 9;

// Analog inputs (10..=17)
/// Analog input below its plausible range.
pub const AIN_OUT_OF_RANGE_LOW: u16 = 10;
/// Analog input above its plausible range.
pub const AIN_OUT_OF_RANGE_HIGH: u16 = 11;
/// Open-load detected on an analog input.
pub const AIN_OPEN_LOAD: u16 = 12;
/// Analog input shorted to ground.
pub const AIN_SHORT_TO_GROUND: u16 = 13;
/// Analog input shorted to battery.
pub const AIN_SHORT_TO_BATTERY: u16 = 14;
/// Analog reference lost during conversion.
pub const AIN_REFERENCE_LOST: u16 = 15;
/// Conversion result not consumed before the next sample.
pub const AIN_SAMPLE_OVERRUN: u16 = 16;
/// Stored calibration block failed its plausibility check.
pub const AIN_CALIBRATION_INVALID: u16 = 17;

// PWM / digital outputs (18..=26)
/// PWM readback did not match the commanded duty cycle.
pub const PWM_READBACK_MISMATCH: u16 = 18;
/// PWM period drifted outside tolerance.
pub const PWM_PERIOD_DRIFT: u16 = 19;
/// PWM output stuck high.
pub const PWM_STUCK_HIGH: u16 = 20;
/// PWM output stuck low.
pub const PWM_STUCK_LOW: u16 = 21;
/// Digital output readback mismatch.
pub const DOUT_READBACK_MISMATCH: u16 = 22;
/// Overcurrent on a digital output.
pub const DOUT_OVERCURRENT: u16 = 23;
/// Open-load on a digital output.
pub const DOUT_OPEN_LOAD: u16 = 24;
/// Output driver overtemperature.
pub const DOUT_OVERTEMPERATURE: u16 = 25;
/// Digital output shorted to battery.
pub const DOUT_SHORT_TO_BATTERY: u16 = 26;

// Pulse-width decoders (27..=31)
/// No edge within the expected interval.
pub const PWD_EDGE_TIMEOUT: u16 = 27;
/// Decoded period outside the configured range.
pub const PWD_PERIOD_OUT_OF_RANGE: u16 = 28;
/// Decoded duty cycle outside the configured range.
pub const PWD_DUTY_OUT_OF_RANGE: u16 = 29;
/// Decoder counter overflowed.
pub const PWD_COUNTER_OVERFLOW: u16 = 30;
/// Signal shape not decodable.
pub const PWD_INVALID_SIGNAL: u16 = 31;

// Flash (32..=37)
/// Correctable single-bit ECC error.
pub const FLASH_ECC_SINGLE_BIT: u16 = 32;
/// Uncorrectable double-bit ECC error.
pub const FLASH_ECC_DOUBLE_BIT: u16 = 33;
/// Write verification failed.
pub const FLASH_WRITE_VERIFY: u16 = 34;
/// Erase operation timed out.
pub const FLASH_ERASE_TIMEOUT: u16 = 35;
/// Application image CRC mismatch.
pub const FLASH_CRC_MISMATCH: u16 = 36;
/// Write attempted to a protected sector.
pub const FLASH_WRITE_PROTECT_VIOLATION: u16 = 37;

// UART (38..=41)
/// Framing error on the diagnostic UART.
pub const UART_FRAMING: u16 = 38;
/// Parity error on the diagnostic UART.
pub const UART_PARITY: u16 = 39;
/// Receive overrun on the diagnostic UART.
pub const UART_OVERRUN: u16 = 40;
/// Persistent break condition on the line.
pub const UART_BREAK_DETECT: u16 = 41;

// CAN (42..=47)
/// Transmit confirmation timed out.
pub const CAN_TX_TIMEOUT: u16 = 42;
/// Expected frame not received in time.
pub const CAN_RX_TIMEOUT: u16 = 43;
/// Controller entered bus-off.
pub const CAN_BUS_OFF: u16 = 44;
/// Controller entered error-passive.
pub const CAN_ERROR_PASSIVE: u16 = 45;
/// Frame CRC mismatch.
pub const CAN_MESSAGE_CRC: u16 = 46;
/// Bit-stuffing violation.
pub const CAN_STUFF_ERROR: u16 = 47;

// Ethernet download (48..=50)
/// Link lost during a download session.
pub const ETH_LINK_LOST: u16 = 48;
/// Frame CRC mismatch during download.
pub const ETH_FRAME_CRC: u16 = 49;
/// Download session aborted by the peer.
pub const ETH_DOWNLOAD_ABORT: u16 = 50;

// Clock & temperature monitors (51..=56)
/// PLL lost lock.
pub const CLOCK_PLL_UNLOCK: u16 = 51;
/// System clock drifted outside tolerance.
pub const CLOCK_DRIFT: u16 = 52;
/// System clock lost entirely.
pub const CLOCK_LOSS: u16 = 53;
/// Die temperature above the operating limit.
pub const TSENS_OVERTEMPERATURE: u16 = 54;
/// Die temperature below the operating limit.
pub const TSENS_UNDERTEMPERATURE: u16 = 55;
/// Temperature sensor implausible or disconnected.
pub const TSENS_SENSOR_FAULT: u16 = 56;

// Memory & core monitors (57..=63)
/// Correctable single-bit RAM ECC error.
pub const RAM_ECC_SINGLE_BIT: u16 = 57;
/// Uncorrectable double-bit RAM ECC error.
pub const RAM_ECC_DOUBLE_BIT: u16 = 58;
/// Periodic RAM march test failed.
pub const RAM_MARCH_TEST_FAIL: u16 = 59;
/// Lockstep core comparison mismatch.
pub const CORE_LOCKSTEP_MISMATCH: u16 = 60;
/// Core register self-test failed.
pub const CORE_REGISTER_TEST_FAIL: u16 = 61;
/// Memory protection unit access violation.
pub const MPU_ACCESS_VIOLATION: u16 = 62;
/// Stack guard pattern corrupted.
pub const STACK_CANARY_CORRUPT: u16 = 63;

// Task cycle monitors (64..=66)
/// Task cycle finished after its deadline.
pub const CYCLE_OVERRUN: u16 = 64;
/// Task cycle started before its release point.
pub const CYCLE_UNDERRUN: u16 = 65;
/// A monitored task missed its deadline outright.
pub const TASK_DEADLINE_MISS: u16 = 66;

// Configuration & descriptor (67..=69)
/// Configuration value outside its documented range.
pub const CONFIG_RANGE_VIOLATION: u16 = 67;
/// Configuration block CRC mismatch.
pub const CONFIG_CRC_MISMATCH: u16 = 68;
/// Application descriptor version not supported.
pub const DESCRIPTOR_VERSION_MISMATCH: u16 = 69;

// Companion bus (70..=72)
/// CRC error on the companion SPI frame.
pub const COMPANION_SPI_CRC: u16 = 70;
/// Companion SPI transfer timed out.
pub const COMPANION_SPI_TIMEOUT: u16 = 71;
/// Companion reported a state outside its enumeration.
pub const COMPANION_STATE_INVALID: u16 = 72;

// Core-internal faults (73..=76). Always persistent-fatal.
/// The diagnostic state variable held a value outside its enumeration.
pub const INVALID_DIAG_STATE: u16 = 73;
/// The main side missed its own trigger window.
pub const WD_SELF_MONITORING: u16 = 74;
/// The companion missed its trigger window.
pub const WD_VICE_VERSA_MONITORING: u16 = 75;
/// The error callback re-entered a core entry point.
pub const ERROR_CALLBACK_RECURSION: u16 = 76;

/// Class assignment for a canonical fault code.
///
/// Unknown codes classify as [`FaultClass::PersistentFatal`]: a detection
/// the table does not know about must never be debounced or negotiated away.
#[must_use]
pub fn class_of(code: u16) -> FaultClass {
    match code {
        VMON_UBAT_UNDERVOLTAGE
        | VMON_VREF_DRIFT
        | VMON_VDDIO_UNDERVOLTAGE
        | AIN_OUT_OF_RANGE_LOW
        | AIN_OUT_OF_RANGE_HIGH
        | AIN_SAMPLE_OVERRUN
        | PWM_PERIOD_DRIFT
        | PWD_EDGE_TIMEOUT
        | PWD_PERIOD_OUT_OF_RANGE
        | PWD_DUTY_OUT_OF_RANGE
        | FLASH_ECC_SINGLE_BIT
        | UART_FRAMING
        | UART_PARITY
        | UART_OVERRUN
        | CAN_TX_TIMEOUT
        | CAN_RX_TIMEOUT
        | CAN_ERROR_PASSIVE
        | CAN_MESSAGE_CRC
        | CAN_STUFF_ERROR
        | ETH_LINK_LOST
        | ETH_FRAME_CRC
        | CLOCK_DRIFT
        | TSENS_UNDERTEMPERATURE
        | RAM_ECC_SINGLE_BIT
        | CYCLE_OVERRUN
        | CYCLE_UNDERRUN
        | COMPANION_SPI_CRC => FaultClass::TemporaryNonFatal,

        VMON_UBAT_OVERVOLTAGE
        | VMON_VCORE_UNDERVOLTAGE
        | VMON_VDDIO_OVERVOLTAGE
        | PWM_READBACK_MISMATCH
        | DOUT_READBACK_MISMATCH
        | DOUT_OVERTEMPERATURE
        | CLOCK_PLL_UNLOCK
        | TSENS_OVERTEMPERATURE
        | TASK_DEADLINE_MISS
        | COMPANION_SPI_TIMEOUT => FaultClass::TemporaryFatal,

        AIN_OPEN_LOAD
        | AIN_CALIBRATION_INVALID
        | DOUT_OPEN_LOAD
        | PWD_COUNTER_OVERFLOW
        | FLASH_WRITE_VERIFY
        | FLASH_ERASE_TIMEOUT
        | UART_BREAK_DETECT
        | CAN_BUS_OFF
        | ETH_DOWNLOAD_ABORT
        | TSENS_SENSOR_FAULT
        | CONFIG_RANGE_VIOLATION
        | DESCRIPTOR_VERSION_MISMATCH => FaultClass::PersistentNonFatal,

        // Everything else, including the core-internal codes and codes not
        // present in the table, is persistent-fatal.
        _ => FaultClass::PersistentFatal,
    }
}

/// Classify a raw detection into a canonical fault record.
///
/// Pure and total over the fixed code table; there is no failure mode other
/// than an unknown code, which is handled by the persistent-fatal default.
#[must_use]
pub fn classify(code: u16, device: u16, faulty_value: u32, now_us: u64) -> FaultRecord {
    FaultRecord::new(code, device, faulty_value, class_of(code), now_us)
}

/// Returns true for the core-internal fault codes.
///
/// These are synthesized by the core itself rather than reported by a
/// peripheral and are always persistent-fatal regardless of configuration.
#[must_use]
pub fn is_core_internal(code: u16) -> bool {
    matches!(
        code,
        INVALID_DIAG_STATE | WD_SELF_MONITORING | WD_VICE_VERSA_MONITORING
            | ERROR_CALLBACK_RECURSION
    )
}
