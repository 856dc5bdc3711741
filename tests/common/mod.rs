#![allow(dead_code)]

use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

use embedded_hal::blocking::{
    delay::DelayUs,
    i2c::{Write, WriteRead},
};
use embedded_hal_mock::eh0::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use embedded_hal_mock::eh0::MockError;

use fsa4480::Fsa4480;

pub const DEVICE_ADDR: u8 = 0x42;

pub const SWITCH_SETTINGS: u8 = 0x04;
pub const SWITCH_CONTROL: u8 = 0x05;
pub const SWITCH_STATUS1: u8 = 0x07;
pub const RESET: u8 = 0x1E;

pub const DEFAULT_TABLE: [(u8, u8); 10] = [
    (0x08, 0x00),
    (0x09, 0x00),
    (0x0A, 0x00),
    (0x0B, 0x00),
    (0x0C, 0x00),
    (0x0D, 0x00),
    (0x0E, 0x00),
    (0x0F, 0x00),
    (0x10, 0x09),
    (0x04, 0x98),
];

pub fn write(register: u8, value: u8) -> I2cTransaction {
    I2cTransaction::write(DEVICE_ADDR, vec![register, value])
}

pub fn read(register: u8, value: u8) -> I2cTransaction {
    I2cTransaction::write_read(DEVICE_ADDR, vec![register], vec![value])
}

pub fn io_error() -> MockError {
    MockError::Io(ErrorKind::Other)
}

pub fn update_settings(control: u8, enable: u8) -> Vec<I2cTransaction> {
    vec![
        write(SWITCH_SETTINGS, 0x80),
        write(SWITCH_CONTROL, control),
        write(SWITCH_SETTINGS, enable),
    ]
}

pub fn default_table() -> Vec<I2cTransaction> {
    DEFAULT_TABLE
        .iter()
        .map(|(register, value)| write(*register, *value))
        .collect()
}

/// Records every requested delay. Clones share the record.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    calls: Arc<Mutex<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

impl DelayUs<u32> for RecordingDelay {
    fn delay_us(&mut self, us: u32) {
        self.calls.lock().unwrap().push(us);
    }
}

pub type MockDriver = Fsa4480<I2cMock, RecordingDelay>;

/// Driver over a mock bus that already reports ready. The returned mock and
/// delay share state with the ones inside the driver.
pub fn ready_driver(expectations: &[I2cTransaction]) -> (MockDriver, I2cMock, RecordingDelay) {
    let i2c = I2cMock::new(expectations);
    let delay = RecordingDelay::default();
    let mut driver = Fsa4480::new(i2c.clone(), delay.clone());
    driver.set_bus_ready(true);
    (driver, i2c, delay)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Write(u8, u8),
    Read(u8),
    Delay(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

struct SimState {
    registers: [u8; 0x20],
    status_override: Option<u8>,
    log: Vec<BusOp>,
}

/// Register-file stand-in for the chip. `SWITCH_STATUS1` follows the routing
/// unless overridden. Clones share the same chip.
#[derive(Clone)]
pub struct ChipSim {
    state: Arc<Mutex<SimState>>,
}

impl ChipSim {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                registers: [0; 0x20],
                status_override: None,
                log: Vec::new(),
            })),
        }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay {
            state: self.state.clone(),
        }
    }

    pub fn set_status_override(&self, status: Option<u8>) {
        self.state.lock().unwrap().status_override = status;
    }

    pub fn register(&self, address: u8) -> u8 {
        self.state.lock().unwrap().registers[address as usize]
    }

    pub fn log(&self) -> Vec<BusOp> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }
}

fn derived_status(registers: &[u8; 0x20]) -> u8 {
    if registers[SWITCH_SETTINGS as usize] != 0xF8 {
        return 0x00;
    }
    match registers[SWITCH_CONTROL as usize] {
        0x18 => 0x23,
        0x78 => 0x1C,
        _ => 0x00,
    }
}

impl Write for ChipSim {
    type Error = SimError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        assert_eq!(address, DEVICE_ADDR);
        assert_eq!(bytes.len(), 2, "single register writes only");
        let mut state = self.state.lock().unwrap();
        state.registers[bytes[0] as usize] = bytes[1];
        state.log.push(BusOp::Write(bytes[0], bytes[1]));
        Ok(())
    }
}

impl WriteRead for ChipSim {
    type Error = SimError;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        assert_eq!(address, DEVICE_ADDR);
        assert_eq!(bytes.len(), 1);
        assert_eq!(buffer.len(), 1);
        let mut state = self.state.lock().unwrap();
        let register = bytes[0];
        buffer[0] = if register == SWITCH_STATUS1 {
            state
                .status_override
                .unwrap_or_else(|| derived_status(&state.registers))
        } else {
            state.registers[register as usize]
        };
        state.log.push(BusOp::Read(register));
        Ok(())
    }
}

pub struct SimDelay {
    state: Arc<Mutex<SimState>>,
}

impl DelayUs<u32> for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.state.lock().unwrap().log.push(BusOp::Delay(us));
        std::thread::yield_now();
    }
}

/// Splits a bus log into complete switch programs. Panics if any program is
/// cut short or interleaved with another one.
pub fn split_programs(log: &[BusOp]) -> Vec<Vec<BusOp>> {
    let mut programs = Vec::new();
    let mut i = 0;
    while i < log.len() {
        let start = i;
        if log[i] == BusOp::Read(SWITCH_CONTROL) {
            i += 1;
        }
        assert_eq!(log[i], BusOp::Write(SWITCH_SETTINGS, 0x80), "at {}", i);
        assert!(matches!(log[i + 1], BusOp::Write(SWITCH_CONTROL, _)), "at {}", i + 1);
        assert_eq!(log[i + 2], BusOp::Delay(55), "at {}", i + 2);
        assert!(matches!(log[i + 3], BusOp::Write(SWITCH_SETTINGS, _)), "at {}", i + 3);
        i += 4;
        if i < log.len() && log[i] == BusOp::Read(SWITCH_STATUS1) {
            i += 1;
        }
        programs.push(log[start..i].to_vec());
    }
    programs
}
