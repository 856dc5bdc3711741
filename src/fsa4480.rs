const DEVICE_SLAVE_ADDR: u8 = 0x42;

/// Time the chip needs after `SWITCH_CONTROL` changes before it observes the
/// enable write correctly.
pub const SWITCH_SETTLE_TIME_US: u32 = 55;

pub mod registers;

use embedded_hal::blocking::{
    delay::DelayUs,
    i2c::{Write, WriteRead},
};

pub enum Error<T: WriteRead + Write> {
    /// The register bus has not been brought up yet, or was already torn down.
    BusUnavailable,
    IOReadError(<T as WriteRead>::Error),
    IOWriteError(<T as Write>::Error),
    /// `SWITCH_STATUS1` read back something other than a routed AUX pattern.
    InvalidAuxConfiguration(u8),
}

impl<T: WriteRead + Write> core::fmt::Debug for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::BusUnavailable => write!(f, "BusUnavailable"),
            Error::IOReadError(_) => write!(f, "IO Error (Read)"),
            Error::IOWriteError(_) => write!(f, "IO Error (Write)"),
            Error::InvalidAuxConfiguration(status) => {
                write!(f, "InvalidAuxConfiguration(0x{:02x})", status)
            }
        }
    }
}

impl<T: WriteRead + Write> core::fmt::Display for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::BusUnavailable => write!(f, "register bus is not ready"),
            Error::IOReadError(_) => write!(f, "register read failed"),
            Error::IOWriteError(_) => write!(f, "register write failed"),
            Error::InvalidAuxConfiguration(status) => write!(
                f,
                "invalid AUX switch configuration for DisplayPort (status 0x{:02x})",
                status
            ),
        }
    }
}

/// A (`SWITCH_CONTROL`, `SWITCH_SETTINGS`) byte pair. Every routing the chip
/// is put into is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Routing {
    pub control: u8,
    pub enable: u8,
}

impl Routing {
    pub const DP_DISCONNECTED: Self = Self::new(
        registers::switch_control::USBC_CC1,
        registers::switch_settings::DP_DISCONNECTED,
    );
    pub const USBC_CC1: Self = Self::new(
        registers::switch_control::USBC_CC1,
        registers::switch_settings::USBC_ENABLED,
    );
    pub const USBC_CC2: Self = Self::new(
        registers::switch_control::USBC_CC2,
        registers::switch_settings::USBC_ENABLED,
    );
    pub const AUDIO_ACCESSORY: Self = Self::new(
        registers::switch_control::AUDIO,
        registers::switch_settings::AUDIO_ENABLED,
    );

    pub const fn new(control: u8, enable: u8) -> Self {
        Self { control, enable }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchMode {
    SwapMicGround,
    SetUsbcCC1,
    SetUsbcCC2,
    SetDpDisconnected,
}

impl SwitchMode {
    /// Fixed routing for the mode, `None` for modes computed from the
    /// current register contents.
    pub const fn routing(self) -> Option<Routing> {
        match self {
            SwitchMode::SwapMicGround => None,
            SwitchMode::SetUsbcCC1 => Some(Routing::USBC_CC1),
            SwitchMode::SetUsbcCC2 => Some(Routing::USBC_CC2),
            SwitchMode::SetDpDisconnected => Some(Routing::DP_DISCONNECTED),
        }
    }

    pub const fn validates_aux(self) -> bool {
        matches!(self, SwitchMode::SetUsbcCC1 | SwitchMode::SetUsbcCC2)
    }
}

/// Flips the low three control bits as a group. Anything short of all three
/// set is treated as "off" and turned fully on.
pub const fn toggle_mic_ground(control: u8) -> u8 {
    let mask = registers::switch_control::MIC_GND_SWAP_MASK;
    if control & mask == mask {
        0x00
    } else {
        mask
    }
}

pub const fn is_valid_aux_status(status: u8) -> bool {
    status == registers::switch_status1::AUX_ROUTED_CC1
        || status == registers::switch_status1::AUX_ROUTED_CC2
}

pub struct Fsa4480<T: WriteRead + Write, U: DelayUs<u32>> {
    i2c_bus: T,
    timer: U,
    bus_ready: bool,
    switch_status: Option<u8>,
}

impl<T: WriteRead + Write, U: DelayUs<u32>> Fsa4480<T, U> {
    /// The bus starts out closed. Nothing is sent to the chip until the bus
    /// owner reports it ready through [`Fsa4480::set_bus_ready`].
    pub fn new(i2c_bus: T, timer: U) -> Self {
        Self {
            i2c_bus,
            timer,
            bus_ready: false,
            switch_status: None,
        }
    }

    pub fn set_bus_ready(&mut self, ready: bool) {
        if ready != self.bus_ready {
            log::info!("Register bus ready: {} => {}", self.bus_ready, ready);
        }
        self.bus_ready = ready;
    }

    pub fn is_bus_ready(&self) -> bool {
        self.bus_ready
    }

    /// Last `SWITCH_STATUS1` value read back, valid or not.
    pub fn last_switch_status(&self) -> Option<u8> {
        self.switch_status
    }

    pub fn release(self) -> (T, U) {
        (self.i2c_bus, self.timer)
    }

    /// Reprograms the bridge: disable, route, settle, enable. There is no
    /// rollback, a failure leaves the chip wherever the failing step left it.
    pub fn update_settings(&mut self, control: u8, enable: u8) -> Result<(), Error<T>> {
        self.write_register(
            registers::switch_settings::ADDR,
            registers::switch_settings::DISABLE,
        )?;
        self.write_register(registers::switch_control::ADDR, control)?;

        self.timer.delay_us(SWITCH_SETTLE_TIME_US);

        self.write_register(registers::switch_settings::ADDR, enable)
    }

    pub fn apply_routing(&mut self, routing: Routing) -> Result<(), Error<T>> {
        log::debug!(
            "Routing control 0x{:02x}, enable 0x{:02x}",
            routing.control,
            routing.enable
        );
        self.update_settings(routing.control, routing.enable)
    }

    pub fn apply_default_register_settings(&mut self) -> Result<(), Error<T>> {
        for (address, value) in registers::DEFAULT_SETTINGS {
            if let Err(err) = self.write_register(address, value) {
                log::error!("Error writing default register 0x{:02x}: {}", address, err);
                return Err(err);
            }
        }

        log::info!("Done writing default register values");
        Ok(())
    }

    /// Reads back `SWITCH_STATUS1` and checks that AUX is routed for one of
    /// the two orientations. Returns the status byte.
    pub fn validate_display_port_settings(&mut self) -> Result<u8, Error<T>> {
        let status = self.read_register(registers::switch_status1::ADDR)?;
        self.switch_status = Some(status);

        if !is_valid_aux_status(status) {
            log::error!(
                "Invalid AUX switch configuration for DisplayPort! status 0x{:02x}",
                status
            );
            return Err(Error::InvalidAuxConfiguration(status));
        }

        log::info!(
            "Valid AUX switch configuration for DisplayPort, status 0x{:02x}",
            status
        );
        Ok(status)
    }

    pub fn switch(&mut self, mode: SwitchMode) -> Result<(), Error<T>> {
        log::info!("Switching to {:?}", mode);

        let routing = match mode.routing() {
            Some(routing) => routing,
            None => return self.swap_mic_ground(),
        };

        if let Err(err) = self.apply_routing(routing) {
            log::error!("Error updating switch settings for {:?}: {}", mode, err);
            return Err(err);
        }

        if mode.validates_aux() {
            self.validate_display_port_settings()?;
        }

        Ok(())
    }

    fn swap_mic_ground(&mut self) -> Result<(), Error<T>> {
        let control = match self.read_register(registers::switch_control::ADDR) {
            Ok(control) => control,
            Err(err) => {
                log::error!("Error reading switch control: {}", err);
                return Err(err);
            }
        };

        let control = toggle_mic_ground(control);
        self.update_settings(control, registers::switch_settings::AUDIO_ENABLED)
    }

    /// Software reset of the chip. Register contents return to power-on
    /// values, so the last status read-back is forgotten.
    pub fn reset(&mut self) -> Result<(), Error<T>> {
        self.write_register(registers::reset::ADDR, registers::reset::SW_RESET)?;
        self.switch_status = None;
        log::info!("Fsa4480 software reset");
        Ok(())
    }

    fn read_register(&mut self, address: u8) -> Result<u8, Error<T>> {
        if !self.bus_ready {
            log::error!("Register bus is not ready, not reading 0x{:02x}", address);
            return Err(Error::BusUnavailable);
        }

        let addr_buffer = [address];

        let mut register_value = [0];
        self.i2c_bus
            .write_read(DEVICE_SLAVE_ADDR, &addr_buffer, &mut register_value)
            .map_err(|err| Error::IOReadError(err))?;

        Ok(register_value[0])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error<T>> {
        if !self.bus_ready {
            log::error!("Register bus is not ready, not writing 0x{:02x}", address);
            return Err(Error::BusUnavailable);
        }

        let addr_buffer = [address, value];
        self.i2c_bus
            .write(DEVICE_SLAVE_ADDR, &addr_buffer)
            .map_err(|err| Error::IOWriteError(err))?;

        Ok(())
    }
}
