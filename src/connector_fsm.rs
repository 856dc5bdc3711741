//! Connector role FSM. Turns USB-C orientation and partner notifications into
//! switch programs on the FSA4480.
//!
//! Two notification flavours exist. Raw CC-OUT codes (0 = CC1, 1 = CC2,
//! 2 = open) always reprogram the switch, even when the orientation did not
//! change. Partner type notifications only act on an actual change to one of
//! the routed partner types.

use super::fsa4480::{self, Fsa4480, Routing, SwitchMode};
use super::status::DeviceStatus;

use embedded_hal::blocking::{
    delay::DelayUs,
    i2c::{Write, WriteRead},
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectorRole {
    Cc1,
    Cc2,
    Open,
}

impl ConnectorRole {
    pub const fn switch_mode(self) -> SwitchMode {
        match self {
            ConnectorRole::Cc1 => SwitchMode::SetUsbcCC1,
            ConnectorRole::Cc2 => SwitchMode::SetUsbcCC2,
            ConnectorRole::Open => SwitchMode::SetDpDisconnected,
        }
    }
}

/// A notification code outside the known set. These are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnrecognizedEvent(pub u32);

impl TryFrom<u32> for ConnectorRole {
    type Error = UnrecognizedEvent;
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ConnectorRole::Cc1),
            1 => Ok(ConnectorRole::Cc2),
            2 => Ok(ConnectorRole::Open),
            code => Err(UnrecognizedEvent(code)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoleState {
    Unknown,
    Cc1,
    Cc2,
    Open,
}

impl RoleState {
    /// Orientation a fixed-routing mode leaves the switch in. Mic ground swaps
    /// keep whatever orientation was there.
    pub const fn from_switch_mode(mode: SwitchMode) -> Option<Self> {
        match mode {
            SwitchMode::SetUsbcCC1 => Some(RoleState::Cc1),
            SwitchMode::SetUsbcCC2 => Some(RoleState::Cc2),
            SwitchMode::SetDpDisconnected => Some(RoleState::Open),
            SwitchMode::SwapMicGround => None,
        }
    }
}

impl From<ConnectorRole> for RoleState {
    fn from(role: ConnectorRole) -> Self {
        match role {
            ConnectorRole::Cc1 => RoleState::Cc1,
            ConnectorRole::Cc2 => RoleState::Cc2,
            ConnectorRole::Open => RoleState::Open,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PartnerType {
    Invalid,
    TypeC,
    AudioAccessory,
    DebugAccessory,
}

impl TryFrom<u32> for PartnerType {
    type Error = UnrecognizedEvent;
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PartnerType::Invalid),
            1 => Ok(PartnerType::TypeC),
            2 => Ok(PartnerType::AudioAccessory),
            3 => Ok(PartnerType::DebugAccessory),
            code => Err(UnrecognizedEvent(code)),
        }
    }
}

/// Partner types that drive the switch, and where they route it. Partner
/// types not listed here leave the hardware alone.
pub const PARTNER_ROUTING: [(PartnerType, Routing); 2] = [
    (PartnerType::Invalid, Routing::DP_DISCONNECTED),
    (PartnerType::AudioAccessory, Routing::AUDIO_ACCESSORY),
];

pub fn partner_routing(partner: PartnerType) -> Option<Routing> {
    PARTNER_ROUTING
        .iter()
        .find(|(entry, _)| *entry == partner)
        .map(|(_, routing)| *routing)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectorEvent {
    // Arg0: raw CC-OUT code as delivered by the notification source
    CcOut(u32),
    PartnerChanged(PartnerType),
}

/// Something connector notifications can be delivered to.
pub trait ConnectorEventSink {
    type Error;
    fn on_connector_event(&mut self, event: ConnectorEvent) -> Result<(), Self::Error>;
}

/// Connector side of the device state. The bus gate and the last
/// `SWITCH_STATUS1` read-back are kept by [`Fsa4480`] next to its register
/// accessors. [`ConnectorFsm::status`] joins both halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    pub role: RoleState,
    /// Last recognized CC-OUT code.
    pub cc_out: Option<u32>,
    pub partner: PartnerType,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            role: RoleState::Unknown,
            cc_out: None,
            partner: PartnerType::Invalid,
        }
    }
}

pub struct ConnectorFsm<T, U>
where
    T: WriteRead + Write,
    U: DelayUs<u32>,
{
    switch: Fsa4480<T, U>,
    state: DeviceState,
}

impl<T, U> ConnectorFsm<T, U>
where
    T: WriteRead + Write,
    U: DelayUs<u32>,
{
    pub fn new(switch: Fsa4480<T, U>) -> Self {
        Self {
            switch,
            state: DeviceState::default(),
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn status(&self) -> DeviceStatus {
        DeviceStatus {
            role: self.state.role,
            cc_out: self.state.cc_out,
            partner: self.state.partner,
            bus_ready: self.switch.is_bus_ready(),
            switch_status: self.switch.last_switch_status(),
        }
    }

    pub fn switch_mut(&mut self) -> &mut Fsa4480<T, U> {
        &mut self.switch
    }

    pub fn into_inner(self) -> Fsa4480<T, U> {
        self.switch
    }

    pub fn set_bus_ready(&mut self, ready: bool) {
        self.switch.set_bus_ready(ready);
    }

    /// Loads the default register table, then parks the switch in the
    /// invalid-partner routing.
    pub fn initialize(&mut self) -> Result<(), fsa4480::Error<T>> {
        if let Err(err) = self.switch.apply_default_register_settings() {
            log::error!("Error writing default registers: {}", err);
            return Err(err);
        }

        self.state = DeviceState::default();

        if let Err(err) = self.setup_partner_routing(PartnerType::Invalid) {
            log::error!("Error setting up partner routing: {}", err);
            return Err(err);
        }

        Ok(())
    }

    /// Best effort: the device is going away, so failures are only logged.
    /// The bus gate is closed afterwards.
    pub fn uninitialize(&mut self) {
        if let Err(err) = self.setup_partner_routing(PartnerType::Invalid) {
            log::warn!("Error restoring disconnected routing on teardown: {}", err);
        }

        self.switch.set_bus_ready(false);
        self.trigger_transition(RoleState::Unknown);
        self.state.cc_out = None;
        self.state.partner = PartnerType::Invalid;
    }

    /// Explicit mode switch. Fixed-routing modes update the recorded role
    /// once the whole program, validation included, has succeeded.
    pub fn switch(&mut self, mode: SwitchMode) -> Result<(), fsa4480::Error<T>> {
        self.switch.switch(mode)?;
        if let Some(role) = RoleState::from_switch_mode(mode) {
            self.trigger_transition(role);
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: ConnectorEvent) -> Result<(), fsa4480::Error<T>> {
        match event {
            ConnectorEvent::CcOut(code) => self.on_cc_out(code),
            ConnectorEvent::PartnerChanged(partner) => self.on_partner_type_changed(partner),
        }
    }

    pub fn on_cc_out(&mut self, code: u32) -> Result<(), fsa4480::Error<T>> {
        log::info!("CC OUT status = {}", code);

        match ConnectorRole::try_from(code) {
            Ok(role) => {
                self.state.cc_out = Some(code);
                self.on_orientation(role)
            }
            Err(UnrecognizedEvent(code)) => {
                log::warn!("Ignoring unrecognized CC OUT code {}", code);
                Ok(())
            }
        }
    }

    /// Reprograms the switch for `role` unconditionally.
    pub fn on_orientation(&mut self, role: ConnectorRole) -> Result<(), fsa4480::Error<T>> {
        self.trigger_transition(role.into());
        self.switch.switch(role.switch_mode())
    }

    pub fn on_partner_type_changed(
        &mut self,
        partner: PartnerType,
    ) -> Result<(), fsa4480::Error<T>> {
        if partner == self.state.partner {
            return Ok(());
        }

        let routing = match partner_routing(partner) {
            Some(routing) => routing,
            None => {
                log::debug!("Partner type {:?} does not drive the switch", partner);
                return Ok(());
            }
        };

        // Only record the partner once routed, so a redelivered event retries.
        self.switch.apply_routing(routing)?;
        log::info!("Partner {:?} => {:?}", self.state.partner, partner);
        self.state.partner = partner;
        Ok(())
    }

    fn setup_partner_routing(&mut self, partner: PartnerType) -> Result<(), fsa4480::Error<T>> {
        match partner_routing(partner) {
            Some(routing) => self.switch.apply_routing(routing),
            None => Ok(()),
        }
    }

    fn trigger_transition(&mut self, role: RoleState) {
        log::info!("{:?} => {:?}", self.state.role, role);
        self.state.role = role;
    }
}

impl<T, U> ConnectorEventSink for ConnectorFsm<T, U>
where
    T: WriteRead + Write,
    U: DelayUs<u32>,
{
    type Error = fsa4480::Error<T>;

    fn on_connector_event(&mut self, event: ConnectorEvent) -> Result<(), Self::Error> {
        self.handle_event(event)
    }
}
