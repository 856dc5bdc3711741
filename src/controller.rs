//! Shared handle around the connector FSM.
//!
//! Notifications can arrive from several contexts while a previous switch
//! program is still running. Every operation here takes the lock for its
//! whole register sequence, including the settle delay, so two programs never
//! interleave on the bus.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use embedded_hal::blocking::{
    delay::DelayUs,
    i2c::{Write, WriteRead},
};

use super::connector_fsm::{ConnectorEvent, ConnectorEventSink, ConnectorFsm, DeviceState};
use super::fsa4480::{self, Fsa4480, SwitchMode};
use super::status::DeviceStatus;

pub struct SwitchController<M, T, U>
where
    M: RawMutex,
    T: WriteRead + Write,
    U: DelayUs<u32>,
{
    fsm: Mutex<M, RefCell<ConnectorFsm<T, U>>>,
}

impl<M, T, U> SwitchController<M, T, U>
where
    M: RawMutex,
    T: WriteRead + Write,
    U: DelayUs<u32>,
{
    pub fn new(switch: Fsa4480<T, U>) -> Self {
        Self {
            fsm: Mutex::new(RefCell::new(ConnectorFsm::new(switch))),
        }
    }

    fn with_fsm<R>(&self, f: impl FnOnce(&mut ConnectorFsm<T, U>) -> R) -> R {
        self.fsm.lock(|fsm| f(&mut fsm.borrow_mut()))
    }

    /// Called by the bus owner once transfers can be issued, and with `false`
    /// before the bus goes away.
    pub fn set_bus_ready(&self, ready: bool) {
        self.with_fsm(|fsm| fsm.set_bus_ready(ready))
    }

    pub fn initialize(&self) -> Result<(), fsa4480::Error<T>> {
        self.with_fsm(|fsm| fsm.initialize())
    }

    pub fn uninitialize(&self) {
        self.with_fsm(|fsm| fsm.uninitialize())
    }

    pub fn switch(&self, mode: SwitchMode) -> Result<(), fsa4480::Error<T>> {
        self.with_fsm(|fsm| fsm.switch(mode))
    }

    pub fn update_settings(&self, control: u8, enable: u8) -> Result<(), fsa4480::Error<T>> {
        self.with_fsm(|fsm| fsm.switch_mut().update_settings(control, enable))
    }

    pub fn validate_display_port_settings(&self) -> Result<u8, fsa4480::Error<T>> {
        self.with_fsm(|fsm| fsm.switch_mut().validate_display_port_settings())
    }

    pub fn reset(&self) -> Result<(), fsa4480::Error<T>> {
        self.with_fsm(|fsm| fsm.switch_mut().reset())
    }

    pub fn handle_event(&self, event: ConnectorEvent) -> Result<(), fsa4480::Error<T>> {
        self.with_fsm(|fsm| fsm.handle_event(event))
    }

    pub fn state(&self) -> DeviceState {
        self.with_fsm(|fsm| fsm.state())
    }

    pub fn status(&self) -> DeviceStatus {
        self.with_fsm(|fsm| fsm.status())
    }

    pub fn into_inner(self) -> ConnectorFsm<T, U> {
        self.fsm.into_inner().into_inner()
    }
}

impl<M, T, U> ConnectorEventSink for &SwitchController<M, T, U>
where
    M: RawMutex,
    T: WriteRead + Write,
    U: DelayUs<u32>,
{
    type Error = fsa4480::Error<T>;

    fn on_connector_event(&mut self, event: ConnectorEvent) -> Result<(), Self::Error> {
        self.handle_event(event)
    }
}
