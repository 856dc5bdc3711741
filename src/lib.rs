//! Control of the FSA4480 USB-C audio/DisplayPort analog switch.
//!
//! The chip sits behind a blocking `embedded-hal` I2C bus. Connector
//! orientation and partner notifications are turned into register programs
//! by [`connector_fsm::ConnectorFsm`], and [`controller::SwitchController`]
//! serializes access when notifications come from more than one context.
#![cfg_attr(not(test), no_std)]

pub mod connector_fsm;
pub mod controller;
pub mod event_queue;
pub mod fsa4480;
pub mod status;

pub use connector_fsm::{ConnectorEvent, ConnectorEventSink, ConnectorRole, PartnerType};
pub use controller::SwitchController;
pub use fsa4480::{Error, Fsa4480, Routing, SwitchMode};
pub use status::DeviceStatus;
