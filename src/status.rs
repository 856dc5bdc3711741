use serde::{Deserialize, Serialize};

use super::connector_fsm::{PartnerType, RoleState};
use super::fsa4480;

/// Point-in-time view of the controller, suitable for handing to host tooling.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub role: RoleState,
    pub cc_out: Option<u32>,
    pub partner: PartnerType,
    pub bus_ready: bool,
    /// Last `SWITCH_STATUS1` read-back, if any.
    pub switch_status: Option<u8>,
}

impl DeviceStatus {
    pub fn aux_routed(&self) -> bool {
        self.switch_status
            .map(fsa4480::is_valid_aux_status)
            .unwrap_or(false)
    }
}
