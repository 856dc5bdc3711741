pub mod switch_settings {
    pub const ADDR: u8 = 0x04;
    /// Written first in every update so the bridge settles before rerouting.
    pub const DISABLE: u8 = 0x80;
    pub const DP_DISCONNECTED: u8 = 0x98;
    pub const USBC_ENABLED: u8 = 0xF8;
    pub const AUDIO_ENABLED: u8 = 0x9F;
}

pub mod switch_control {
    pub const ADDR: u8 = 0x05;
    pub const MIC_GND_SWAP_MASK: u8 = 0x07;
    pub const AUDIO: u8 = 0x00;
    pub const USBC_CC1: u8 = 0x18;
    pub const USBC_CC2: u8 = 0x78;
}

pub mod switch_status1 {
    pub const ADDR: u8 = 0x07;
    pub const AUX_ROUTED_CC1: u8 = 0x23;
    pub const AUX_ROUTED_CC2: u8 = 0x1C;
}

pub mod slow_l {
    pub const ADDR: u8 = 0x08;
}

pub mod slow_r {
    pub const ADDR: u8 = 0x09;
}

pub mod slow_mic {
    pub const ADDR: u8 = 0x0A;
}

pub mod slow_sense {
    pub const ADDR: u8 = 0x0B;
}

pub mod slow_gnd {
    pub const ADDR: u8 = 0x0C;
}

pub mod delay_l_r {
    pub const ADDR: u8 = 0x0D;
}

pub mod delay_l_mic {
    pub const ADDR: u8 = 0x0E;
}

pub mod delay_l_sense {
    pub const ADDR: u8 = 0x0F;
}

pub mod delay_l_agnd {
    pub const ADDR: u8 = 0x10;
}

pub mod reset {
    pub const ADDR: u8 = 0x1E;
    pub const SW_RESET: u8 = 0x01;
}

/// Register values applied once at bring-up, in order. Slew and delay
/// registers come first, the switch enable register must stay last.
pub const DEFAULT_SETTINGS: [(u8, u8); 10] = [
    (slow_l::ADDR, 0x00),
    (slow_r::ADDR, 0x00),
    (slow_mic::ADDR, 0x00),
    (slow_sense::ADDR, 0x00),
    (slow_gnd::ADDR, 0x00),
    (delay_l_r::ADDR, 0x00),
    (delay_l_mic::ADDR, 0x00),
    (delay_l_sense::ADDR, 0x00),
    (delay_l_agnd::ADDR, 0x09),
    (switch_settings::ADDR, switch_settings::DP_DISCONNECTED),
];
