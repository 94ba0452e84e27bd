// HMC8553L
pub const HMC8553L_MAG_ADDR: u16 = 0x1E;

pub const HMC8553L_CONF_A: u8 = 0x00;
pub const HMC8553L_CONF_B: u8 = 0x01;
pub const HMC8553L_MODE: u8 = 0x02;
pub const HMC8553L_X_H: u8 = 0x03;
pub const HMC8553L_X_L: u8 = 0x04;
pub const HMC8553L_Z_H: u8 = 0x05;
pub const HMC8553L_Z_L: u8 = 0x06;
pub const HMC8553L_Y_H: u8 = 0x07;
pub const HMC8553L_Y_L: u8 = 0x08;
