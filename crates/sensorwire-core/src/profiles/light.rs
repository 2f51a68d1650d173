use crate::codec::layout::{self, APPLICATION_PORT};
use crate::codec::{ChannelDef, Profile, Scalar, SystemChannel, ValueKind};

// Illuminance is a 32-bit lux count on this family.
const CHANNELS: [ChannelDef; 2] = [
    ChannelDef::new(0x01, layout::TYPE_BATTERY, "battery", ValueKind::BatteryPercent),
    ChannelDef::new(
        0x03,
        layout::TYPE_LUX,
        "illumination",
        ValueKind::Scalar(Scalar::U32Le),
    ),
];

const SYSTEM: [SystemChannel; 6] = [
    SystemChannel::IpsoVersion,
    SystemChannel::SerialNumber,
    SystemChannel::HardwareVersion,
    SystemChannel::SoftwareVersion,
    SystemChannel::PowerOn,
    SystemChannel::DeviceClass,
];

pub static LIGHT: Profile = Profile {
    name: "light",
    model: "EM500 light sensor",
    application_port: APPLICATION_PORT,
    channels: &CHANNELS,
    system: &SYSTEM,
};
