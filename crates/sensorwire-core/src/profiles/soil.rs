use crate::codec::layout::{self, APPLICATION_PORT};
use crate::codec::{ChannelDef, Profile, Scalar, SystemChannel, ValueKind};

const CHANNELS: [ChannelDef; 4] = [
    ChannelDef::new(0x01, layout::TYPE_BATTERY, "battery", ValueKind::BatteryPercent),
    ChannelDef::new(
        0x03,
        layout::TYPE_TEMPERATURE,
        "temperature",
        ValueKind::Scaled {
            scalar: Scalar::I16Le,
            divisor: 10.0,
        },
    ),
    ChannelDef::new(
        0x04,
        layout::TYPE_HUMIDITY,
        "moisture",
        ValueKind::Scaled {
            scalar: Scalar::U8,
            divisor: 2.0,
        },
    ),
    ChannelDef::new(
        0x05,
        layout::TYPE_CONDUCTIVITY,
        "conductivity",
        ValueKind::Scalar(Scalar::U16Le),
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

/// Soil probe: temperature, volumetric moisture, electrical conductivity.
pub static SOIL: Profile = Profile {
    name: "soil",
    model: "EM500 soil monitor",
    application_port: APPLICATION_PORT,
    channels: &CHANNELS,
    system: &SYSTEM,
};
