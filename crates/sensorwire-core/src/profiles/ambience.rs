use crate::codec::layout::{self, APPLICATION_PORT};
use crate::codec::{ChannelDef, Profile, Scalar, SystemChannel, ValueKind};

const CHANNELS: [ChannelDef; 8] = [
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
        "humidity",
        ValueKind::Scaled {
            scalar: Scalar::U8,
            divisor: 2.0,
        },
    ),
    ChannelDef::new(
        0x05,
        layout::TYPE_ACTIVITY,
        "activity",
        ValueKind::Scalar(Scalar::U16Le),
    ),
    ChannelDef::new(
        0x06,
        layout::TYPE_ILLUMINATION,
        "illumination",
        ValueKind::Scalar(Scalar::U16Le),
    ),
    ChannelDef::new(
        0x07,
        layout::TYPE_CONCENTRATION,
        "co2",
        ValueKind::Scalar(Scalar::U16Le),
    ),
    ChannelDef::new(
        0x08,
        layout::TYPE_CONCENTRATION,
        "tvoc",
        ValueKind::Scalar(Scalar::U16Le),
    ),
    ChannelDef::new(
        0x09,
        layout::TYPE_PRESSURE,
        "pressure",
        ValueKind::Scaled {
            scalar: Scalar::U16Le,
            divisor: 10.0,
        },
    ),
];

/// Indoor ambience monitor: climate, occupancy and air quality.
pub static AMBIENCE: Profile = Profile {
    name: "ambience",
    model: "AM100 ambience monitor",
    application_port: APPLICATION_PORT,
    channels: &CHANNELS,
    system: &SystemChannel::ALL,
};
