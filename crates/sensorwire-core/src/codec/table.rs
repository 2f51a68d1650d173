use super::error::{DecodeError, PortMismatch};
use super::layout;
use super::reader::ChannelReader;
use super::value::{self, FieldValue};
use crate::DecodedPayload;

/// Fixed-width integer encodings used by sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    U8,
    U16Le,
    I16Le,
    U32Le,
}

impl Scalar {
    pub const fn width(self) -> usize {
        match self {
            Scalar::U8 => 1,
            Scalar::U16Le | Scalar::I16Le => 2,
            Scalar::U32Le => 4,
        }
    }

    fn read(self, reader: &mut ChannelReader<'_>) -> Result<i64, DecodeError> {
        Ok(match self {
            Scalar::U8 => i64::from(reader.read_u8()?),
            Scalar::U16Le => i64::from(reader.read_u16_le()?),
            Scalar::I16Le => i64::from(reader.read_i16_le()?),
            Scalar::U32Le => i64::from(reader.read_u32_le()?),
        })
    }
}

/// How the data bytes of a channel turn into a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    /// Raw integer.
    Scalar(Scalar),
    /// Raw integer divided by `divisor` (floating point).
    Scaled { scalar: Scalar, divisor: f64 },
    /// One byte, saturated at 100.
    BatteryPercent,
    /// Big-endian 16-bit mask, one named flag per bit from bit 0 upwards.
    Flags { names: &'static [&'static str] },
    /// `len` bytes as hyphenated lowercase hex.
    HexString { len: usize },
    /// Big-endian BCD `major.minor` word.
    BcdVersion,
    /// One byte, `v{high nibble}.{low nibble}`.
    IpsoVersion,
    /// One byte whose presence is the event.
    Event,
    /// One byte LoRaWAN class index.
    DeviceClass,
}

impl ValueKind {
    pub const fn width(self) -> usize {
        match self {
            ValueKind::Scalar(scalar) | ValueKind::Scaled { scalar, .. } => scalar.width(),
            ValueKind::BatteryPercent
            | ValueKind::IpsoVersion
            | ValueKind::Event
            | ValueKind::DeviceClass => 1,
            ValueKind::Flags { .. } => layout::FLAGS_LEN,
            ValueKind::HexString { len } => len,
            ValueKind::BcdVersion => layout::VERSION_LEN,
        }
    }

    /// Decodes exactly `self.width()` bytes, or none at all when fewer remain.
    pub fn decode(self, reader: &mut ChannelReader<'_>) -> Result<FieldValue, DecodeError> {
        reader.require_remaining(self.width())?;
        let value = match self {
            ValueKind::Scalar(scalar) => FieldValue::Integer(scalar.read(reader)?),
            ValueKind::Scaled { scalar, divisor } => {
                FieldValue::Number(scalar.read(reader)? as f64 / divisor)
            }
            ValueKind::BatteryPercent => {
                FieldValue::Integer(value::battery_percent(reader.read_u8()?))
            }
            ValueKind::Flags { names } => {
                FieldValue::Flags(value::sensor_flags(reader.read_u16_be()?, names))
            }
            ValueKind::HexString { len } => {
                FieldValue::Text(value::serial_number(reader.read_slice(len)?))
            }
            ValueKind::BcdVersion => FieldValue::Number(value::bcd_version(reader.read_u16_be()?)),
            ValueKind::IpsoVersion => FieldValue::Text(value::ipso_version(reader.read_u8()?)),
            ValueKind::Event => {
                reader.read_u8()?;
                FieldValue::Flag(true)
            }
            ValueKind::DeviceClass => FieldValue::Text(value::device_class(reader.read_u8()?)),
        };
        Ok(value)
    }
}

/// One ordinary sensor channel, matched on its exact `(id, ty)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelDef {
    pub id: u8,
    pub ty: u8,
    pub field: &'static str,
    pub kind: ValueKind,
}

impl ChannelDef {
    pub const fn new(id: u8, ty: u8, field: &'static str, kind: ValueKind) -> Self {
        Self {
            id,
            ty,
            field,
            kind,
        }
    }
}

/// Sub-channels of the shared system id `0xFF`, told apart by type only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemChannel {
    IpsoVersion,
    SerialNumber,
    HardwareVersion,
    SoftwareVersion,
    PowerOn,
    DeviceClass,
    SensorsEnabled,
}

impl SystemChannel {
    pub const ALL: [SystemChannel; 7] = [
        SystemChannel::IpsoVersion,
        SystemChannel::SerialNumber,
        SystemChannel::HardwareVersion,
        SystemChannel::SoftwareVersion,
        SystemChannel::PowerOn,
        SystemChannel::DeviceClass,
        SystemChannel::SensorsEnabled,
    ];

    pub fn from_type(ty: u8) -> Option<Self> {
        Some(match ty {
            layout::SYS_IPSO_VERSION => SystemChannel::IpsoVersion,
            layout::SYS_SERIAL_NUMBER => SystemChannel::SerialNumber,
            layout::SYS_HARDWARE_VERSION => SystemChannel::HardwareVersion,
            layout::SYS_SOFTWARE_VERSION => SystemChannel::SoftwareVersion,
            layout::SYS_POWER_ON => SystemChannel::PowerOn,
            layout::SYS_DEVICE_CLASS => SystemChannel::DeviceClass,
            layout::SYS_SENSORS_ENABLED => SystemChannel::SensorsEnabled,
            _ => return None,
        })
    }

    pub fn channel_type(self) -> u8 {
        match self {
            SystemChannel::IpsoVersion => layout::SYS_IPSO_VERSION,
            SystemChannel::SerialNumber => layout::SYS_SERIAL_NUMBER,
            SystemChannel::HardwareVersion => layout::SYS_HARDWARE_VERSION,
            SystemChannel::SoftwareVersion => layout::SYS_SOFTWARE_VERSION,
            SystemChannel::PowerOn => layout::SYS_POWER_ON,
            SystemChannel::DeviceClass => layout::SYS_DEVICE_CLASS,
            SystemChannel::SensorsEnabled => layout::SYS_SENSORS_ENABLED,
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            SystemChannel::IpsoVersion => "IpsoVersion",
            SystemChannel::SerialNumber => "SerialNumber",
            SystemChannel::HardwareVersion => "HardwareVersion",
            SystemChannel::SoftwareVersion => "SoftwareVersion",
            SystemChannel::PowerOn => "PowerOn",
            SystemChannel::DeviceClass => "DeviceClass",
            SystemChannel::SensorsEnabled => "SensorsEnabled",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            SystemChannel::IpsoVersion => ValueKind::IpsoVersion,
            SystemChannel::SerialNumber => ValueKind::HexString {
                len: layout::SERIAL_NUMBER_LEN,
            },
            SystemChannel::HardwareVersion | SystemChannel::SoftwareVersion => {
                ValueKind::BcdVersion
            }
            SystemChannel::PowerOn => ValueKind::Event,
            SystemChannel::DeviceClass => ValueKind::DeviceClass,
            SystemChannel::SensorsEnabled => ValueKind::Flags {
                names: &layout::SENSOR_FLAG_NAMES,
            },
        }
    }
}

/// A channel resolved against a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel<'p> {
    System(SystemChannel),
    Sensor(&'p ChannelDef),
}

impl Channel<'_> {
    pub fn field(&self) -> &'static str {
        match self {
            Channel::System(channel) => channel.field(),
            Channel::Sensor(def) => def.field,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Channel::System(channel) => channel.kind(),
            Channel::Sensor(def) => def.kind,
        }
    }
}

/// The channel table of one sensor model.
#[derive(Debug)]
pub struct Profile {
    /// Selection name (`ambience`, `soil`, `light`).
    pub name: &'static str,
    /// Human-readable model description.
    pub model: &'static str,
    pub application_port: u16,
    /// Sensor channels in lookup priority order.
    pub channels: &'static [ChannelDef],
    /// System sub-channels this model reports under id `0xFF`.
    pub system: &'static [SystemChannel],
}

impl Profile {
    /// Resolves a channel header; `0xFF` is dispatched to the system table
    /// before the sensor table is consulted.
    pub fn lookup(&self, id: u8, ty: u8) -> Option<Channel<'_>> {
        if id == layout::SYSTEM_CHANNEL_ID {
            return SystemChannel::from_type(ty)
                .filter(|channel| self.system.contains(channel))
                .map(Channel::System);
        }
        self.channels
            .iter()
            .find(|def| def.id == id && def.ty == ty)
            .map(Channel::Sensor)
    }

    /// See [`decode`](super::parser::decode).
    pub fn decode(&self, payload: &[u8], port: Option<u16>) -> Option<DecodedPayload> {
        super::parser::decode(self, payload, port)
    }

    /// An absent port is accepted.
    pub fn check_port(&self, port: Option<u16>) -> Result<(), PortMismatch> {
        match port {
            Some(actual) if actual != self.application_port => Err(PortMismatch {
                expected: self.application_port,
                actual,
            }),
            _ => Ok(()),
        }
    }
}
