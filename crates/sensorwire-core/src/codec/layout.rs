/// Channel header: one id byte followed by one type byte.
pub const HEADER_LEN: usize = 2;

/// LoRaWAN application port used by every supported sensor family.
pub const APPLICATION_PORT: u16 = 85;

/// Channel id reserved for device/system records.
pub const SYSTEM_CHANNEL_ID: u8 = 0xFF;

pub const SYS_IPSO_VERSION: u8 = 0x01;
pub const SYS_SERIAL_NUMBER: u8 = 0x08;
pub const SYS_HARDWARE_VERSION: u8 = 0x09;
pub const SYS_SOFTWARE_VERSION: u8 = 0x0A;
pub const SYS_POWER_ON: u8 = 0x0B;
pub const SYS_DEVICE_CLASS: u8 = 0x0F;
pub const SYS_SENSORS_ENABLED: u8 = 0x18;

pub const TYPE_BATTERY: u8 = 0x75;
pub const TYPE_TEMPERATURE: u8 = 0x67;
pub const TYPE_HUMIDITY: u8 = 0x68;
pub const TYPE_ACTIVITY: u8 = 0x6A;
pub const TYPE_ILLUMINATION: u8 = 0x65;
pub const TYPE_CONCENTRATION: u8 = 0x7D;
pub const TYPE_PRESSURE: u8 = 0x73;
pub const TYPE_CONDUCTIVITY: u8 = 0x7F;
pub const TYPE_LUX: u8 = 0x94;

pub const SERIAL_NUMBER_LEN: usize = 6;
pub const VERSION_LEN: usize = 2;
pub const FLAGS_LEN: usize = 2;

pub const BATTERY_MAX_PERCENT: u8 = 100;

/// BCD bytes at or above this value cannot encode two decimal digits.
pub const BCD_LIMIT: u8 = 0xA0;

/// Sensor names carried by the enabled-sensors bitmask, indexed by bit.
pub const SENSOR_FLAG_NAMES: [&str; 7] = [
    "temperature",
    "humidity",
    "activity",
    "illumination",
    "co2",
    "tvoc",
    "pressure",
];

pub const DEVICE_CLASSES: [&str; 3] = ["Class A", "Class B", "Class C"];
