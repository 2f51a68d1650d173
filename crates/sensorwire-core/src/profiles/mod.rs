//! Channel tables of the supported sensor families.
//!
//! Every family shares the decode loop in [`crate::codec::parser`]; a
//! profile only declares which channels exist and how their bytes read.

use thiserror::Error;

use crate::codec::Profile;

mod ambience;
mod light;
mod soil;

pub use ambience::AMBIENCE;
pub use light::LIGHT;
pub use soil::SOIL;

/// Every profile, in listing order.
pub static PROFILES: [&Profile; 3] = [&AMBIENCE, &SOIL, &LIGHT];

/// Selection names accepted by [`from_name`].
pub const PROFILE_NAMES: [&str; 3] = ["ambience", "soil", "light"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown sensor profile '{name}' (expected one of: {expected})")]
    Unknown { name: String, expected: String },
}

/// Looks a profile up by its selection name, ignoring ASCII case.
///
/// # Examples
/// ```
/// use sensorwire_core::profiles;
///
/// let profile = profiles::from_name("Soil")?;
/// assert_eq!(profile.name, "soil");
/// # Ok::<(), profiles::ProfileError>(())
/// ```
pub fn from_name(name: &str) -> Result<&'static Profile, ProfileError> {
    PROFILES
        .iter()
        .copied()
        .find(|profile| profile.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| ProfileError::Unknown {
            name: name.to_string(),
            expected: PROFILE_NAMES.join(", "),
        })
}
