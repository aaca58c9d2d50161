//! Small helpers shared by the PayWise crates.

#[cfg(feature = "humantime-serde")]
pub mod humantime_serde;
mod secret_string;

pub use secret_string::SecretString;
