//! Command implementations for each file format

#[cfg(feature = "m2")]
pub mod m2;

#[cfg(feature = "wmo")]
pub mod wmo;
