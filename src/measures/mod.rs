//! Measures of spiking activity and conversions between spike representations.

pub mod conversions;
pub mod spikes;
