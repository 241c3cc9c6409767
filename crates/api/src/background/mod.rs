//! Background tasks spawned by the API process.

pub mod expiry_sweep;
