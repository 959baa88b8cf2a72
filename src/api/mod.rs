// Entry points used by the binary.

pub mod relay_api;
pub mod simple;
