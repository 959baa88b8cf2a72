// Provider abstraction: the outbound half of the relay.

pub mod tikwm;
pub mod traits;
