// Domain layer: read models and the ports the gateway talks through.

pub mod model;
pub mod ports;
