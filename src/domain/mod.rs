// Domain layer: the district record and the ports implemented by core/config.

pub mod model;
pub mod ports;
