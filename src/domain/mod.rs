// Domain layer: value objects, the target-model guidance table, and ports.

pub mod guidance;
pub mod model;
pub mod ports;
