// Domain layer: fixture models and ports (interfaces). Only std/serde here.

pub mod model;
pub mod ports;
