// Domain layer: models and ports. Adapters live under src/adapters.

pub mod model;
pub mod ports;
pub mod registry;
