// Domain layer: models, queries and the ports the adapters implement.

pub mod model;
pub mod ports;
pub mod query;
