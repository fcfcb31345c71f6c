// Domain layer: core models and ports. No process or IO concerns here.

pub mod model;
pub mod ports;
