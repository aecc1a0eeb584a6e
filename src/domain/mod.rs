// Domain layer: entities, source layout and ports. No I/O happens here.

pub mod model;
pub mod ports;
pub mod source;
