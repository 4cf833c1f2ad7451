// Domain layer: the prescription model and the ports the bot talks through.

pub mod model;
pub mod ports;
