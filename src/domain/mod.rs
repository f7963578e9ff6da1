// Domain layer: store entities, the response envelope and the ports the
// transport and the facade implement.

pub mod account;
pub mod download;
pub mod envelope;
pub mod model;
pub mod ports;
pub mod report;
