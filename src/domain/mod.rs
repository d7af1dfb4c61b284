//! Domain layer: checkout data types and the ports through which the pipeline
//! talks to its external collaborators.

pub mod order;
pub mod ports;
