pub mod context;
pub mod curve;
pub mod engine;
pub mod environment;
pub mod perpetual;
pub mod phases;
pub mod term;
pub mod weighted;
