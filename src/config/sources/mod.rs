pub mod defaults;
pub mod environment;
