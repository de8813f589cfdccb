//! Port traits the domain talks to; adapters implement them.

pub mod candle_source;
pub mod config_port;
pub mod result_sink;
