pub mod aggregate;
pub mod cache;
pub mod collector;
pub mod platform;
pub mod sampler;
pub mod snapshot;
pub mod source;
