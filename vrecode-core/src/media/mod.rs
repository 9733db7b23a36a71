//! Probed media identity and the browser compatibility rules built on it.

pub mod codec;
pub mod compat;
pub mod probe;

pub use codec::CodecId;
pub use compat::{BROWSER_CONTAINER_FORMAT, BROWSER_EXTENSION};
pub use probe::{VideoDescriptor, split_file_name};
