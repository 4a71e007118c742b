//! Disk-backed artifact storage.

mod disk;

pub use disk::{DiskFileStore, DEFAULT_MAX_BYTES};
