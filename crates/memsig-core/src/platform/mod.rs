//! # Platform-Specific Implementations
//!
//! Each platform has its own submodule implementing
//! [`ProcessBackend`](crate::backend::ProcessBackend) and
//! [`MemoryChannel`](crate::channel::MemoryChannel) with that platform's
//! native interfaces:
//!
//! - **Linux**: procfs. Process names come from `/proc/<pid>/status`,
//!   regions from `/proc/<pid>/maps`, and memory access goes through
//!   `/proc/<pid>/mem`.
//!   - See: [proc(5) man page](https://man7.org/linux/man-pages/man5/proc.5.html)

#[cfg(target_os = "linux")]
pub mod linux;

// Future platform modules:
// #[cfg(target_os = "windows")]
// pub mod windows;
