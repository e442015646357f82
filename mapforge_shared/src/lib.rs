//! Third-party crates shared by the mapforge crates.
//!
//! The other crates depend on these through this crate so that every crate in the
//! workspace agrees on a single version of the logging facade, the error derive
//! and the channel implementation.

pub use chrono;
pub use crossbeam_channel;
pub use indoc;
pub use log;
pub use parking_lot;
pub use rayon;
pub use serde_json;
pub use thiserror;
