// Private modules
mod tools;
mod notes {
    pub mod dlp;
}

// Public modules
pub mod bench;
pub mod channel;
pub mod config;
pub mod dlp;
pub mod logging;
pub mod protocol;
pub mod race;
pub mod report;
pub mod types;

pub use tools::{mod_mul, mod_pow};
