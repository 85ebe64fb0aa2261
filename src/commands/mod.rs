//! Command handlers for each CLI subcommand.
//!
//! Each subcommand is implemented in its own module and exposes
//! a single `execute` function that receives the parsed arguments
//! and the shared [`Context`].

pub mod cookies;
pub mod decode;
pub mod input;
pub mod inspect;

use crate::cli::KeyArgs;
use crate::config::Config;
use crate::core::inspector::Inspector;
use crate::core::key::KeyLengthPolicy;

/// Settings shared by all commands.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub use_color: bool,
}

impl Context {
    /// Build an inspector, letting `--fixed-key-length` override the config.
    pub fn inspector(&self, key: &KeyArgs) -> Inspector {
        let policy = match key.fixed_key_length {
            Some(len) => KeyLengthPolicy::Fixed(len),
            None => self.config.key_length_policy(),
        };
        Inspector::new(policy)
    }
}
