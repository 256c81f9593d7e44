//! Host platform utility functions

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "MOTI_SW_ROOT";

/// Errors raised while inspecting the host environment.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable ({0}) is not set")]
    SwRootNotSet(&'static str),
}

/// Get the root directory of the software, which contains the `params` and
/// `sessions` directories.
pub fn get_moti_sw_root() -> Result<PathBuf, HostError> {
    match env::var_os(SW_ROOT_ENV_VAR) {
        Some(p) => Ok(PathBuf::from(p)),
        None => Err(HostError::SwRootNotSet(SW_ROOT_ENV_VAR))
    }
}
