mod env;
pub use env::{Env, FauxEnv, OsEnv};

mod error;
pub use error::{ConfigFileError, ConfigFileResult};

mod main;
pub use main::*;
