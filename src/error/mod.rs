mod config;
mod container;
mod parser;
mod registry;

pub use config::ConfigError;
pub use container::ContainerError;
pub use parser::ParserError;
pub use registry::{ListenerError, RegistryError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, Error>;
