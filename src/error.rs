use crate::{config::ConfigError, engine::EngineError, outputs::OutputsError, series::SeriesError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input configuration")]
    Config(#[from] ConfigError),
    #[error("failed to load the parameter series")]
    Series(#[from] SeriesError),
    #[error("DDM analysis failed")]
    Engine(#[from] EngineError),
    #[error("failed to list the analysis outputs")]
    Outputs(#[from] OutputsError),
}
