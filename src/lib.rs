/*!
# Multi-scale DDM front-end

Command line and parameter file ingestion for the GPU Differential Dynamic
Microscopy analysis.

The command line is parsed into a [Configuration], the lambda (q), tau, scale
and episode series are loaded from their line-delimited text files and the
whole set is handed once to an [AnalysisEngine]:

```no_run
use multiddm::{assembler, cli::Opt, engine::DryRun, Configuration};

let opt = Opt::parse_from(std::env::args_os())?;
let config = Configuration::try_from(opt)?;
assembler::run(&config, &mut DryRun)?;
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

pub mod assembler;
pub mod cli;
pub mod config;
pub mod engine;
mod error;
pub mod logging;
pub mod outputs;
pub mod series;

pub use config::{ConfigError, Configuration, InputSource};
pub use engine::{AnalysisEngine, AnalysisRequest};
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
