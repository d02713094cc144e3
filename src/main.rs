use std::{env, io, process};

use multiddm::{
    assembler,
    cli::{ArgsError, Opt},
    engine::{DryRun, PickleExport},
    logging, outputs, AnalysisEngine, Configuration,
};
use structopt::StructOpt;

fn main() {
    let opt = match Opt::parse_from(env::args_os()) {
        Ok(opt) => opt,
        Err(ArgsError::Help(help)) => {
            eprintln!("{}", help);
            process::exit(-1);
        }
        Err(ArgsError::Usage(message)) => {
            let _ = Opt::clap().write_help(&mut io::stderr());
            eprintln!("\n\n[Error] {}", message);
            process::exit(-1);
        }
    };
    logging::init(opt.verbose);

    if let Err(e) = run(opt) {
        logging::fatal(format_args!("{:#}", e));
        process::exit(1);
    }
}

fn run(opt: Opt) -> anyhow::Result<()> {
    let config = Configuration::try_from(opt)?;

    let mut engine: Box<dyn AnalysisEngine> = match &config.pickle {
        Some(path) => Box::new(PickleExport::new(path)),
        None => Box::new(DryRun),
    };
    assembler::run(&config, engine.as_mut())?;

    if engine.writes_output() {
        let isf = outputs::isf_files(&config.file_out)?;
        if isf.is_empty() {
            log::warn!("no ISF data files found for output prefix {:?}", config.file_out);
        } else {
            log::info!("found {} ISF files", isf.len());
            isf.iter().for_each(|file| log::debug!("{:?}", file));
        }
    }

    Ok(())
}
