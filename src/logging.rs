use std::{
    fmt,
    io::{self, Write},
};

use log::Level;

/// Installs the `[Error]`/`[Warning]` diagnostics writer on stderr
///
/// Verbose mode lowers the level from `warn` to `debug`; `RUST_LOG` takes
/// precedence when set.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "[{}] {}", label(record.level()), record.args()))
        .try_init();
}

/// Reports a fatal error
///
/// The record goes straight to stderr when error records are filtered out,
/// e.g. with `RUST_LOG=off`.
pub fn fatal(message: impl fmt::Display) {
    let _ = write_fatal(&mut io::stderr(), log::log_enabled!(Level::Error), &message);
}

fn write_fatal<W>(out: &mut W, enabled: bool, message: &dyn fmt::Display) -> io::Result<()>
where
    W: Write,
{
    if enabled {
        log::error!("{}", message);
        Ok(())
    } else {
        writeln!(out, "[{}] {}", label(Level::Error), message)
    }
}

fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "Error",
        Level::Warn => "Warning",
        Level::Info => "Info",
        Level::Debug => "Debug",
        Level::Trace => "Trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(label(Level::Error), "Error");
        assert_eq!(label(Level::Warn), "Warning");
    }

    #[test]
    fn fatal_without_logger() -> Result<(), Box<dyn std::error::Error>> {
        let mut out = Vec::new();
        write_fatal(&mut out, false, &"cannot open tau-file \"t.txt\"")?;
        assert_eq!(String::from_utf8(out)?, "[Error] cannot open tau-file \"t.txt\"\n");
        let mut out = Vec::new();
        write_fatal(&mut out, true, &"logged instead")?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn init_twice() {
        init(true);
        init(false);
        log::warn!("logger installed once");
    }
}
