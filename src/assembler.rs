use std::time::Instant;

use crate::{
    engine::{AnalysisEngine, AnalysisRequest},
    series::{Series, SeriesError, SeriesKind, SeriesLoader},
    Configuration, Result,
};

/// The four parameter series, fully loaded
///
/// The series are independent and need not have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSet {
    pub magnitudes: Series<f32>,
    pub lags: Series<i32>,
    pub scales: Series<i32>,
    pub episodes: Series<i32>,
}
impl SeriesSet {
    /// Loads the lambda, tau, scale and episode files named in the configuration
    pub fn load(config: &Configuration) -> std::result::Result<Self, SeriesError> {
        let files = &config.series;
        let strict = config.strict_series;
        Ok(Self {
            magnitudes: SeriesLoader::new(SeriesKind::Magnitude, &files.magnitude)
                .strict(strict)
                .load()?,
            lags: SeriesLoader::new(SeriesKind::Lag, &files.lag)
                .strict(strict)
                .load()?,
            scales: SeriesLoader::new(SeriesKind::Scale, &files.scale)
                .strict(strict)
                .load()?,
            episodes: SeriesLoader::new(SeriesKind::Episode, &files.episode)
                .strict(strict)
                .load()?,
        })
    }
}

/// Loads the parameter series and runs the analysis engine once
///
/// Nothing is handed to the engine if any series fails to load.
pub fn run<E>(config: &Configuration, engine: &mut E) -> Result<()>
where
    E: AnalysisEngine + ?Sized,
{
    let series = SeriesSet::load(config)?;
    let request = AnalysisRequest::new(config, &series);
    log::info!("input: {}", config.input);
    if request.use_episodes() {
        log::info!("{} episode boundaries", request.episodes.len());
    }

    log::info!("DDM start");
    let now = Instant::now();
    engine.run(&request)?;
    log::info!("DDM end ({:.3}s)", now.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error,
        fs,
        path::{Path, PathBuf},
    };

    use super::*;
    use crate::{cli::Opt, engine::EngineError, ConfigError, Error as DdmError};

    #[derive(Debug, PartialEq)]
    struct Call {
        file_in: PathBuf,
        magnitudes: Vec<f32>,
        lags: Vec<i32>,
        scales: Vec<i32>,
        episodes: Vec<i32>,
        frame_count: i32,
        use_webcam: bool,
        benchmark_mode: bool,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }
    impl AnalysisEngine for Recorder {
        fn run(&mut self, request: &AnalysisRequest<'_>) -> std::result::Result<(), EngineError> {
            self.calls.push(Call {
                file_in: request.file_in.to_path_buf(),
                magnitudes: request.magnitudes.to_vec(),
                lags: request.lags.to_vec(),
                scales: request.scales.to_vec(),
                episodes: request.episodes.to_vec(),
                frame_count: request.frame_count,
                use_webcam: request.use_webcam,
                benchmark_mode: request.benchmark_mode,
            });
            Ok(())
        }
    }

    struct Failing;
    impl AnalysisEngine for Failing {
        fn run(&mut self, _: &AnalysisRequest<'_>) -> std::result::Result<(), EngineError> {
            Err(EngineError::Failed("out of device memory".into()))
        }
    }

    fn write_series(dir: &Path) -> std::io::Result<()> {
        fs::write(dir.join("q.txt"), "0.1 0.2 0.3")?;
        fs::write(dir.join("t.txt"), "1\n2\n4\n8")?;
        fs::write(dir.join("s.txt"), "1 2")?;
        fs::write(dir.join("e.txt"), "")?;
        Ok(())
    }

    fn configure(dir: &Path, args: &[&str]) -> std::result::Result<Configuration, Box<dyn Error>> {
        let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
        let mut argv: Vec<String> = vec!["multiddm".into()];
        argv.extend(args.iter().map(|a| a.to_string()));
        argv.extend([
            "-Q".into(),
            path("q.txt"),
            "-T".into(),
            path("t.txt"),
            "-S".into(),
            path("s.txt"),
            "-E".into(),
            path("e.txt"),
        ]);
        Ok(Configuration::try_from(Opt::parse_from(argv)?)?)
    }

    #[test]
    fn end_to_end() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        write_series(dir.path())?;
        let config = configure(dir.path(), &["-o", "out.bin", "-N", "100", "-f", "video.mp4"])?;

        let mut engine = Recorder::default();
        run(&config, &mut engine)?;

        assert_eq!(
            engine.calls,
            vec![Call {
                file_in: PathBuf::from("video.mp4"),
                magnitudes: vec![0.1, 0.2, 0.3],
                lags: vec![1, 2, 4, 8],
                scales: vec![1, 2],
                episodes: vec![],
                frame_count: 100,
                use_webcam: false,
                benchmark_mode: false,
            }]
        );
        Ok(())
    }

    #[test]
    fn missing_series_file_skips_engine() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        write_series(dir.path())?;
        for name in ["q.txt", "t.txt", "s.txt", "e.txt"] {
            let mut config = configure(dir.path(), &["-o", "out.bin", "-N", "10", "-B"])?;
            let missing = dir.path().join("missing").join(name);
            match name {
                "q.txt" => config.series.magnitude = missing,
                "t.txt" => config.series.lag = missing,
                "s.txt" => config.series.scale = missing,
                _ => config.series.episode = missing,
            }
            let mut engine = Recorder::default();
            let result = run(&config, &mut engine);
            assert!(
                matches!(result, Err(DdmError::Series(SeriesError::Open { .. }))),
                "{}: {:?}",
                name,
                result
            );
            assert!(engine.calls.is_empty());
        }
        Ok(())
    }

    #[test]
    fn conflicting_inputs_fail_before_loading() -> std::result::Result<(), Box<dyn Error>> {
        let argv = [
            "multiddm", "-W", "-B", "-o", "out.bin", "-N", "10", "-Q", "no/q.txt", "-T",
            "no/t.txt", "-S", "no/s.txt", "-E", "no/e.txt",
        ];
        let result = Configuration::try_from(Opt::parse_from(argv)?);
        assert!(matches!(result, Err(ConfigError::ConflictingInputs(_))));
        Ok(())
    }

    #[test]
    fn strict_mode_rejects_malformed_series() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        write_series(dir.path())?;
        fs::write(dir.path().join("s.txt"), "1 2 two")?;

        let config = configure(dir.path(), &["-o", "out.bin", "-N", "10", "-B"])?;
        let mut engine = Recorder::default();
        run(&config, &mut engine)?;
        assert_eq!(engine.calls[0].scales, vec![1, 2]);
        assert!(engine.calls[0].benchmark_mode);

        let config = configure(dir.path(), &["-o", "out.bin", "-N", "10", "-B", "--strict"])?;
        let mut engine = Recorder::default();
        let result = run(&config, &mut engine);
        assert!(matches!(
            result,
            Err(DdmError::Series(SeriesError::Malformed { .. }))
        ));
        assert!(engine.calls.is_empty());
        Ok(())
    }

    #[test]
    fn engine_failure_is_reported() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        write_series(dir.path())?;
        let config = configure(dir.path(), &["-o", "out.bin", "-N", "10", "-W1"])?;
        let result = run(&config, &mut Failing);
        assert!(matches!(
            result,
            Err(DdmError::Engine(EngineError::Failed(_)))
        ));
        Ok(())
    }
}
