use std::{
    fmt,
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{assembler::SeriesSet, Configuration};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("analysis engine failed: {0}")]
    Failed(String),
    #[error("failed to write {1:?}")]
    Io(#[source] io::Error, PathBuf),
    #[error("failed to serialize the analysis request")]
    Pickle(#[from] serde_pickle::Error),
}
type Result<T> = std::result::Result<T, EngineError>;

/// Arguments of a single DDM analysis run
///
/// Each series is passed as a slice, its length is the element count.
#[derive(Debug, Serialize)]
pub struct AnalysisRequest<'a> {
    pub file_in: &'a Path,
    pub file_out: &'a Path,
    pub lags: &'a [i32],
    pub magnitudes: &'a [f32],
    pub scales: &'a [i32],
    pub x_off: i32,
    pub y_off: i32,
    pub episodes: &'a [i32],
    pub frame_count: i32,
    pub frame_offset: i32,
    pub chunk_frame_count: i32,
    pub multi_stream: bool,
    pub use_webcam: bool,
    pub webcam_idx: i32,
    pub q_tolerance: f32,
    pub use_movie_file: bool,
    pub use_index_fps: bool,
    pub use_explicit_fps: bool,
    pub explicit_fps: f32,
    pub dump_accum_after: i32,
    pub benchmark_mode: bool,
    pub enable_angle_analysis: bool,
    pub angle_count: i32,
}
impl<'a> AnalysisRequest<'a> {
    pub fn new(config: &'a Configuration, series: &'a SeriesSet) -> Self {
        Self {
            file_in: config.input.file_in(),
            file_out: config.file_out.as_path(),
            lags: &series.lags,
            magnitudes: &series.magnitudes,
            scales: &series.scales,
            x_off: config.x_off,
            y_off: config.y_off,
            episodes: &series.episodes,
            frame_count: config.frame_count,
            frame_offset: config.frame_offset,
            chunk_frame_count: config.chunk_length,
            multi_stream: config.multi_stream,
            use_webcam: config.input.is_webcam(),
            webcam_idx: config.input.webcam_index(),
            q_tolerance: config.q_tolerance,
            use_movie_file: config.use_movie_file,
            use_index_fps: config.use_index_fps,
            use_explicit_fps: config.explicit_fps.is_some(),
            explicit_fps: config.explicit_fps.unwrap_or(1.0),
            dump_accum_after: config.rolling_purge,
            benchmark_mode: config.input.is_benchmark(),
            enable_angle_analysis: config.enable_angle_analysis,
            angle_count: config.angle_count,
        }
    }
    /// Time windows are applied when the episode series isn't empty
    pub fn use_episodes(&self) -> bool {
        !self.episodes.is_empty()
    }
}
impl fmt::Display for AnalysisRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.benchmark_mode {
            "benchmark (random frames)".to_string()
        } else if self.use_webcam {
            format!("web-camera #{}", self.webcam_idx)
        } else {
            format!("{:?}", self.file_in)
        };
        writeln!(f, "DDM ANALYSIS:")?;
        writeln!(f, " - input: {}", source)?;
        writeln!(f, " - output: {:?}", self.file_out)?;
        writeln!(
            f,
            " - frames: {} (offset: {}, chunk: {})",
            self.frame_count, self.frame_offset, self.chunk_frame_count
        )?;
        writeln!(f, " - pixel offset: ({},{})", self.x_off, self.y_off)?;
        writeln!(f, " - # of lambda values: {}", self.magnitudes.len())?;
        writeln!(f, " - # of tau values   : {}", self.lags.len())?;
        writeln!(f, " - # of scale values : {}", self.scales.len())?;
        writeln!(f, " - # of episodes     : {}", self.episodes.len())?;
        writeln!(f, " - q tolerance: {:.3}", self.q_tolerance)?;
        if self.use_explicit_fps {
            writeln!(f, " - frame rate: {} fps (forced)", self.explicit_fps)?;
        } else if self.use_index_fps {
            writeln!(f, " - tau labels: frame indices")?;
        }
        if self.dump_accum_after > 0 {
            writeln!(f, " - rolling purge: every {} chunks", self.dump_accum_after)?;
        }
        if self.enable_angle_analysis {
            writeln!(f, " - angle sectors: {}", self.angle_count)?;
        }
        write!(
            f,
            " - multi-stream: {}, movie-file: {}",
            self.multi_stream, self.use_movie_file
        )
    }
}

/// The DDM computation
///
/// `run` is called once per process, after every input is resolved, and
/// blocks until the analysis completes.
pub trait AnalysisEngine {
    fn run(&mut self, request: &AnalysisRequest<'_>) -> Result<()>;
    /// Whether `run` writes ISF data files under the output prefix
    fn writes_output(&self) -> bool {
        true
    }
}

/// Prints the request summary and returns without analysing anything
#[derive(Debug, Default)]
pub struct DryRun;
impl AnalysisEngine for DryRun {
    fn run(&mut self, request: &AnalysisRequest<'_>) -> Result<()> {
        println!("{}", request);
        Ok(())
    }
    fn writes_output(&self) -> bool {
        false
    }
}

/// Writes the request to a pickle file
#[derive(Debug)]
pub struct PickleExport {
    path: PathBuf,
}
impl PickleExport {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}
impl AnalysisEngine for PickleExport {
    fn run(&mut self, request: &AnalysisRequest<'_>) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| EngineError::Io(e, self.path.clone()))?;
        let mut buffer = BufWriter::new(file);
        serde_pickle::to_writer(&mut buffer, request, Default::default())?;
        buffer
            .into_inner()
            .map_err(|e| EngineError::Io(e.into_error(), self.path.clone()))?;
        log::info!("analysis request written to {:?}", self.path);
        Ok(())
    }
    fn writes_output(&self) -> bool {
        false
    }
}
