use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::cli::Opt;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot use {} at the same time", .0.join(", "))]
    ConflictingInputs(Vec<&'static str>),
    #[error("Must specify input (one of -f, -W or -B)")]
    MissingInput,
}
type Result<T> = std::result::Result<T, ConfigError>;

/// Default number of frames per buffered chunk
pub const CHUNK_LENGTH: i32 = 30;
/// Default number of angle sectors
pub const ANGLE_COUNT: i32 = 8;
/// Default q-vector mask tolerance in percent
pub const Q_TOLERANCE_PERCENT: i32 = 20;

/// Converts a tolerance percent into the q-vector mask factor
///
/// Values between `q` and `q * factor` fall inside the radial mask.
pub fn q_tolerance(percent: i32) -> f32 {
    1.0 + percent as f32 / 100.0
}

/// Where the frames come from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// video file
    File(PathBuf),
    /// web-camera with its device index
    Webcam(i32),
    /// random frames
    Benchmark,
}
impl InputSource {
    /// Input video path, empty unless reading from a file
    pub fn file_in(&self) -> &Path {
        match self {
            InputSource::File(path) => path.as_path(),
            _ => Path::new(""),
        }
    }
    pub fn is_webcam(&self) -> bool {
        matches!(self, InputSource::Webcam(_))
    }
    /// Web-camera index, 0 unless reading from a web-camera
    pub fn webcam_index(&self) -> i32 {
        match self {
            InputSource::Webcam(index) => *index,
            _ => 0,
        }
    }
    pub fn is_benchmark(&self) -> bool {
        matches!(self, InputSource::Benchmark)
    }
}
impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "file {:?}", path),
            InputSource::Webcam(index) => write!(f, "web-camera #{}", index),
            InputSource::Benchmark => write!(f, "benchmark (random frames)"),
        }
    }
}

/// Paths to the four parameter series files
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFiles {
    pub magnitude: PathBuf,
    pub lag: PathBuf,
    pub scale: PathBuf,
    pub episode: PathBuf,
}

/// Validated DDM analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub input: InputSource,
    pub file_out: PathBuf,
    pub series: SeriesFiles,
    /// number of frames to analyse
    pub frame_count: i32,
    /// number of frames to skip at start
    pub frame_offset: i32,
    pub x_off: i32,
    pub y_off: i32,
    pub chunk_length: i32,
    /// purge and analyse the accumulators every that many chunks, 0 to disable
    pub rolling_purge: i32,
    pub angle_count: i32,
    pub q_tolerance: f32,
    pub use_movie_file: bool,
    /// label tau with frame indices instead of time
    pub use_index_fps: bool,
    /// frame rate forced onto the analysis
    pub explicit_fps: Option<f32>,
    pub multi_stream: bool,
    pub enable_angle_analysis: bool,
    pub verbose: bool,
    /// reject non-numeric tokens in series files instead of truncating
    pub strict_series: bool,
    /// write the engine request to this pickle file instead of running the analysis
    pub pickle: Option<PathBuf>,
}
impl Configuration {
    /// New configuration with every optional setting at its default
    pub fn new<P: Into<PathBuf>>(
        input: InputSource,
        file_out: P,
        series: SeriesFiles,
        frame_count: i32,
    ) -> Self {
        Self {
            input,
            file_out: file_out.into(),
            series,
            frame_count,
            frame_offset: 0,
            x_off: 0,
            y_off: 0,
            chunk_length: CHUNK_LENGTH,
            rolling_purge: 0,
            angle_count: ANGLE_COUNT,
            q_tolerance: q_tolerance(Q_TOLERANCE_PERCENT),
            use_movie_file: false,
            use_index_fps: false,
            explicit_fps: None,
            multi_stream: true,
            enable_angle_analysis: false,
            verbose: false,
            strict_series: false,
            pickle: None,
        }
    }
}

impl TryFrom<Opt> for Configuration {
    type Error = ConfigError;

    fn try_from(opt: Opt) -> Result<Self> {
        let mut sources = vec![];
        if let Some(path) = opt.file_in {
            sources.push(("-f", InputSource::File(path)));
        }
        if let Some(index) = opt.webcam {
            sources.push(("-W", InputSource::Webcam(index.unwrap_or(0))));
        }
        if opt.benchmark {
            sources.push(("-B", InputSource::Benchmark));
        }
        if sources.len() > 1 {
            return Err(ConfigError::ConflictingInputs(
                sources.iter().map(|(flag, _)| *flag).collect(),
            ));
        }
        let (_, input) = sources.pop().ok_or(ConfigError::MissingInput)?;

        if opt.angle_count.is_some() && !opt.angle_analysis {
            log::warn!("angle count (-n) is ignored unless angle analysis (-A) is enabled");
        }

        Ok(Self {
            input,
            file_out: opt.file_out,
            series: SeriesFiles {
                magnitude: opt.lambda_file,
                lag: opt.tau_file,
                scale: opt.scale_file,
                episode: opt.episode_file,
            },
            frame_count: opt.frame_count,
            frame_offset: opt.frame_offset,
            x_off: opt.x_off,
            y_off: opt.y_off,
            chunk_length: opt.chunk_length,
            rolling_purge: opt.rolling_purge,
            angle_count: opt.angle_count.unwrap_or(ANGLE_COUNT),
            q_tolerance: q_tolerance(opt.q_tolerance),
            use_movie_file: opt.movie_file,
            use_index_fps: opt.index_fps,
            explicit_fps: opt.fps,
            multi_stream: !opt.single_stream,
            enable_angle_analysis: opt.angle_analysis,
            verbose: opt.verbose,
            strict_series: opt.strict,
            pickle: opt.pickle,
        })
    }
}
