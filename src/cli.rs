use std::{ffi::OsString, path::PathBuf};

use structopt::{
    clap::{AppSettings, ErrorKind},
    StructOpt,
};

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("{0}")]
    Help(String),
    #[error("{0}")]
    Usage(String),
}
impl From<structopt::clap::Error> for ArgsError {
    fn from(e: structopt::clap::Error) -> Self {
        match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => ArgsError::Help(e.message),
            _ => ArgsError::Usage(e.message),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "multiddm",
    about = "multi-scale DDM - CUDA",
    setting = AppSettings::AllowNegativeNumbers
)]
pub struct Opt {
    /// Output file-path
    #[structopt(short = "o", parse(from_os_str))]
    pub file_out: PathBuf,
    /// Number of frames to analyse
    #[structopt(short = "N")]
    pub frame_count: i32,
    /// Path to lambda-value file (line separated)
    #[structopt(short = "Q", parse(from_os_str))]
    pub lambda_file: PathBuf,
    /// Path to tau-value file (line separated)
    #[structopt(short = "T", parse(from_os_str))]
    pub tau_file: PathBuf,
    /// Path to scale-value file (line separated)
    #[structopt(short = "S", parse(from_os_str))]
    pub scale_file: PathBuf,
    /// Path to episode-value file (line separated)
    #[structopt(short = "E", parse(from_os_str))]
    pub episode_file: PathBuf,
    /// Path to input video (exactly one of -f, -W or -B must be given)
    #[structopt(short = "f", parse(from_os_str))]
    pub file_in: Option<PathBuf>,
    /// Use web-camera as input video, camera number attached (-W1) or the first camera
    #[structopt(short = "W", require_equals = true)]
    pub webcam: Option<Option<i32>>,
    /// Benchmark mode, analysis is performed on random data
    #[structopt(short = "B")]
    pub benchmark: bool,
    /// First frame offset
    #[structopt(short = "s", default_value = "0")]
    pub frame_offset: i32,
    /// X offset
    #[structopt(short = "x", default_value = "0")]
    pub x_off: i32,
    /// Y offset
    #[structopt(short = "y", default_value = "0")]
    pub y_off: i32,
    /// Use frame indices for tau-labels not real time
    #[structopt(short = "I")]
    pub index_fps: bool,
    /// Verbose mode on
    #[structopt(short = "v")]
    pub verbose: bool,
    /// Turn off multi-stream (smaller memory footprint - slower execution time)
    #[structopt(short = "Z")]
    pub single_stream: bool,
    /// q-vector mask tolerance in percent, 20 gives a radial mask from q to 1.2 q
    #[structopt(short = "t", default_value = "20")]
    pub q_tolerance: i32,
    /// Main chunk frame count, a buffer 3x chunk frame count is allocated in memory
    #[structopt(short = "C", default_value = "30")]
    pub chunk_length: i32,
    /// Sub-divide analysis, buffer is output and purged every SIZE chunks
    #[structopt(short = "G", default_value = "0")]
    pub rolling_purge: i32,
    /// Set if using movie-file format
    #[structopt(short = "M")]
    pub movie_file: bool,
    /// Force the analysis to assume a specific frame-rate, over-rides other options
    #[structopt(short = "F")]
    pub fps: Option<f32>,
    /// Enable angle analysis
    #[structopt(short = "A")]
    pub angle_analysis: bool,
    /// Angle count [default: 8]
    #[structopt(short = "n")]
    pub angle_count: Option<i32>,
    /// Reject non-numeric values in the lambda, tau, scale and episode files
    #[structopt(long)]
    pub strict: bool,
    /// Write the analysis request to a pickle file instead of running the analysis
    #[structopt(long, parse(from_os_str))]
    pub pickle: Option<PathBuf>,
}
impl Opt {
    /// Parses the argument vector, program name first
    pub fn parse_from<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator,
        I::Item: Into<OsString> + Clone,
    {
        Ok(Self::from_iter_safe(args)?)
    }
}
