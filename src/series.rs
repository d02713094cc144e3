use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, Seek, SeekFrom},
    ops::Deref,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("cannot open {kind}-file {path:?}")]
    Open {
        kind: SeriesKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {kind}-file {path:?}")]
    Read {
        kind: SeriesKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{kind}-file {path:?}: token #{index} ({token:?}) is not a valid number")]
    Malformed {
        kind: SeriesKind,
        path: PathBuf,
        token: String,
        index: usize,
    },
    #[error("{kind}-file {path:?} changed while loading: {counted} values counted, {read} read")]
    Changed {
        kind: SeriesKind,
        path: PathBuf,
        counted: usize,
        read: usize,
    },
}
type Result<T> = std::result::Result<T, SeriesError>;

/// The four parameter series handed to the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// spatial-frequency magnitudes (q)
    Magnitude,
    /// time lags (tau)
    Lag,
    /// spatial binning scales
    Scale,
    /// time-window boundaries
    Episode,
}
impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Magnitude => write!(f, "lambda"),
            SeriesKind::Lag => write!(f, "tau"),
            SeriesKind::Scale => write!(f, "scale"),
            SeriesKind::Episode => write!(f, "episode"),
        }
    }
}

/// Ordered numeric values, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T>(Vec<T>);
impl<T> Deref for Series<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T> From<Vec<T>> for Series<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}
impl<T> Series<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

/// Element type of a series
///
/// Values are read like formatted stream extraction: the longest numeric
/// prefix of a word is taken and the rest of the word is read next.
pub trait SeriesValue: Sized + fmt::Debug {
    /// Length of the longest prefix of `word` spelling a value
    fn prefix_len(word: &[u8]) -> usize;
    fn from_prefix(digits: &str) -> Option<Self>;
}
impl SeriesValue for i32 {
    fn prefix_len(word: &[u8]) -> usize {
        integer_len(word)
    }
    fn from_prefix(digits: &str) -> Option<Self> {
        digits.parse().ok()
    }
}
impl SeriesValue for f32 {
    fn prefix_len(word: &[u8]) -> usize {
        decimal_len(word)
    }
    fn from_prefix(digits: &str) -> Option<Self> {
        digits.parse::<f32>().ok().filter(|value| value.is_finite())
    }
}

fn sign_len(word: &[u8]) -> usize {
    usize::from(matches!(word.first(), Some(b'+' | b'-')))
}
fn digit_len(word: &[u8]) -> usize {
    word.iter().take_while(|b| b.is_ascii_digit()).count()
}
// [+-]digits
fn integer_len(word: &[u8]) -> usize {
    let sign = sign_len(word);
    match digit_len(&word[sign..]) {
        0 => 0,
        digits => sign + digits,
    }
}
// [+-]digits[.digits][(e|E)[+-]digits], at least one mantissa digit
fn decimal_len(word: &[u8]) -> usize {
    let mut len = sign_len(word);
    let mut digits = digit_len(&word[len..]);
    len += digits;
    if word.get(len) == Some(&b'.') {
        let fraction = digit_len(&word[len + 1..]);
        digits += fraction;
        len += 1 + fraction;
    }
    if digits == 0 {
        return 0;
    }
    if let Some(b'e' | b'E') = word.get(len) {
        let sign = sign_len(&word[len + 1..]);
        let exponent = digit_len(&word[len + 1 + sign..]);
        if exponent > 0 {
            len += 1 + sign + exponent;
        }
    }
    len
}
/// Value at the front of `word` and the number of bytes it spans
fn extract<T: SeriesValue>(word: &[u8]) -> Option<(T, usize)> {
    let len = T::prefix_len(word);
    let digits = std::str::from_utf8(&word[..len]).ok()?;
    T::from_prefix(digits).map(|value| (value, len))
}
// C locale `isspace`
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

/// Outcome of one tokenizing pass
struct Scan {
    count: usize,
    rejected: Option<String>,
}

/// Line-delimited numeric file loader
///
/// The file is read twice: the first pass counts the numeric tokens, the
/// second pass rewinds and fills a buffer allocated to exactly that count.
/// A word such as `2.5,` read as integers yields `2` and leaves `.5,`.
/// Reading stops at the first leftover that doesn't start with a number; in
/// strict mode that leftover is an error, otherwise the values read so far
/// are kept.
pub struct SeriesLoader {
    kind: SeriesKind,
    path: PathBuf,
    strict: bool,
}
impl SeriesLoader {
    pub fn new<P: AsRef<Path>>(kind: SeriesKind, path: P) -> Self {
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            strict: false,
        }
    }
    pub fn strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }
    pub fn load<T>(self) -> Result<Series<T>>
    where
        T: SeriesValue,
    {
        let now = Instant::now();
        log::info!("Loading {} values from {:?}...", self.kind, self.path);
        let file = File::open(&self.path).map_err(|source| SeriesError::Open {
            kind: self.kind,
            path: self.path.clone(),
            source,
        })?;
        let series = self.read_from(BufReader::new(file))?;
        log::info!(
            "... {} {} values loaded in {}ms",
            series.len(),
            self.kind,
            now.elapsed().as_millis()
        );
        Ok(series)
    }
    /// Two-pass read from any rewindable reader
    pub fn read_from<T, R>(&self, mut reader: R) -> Result<Series<T>>
    where
        T: SeriesValue,
        R: BufRead + Seek,
    {
        let counted = self.scan(&mut reader, |_: T| ())?;
        if let (true, Some(token)) = (self.strict, &counted.rejected) {
            return Err(SeriesError::Malformed {
                kind: self.kind,
                path: self.path.clone(),
                token: token.clone(),
                index: counted.count,
            });
        }

        reader
            .seek(SeekFrom::Start(0))
            .map_err(|source| self.read_error(source))?;
        let mut values = Vec::with_capacity(counted.count);
        let read = self.scan(&mut reader, |value: T| values.push(value))?;
        if read.count != counted.count {
            return Err(SeriesError::Changed {
                kind: self.kind,
                path: self.path.clone(),
                counted: counted.count,
                read: read.count,
            });
        }

        if let Some(token) = counted.rejected {
            log::warn!(
                "{}-file {:?}: stopped at non-numeric token {:?}, keeping the first {} values",
                self.kind,
                self.path,
                token,
                values.len()
            );
        }
        if values.is_empty() {
            log::warn!("{}-file {:?} holds no values", self.kind, self.path);
        }
        log::debug!("{}: {:?}", self.kind, values);
        Ok(Series(values))
    }
    fn scan<T, R, F>(&self, reader: &mut R, mut visit: F) -> Result<Scan>
    where
        T: SeriesValue,
        R: BufRead,
        F: FnMut(T),
    {
        let mut count = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader
                .read_until(b'\n', &mut line)
                .map_err(|source| self.read_error(source))?
                == 0
            {
                return Ok(Scan {
                    count,
                    rejected: None,
                });
            }
            for word in line.split(|&b| is_space(b)).filter(|word| !word.is_empty()) {
                let mut rest = word;
                while !rest.is_empty() {
                    match extract::<T>(rest) {
                        Some((value, len)) => {
                            visit(value);
                            count += 1;
                            rest = &rest[len..];
                        }
                        None => {
                            return Ok(Scan {
                                count,
                                rejected: Some(String::from_utf8_lossy(rest).into_owned()),
                            })
                        }
                    }
                }
            }
        }
    }
    fn read_error(&self, source: io::Error) -> SeriesError {
        SeriesError::Read {
            kind: self.kind,
            path: self.path.clone(),
            source,
        }
    }
}
