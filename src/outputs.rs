use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum OutputsError {
    #[error("invalid output file pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to read an output file entry")]
    Glob(#[from] glob::GlobError),
    #[error("invalid output file name regex")]
    Regex(#[from] regex::Error),
}
type Result<T> = std::result::Result<T, OutputsError>;

/// Intermediate scattering function data file written by the analysis
///
/// Files are named `<prefix>episode<E>-<W>_scale<S>-<T>`, indices that can't
/// be read from the name are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsfFile {
    pub path: PathBuf,
    pub episode: Option<u32>,
    pub window: Option<u32>,
    pub scale: Option<u32>,
    pub tile: Option<u32>,
}

struct IsfName {
    episode: Regex,
    scale: Regex,
}
impl IsfName {
    fn new() -> Result<Self> {
        Ok(Self {
            episode: Regex::new(r"episode(\d+)-(\d+)")?,
            scale: Regex::new(r"scale(\d+)-(\d+)")?,
        })
    }
    fn parse(&self, path: PathBuf) -> IsfFile {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pair = |re: &Regex| match re.captures(&name) {
            Some(capts) => (
                capts.get(1).and_then(|m| m.as_str().parse::<u32>().ok()),
                capts.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
            ),
            None => (None, None),
        };
        let (episode, window) = pair(&self.episode);
        let (scale, tile) = pair(&self.scale);
        IsfFile {
            path,
            episode,
            window,
            scale,
            tile,
        }
    }
}

/// Lists the ISF data files written under the output prefix
///
/// Text and PNG files (fits and plots) are skipped.
pub fn isf_files<P: AsRef<Path>>(prefix: P) -> Result<Vec<IsfFile>> {
    let prefix = prefix.as_ref().to_string_lossy();
    let pattern = format!("{}episode*_scale*", Pattern::escape(&prefix));
    log::debug!("looking for ISF files matching {}", pattern);
    let names = IsfName::new()?;
    let mut files = vec![];
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        let skip = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                ext == "txt" || ext == "png"
            })
            .unwrap_or(false);
        if !skip {
            files.push(names.parse(path));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::{error::Error, fs};

    use super::*;

    #[test]
    fn isf_file_names() -> std::result::Result<(), Box<dyn Error>> {
        let names = IsfName::new()?;
        let isf = names.parse(PathBuf::from("results/out_episode300-0_scale1024-2"));
        assert_eq!(isf.episode, Some(300));
        assert_eq!(isf.window, Some(0));
        assert_eq!(isf.scale, Some(1024));
        assert_eq!(isf.tile, Some(2));
        let isf = names.parse(PathBuf::from("out_episode_scale"));
        assert_eq!((isf.episode, isf.scale), (None, None));
        Ok(())
    }

    #[test]
    fn list_isf_files() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        for name in [
            "out_episode300-0_scale1024-0",
            "out_episode300-1_scale512-3",
            "out_episode300-0_scale1024-0_fit_generic_exp.txt",
            "out_episode300-0_scale1024-0_fit_generic_exp.png",
            "other_episode1-1_scale64-0",
        ] {
            fs::write(dir.path().join(name), "")?;
        }
        let files = isf_files(dir.path().join("out_"))?;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].scale, Some(1024));
        assert_eq!(files[1].window, Some(1));
        assert_eq!(files[1].tile, Some(3));
        Ok(())
    }

    #[test]
    fn no_isf_files() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        assert!(isf_files(dir.path().join("out_"))?.is_empty());
        Ok(())
    }
}
