use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{SEETA_MODEL_NAME, SEETA_MODEL_URL};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where a model file lives locally and where to fetch it from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelSource<'a> {
    pub file_name: &'a str,
    pub url: &'a str,
}

/// The SeetaFace frontal face model used by the default locator.
pub const SEETA_FRONTAL: ModelSource<'static> = ModelSource {
    file_name: SEETA_MODEL_NAME,
    url: SEETA_MODEL_URL,
};

/// Resolve a model file, checking the user cache, then `bundled_dir`,
/// then downloading into the cache.
pub fn resolve(
    source: ModelSource<'_>,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve_in(&model_cache_dir()?, source, bundled_dir, progress)
}

/// [`resolve`] against an explicit cache directory.
pub fn resolve_in(
    cache_dir: &Path,
    source: ModelSource<'_>,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(source.file_name);
    if cached_path.is_file() {
        log::debug!("Using cached model {}", cached_path.display());
        return Ok(cached_path);
    }

    if let Some(bundled_path) = bundled_dir
        .map(|dir| dir.join(source.file_name))
        .filter(|p| p.is_file())
    {
        log::debug!("Using bundled model {}", bundled_path.display());
        return Ok(bundled_path);
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {} from {}", source.file_name, source.url);
    download(source.url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/PalmGesture/models/`
/// - Linux: `$XDG_CACHE_HOME/PalmGesture/models/` or `~/.cache/PalmGesture/models/`
/// - Windows: `%LOCALAPPDATA%/PalmGesture/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join("PalmGesture").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

/// Counts bytes as they pass through and reports them to a callback.
struct ProgressWriter<W> {
    inner: W,
    written: u64,
    total: u64,
    progress: Option<ProgressFn>,
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        if let Some(cb) = &self.progress {
            cb(self.written, self.total);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streams `url` into `<dest>.part` and renames it into place, so `dest`
/// only ever holds a complete file.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");
    let result = download_to(url, &temp_path, progress).and_then(|()| {
        fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_to(
    url: &str,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;
    let write_err = |e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    };

    let file = fs::File::create(temp_path).map_err(write_err)?;
    let mut writer = ProgressWriter {
        inner: io::BufWriter::new(file),
        written: 0,
        total: response.content_length().unwrap_or(0),
        progress,
    };
    io::copy(&mut response, &mut writer).map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const UNREACHABLE: ModelSource<'static> = ModelSource {
        file_name: "model.bin",
        url: "http://invalid.nonexistent.example.com/model.bin",
    };

    #[test]
    fn test_cached_file_wins() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled = tmp.path().join("bundled");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&bundled).unwrap();
        fs::write(cache.join("model.bin"), b"cached").unwrap();
        fs::write(bundled.join("model.bin"), b"bundled").unwrap();

        let path = resolve_in(&cache, UNREACHABLE, Some(&bundled), None).unwrap();
        assert_eq!(path, cache.join("model.bin"));
    }

    #[test]
    fn test_bundled_file_used_when_cache_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled = tmp.path().join("bundled");
        fs::create_dir_all(&bundled).unwrap();
        fs::write(bundled.join("model.bin"), b"bundled").unwrap();

        let path = resolve_in(&cache, UNREACHABLE, Some(&bundled), None).unwrap();
        assert_eq!(path, bundled.join("model.bin"));
        assert!(!cache.exists());
    }

    #[test]
    fn test_failed_download_leaves_no_partial_file() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let result = resolve_in(&cache, UNREACHABLE, None, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        assert!(!cache.join("model.bin").exists());
        assert!(!cache.join("model.part").exists());
    }

    #[test]
    fn test_model_cache_dir_is_namespaced() {
        let path = model_cache_dir().unwrap();
        assert!(path.ends_with("PalmGesture/models"));
    }

    #[test]
    fn test_progress_writer_reports_running_total() {
        let seen = Arc::new(AtomicU64::new(0));
        let flag = seen.clone();
        let mut writer = ProgressWriter {
            inner: Vec::new(),
            written: 0,
            total: 10,
            progress: Some(Box::new(move |done, _total| {
                flag.store(done, Ordering::Relaxed);
            })),
        };
        writer.write_all(b"abcd").unwrap();
        writer.write_all(b"efg").unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 7);
        assert_eq!(writer.inner, b"abcdefg");
    }
}
