//! Batch decompression of downloaded telemetry files.
//!
//! Every regular file in the input directory is gunzipped into the output
//! directory under its own name minus a trailing `.gz`. Output is written to
//! a `.partial` sibling and renamed into place once complete, so a failed
//! file never leaves a truncated log behind.
//!
//! Files run in parallel on the blocking pool. Inputs that map to the same
//! output name (`a.json` and `a.json.gz`) run one after another in a single
//! task, in name order.

use crate::error::TelemetryError;
use flate2::read::GzDecoder;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of one [`decompress_batch`] run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written.
    pub succeeded: Vec<PathBuf>,
    /// Directory entries that were not regular files.
    pub skipped: Vec<PathBuf>,
    /// One [`TelemetryError::FileCopy`] per input that failed.
    pub failed: Vec<TelemetryError>,
}

impl BatchReport {
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when no file failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Gunzip every file in `input_dir` into `output_dir`.
///
/// # Errors
///
/// [`TelemetryError::PathNotFound`] if either directory is missing, and
/// [`TelemetryError::Io`] if the input directory cannot be listed. Failures
/// on individual files are reported in [`BatchReport::failed`] instead.
pub async fn decompress_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<BatchReport, TelemetryError> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    for dir in [input_dir, output_dir] {
        if !tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(TelemetryError::PathNotFound {
                path: dir.to_path_buf(),
            });
        }
    }

    let mut report = BatchReport::default();
    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    let mut entries = tokio::fs::read_dir(input_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            tracing::debug!("Skipping non-file entry {}", path.display());
            report.skipped.push(path);
            continue;
        }

        let output = output_dir.join(output_name(&entry.file_name()));
        groups.entry(output).or_default().push(path);
    }

    let tasks = groups.into_iter().map(|(output, mut inputs)| {
        inputs.sort();
        tokio::task::spawn_blocking(move || {
            inputs
                .into_iter()
                .map(|input| {
                    let result = decompress_file(&input, &output);
                    (input, output.clone(), result)
                })
                .collect::<Vec<_>>()
        })
    });

    for joined in join_all(tasks).await {
        let results = joined.map_err(|e| TelemetryError::Io(io::Error::other(e)))?;
        for (input, output, result) in results {
            match result {
                Ok(()) => report.succeeded.push(output),
                Err(source) => {
                    let filename = input
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| input.display().to_string());
                    tracing::warn!("Failed to decompress {}: {}", filename, source);
                    report.failed.push(TelemetryError::FileCopy { filename, source });
                }
            }
        }
    }

    tracing::info!(
        "Decompressed {} files ({} failed, {} skipped)",
        report.succeeded_count(),
        report.failed_count(),
        report.skipped_count()
    );

    Ok(report)
}

/// Input file name minus a trailing `.gz`.
fn output_name(input: &OsString) -> OsString {
    let lossy = input.to_string_lossy();
    match lossy.strip_suffix(".gz") {
        Some(stem) if !stem.is_empty() => OsString::from(stem),
        _ => input.clone(),
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn decompress_file(input: &Path, output: &Path) -> io::Result<()> {
    let partial = partial_path(output);

    let written = (|| {
        let mut decoder = GzDecoder::new(BufReader::new(File::open(input)?));
        let mut writer = BufWriter::new(File::create(&partial)?);
        io::copy(&mut decoder, &mut writer)?;
        writer.flush()
    })();

    match written {
        Ok(()) => fs::rename(&partial, output),
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(&OsString::from("m1.json.gz")), "m1.json");
        assert_eq!(output_name(&OsString::from("m1.json")), "m1.json");
        assert_eq!(output_name(&OsString::from(".gz")), ".gz");
    }

    #[tokio::test]
    async fn test_corrupt_file_does_not_stop_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        fs::write(input.path().join("good.json.gz"), gzip(b"[]")).unwrap();
        fs::write(input.path().join("bad.json.gz"), b"definitely not gzip").unwrap();
        fs::create_dir(input.path().join("nested")).unwrap();

        let report = decompress_batch(input.path(), output.path()).await.unwrap();

        assert_eq!(report.succeeded, vec![output.path().join("good.json")]);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        match &report.failed[0] {
            TelemetryError::FileCopy { filename, .. } => assert_eq!(filename, "bad.json.gz"),
            other => panic!("expected FileCopy, got {:?}", other),
        }

        assert_eq!(fs::read(output.path().join("good.json")).unwrap(), b"[]");
        assert!(!output.path().join("bad.json").exists());
        assert!(!output.path().join("bad.json.partial").exists());
    }

    #[tokio::test]
    async fn test_same_output_name_runs_in_order() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        fs::write(input.path().join("m.json"), gzip(b"first")).unwrap();
        fs::write(input.path().join("m.json.gz"), gzip(b"second")).unwrap();

        let report = decompress_batch(input.path(), output.path()).await.unwrap();
        assert_eq!(report.succeeded_count(), 2);
        assert!(report.is_clean());
        assert_eq!(fs::read(output.path().join("m.json")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let output = tempfile::tempdir().unwrap();
        let missing = output.path().join("nope");

        match decompress_batch(&missing, output.path()).await {
            Err(TelemetryError::PathNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }
}
