use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Compress every `*.log` file in `dir` to a sibling `*.log.gz` and delete
/// the originals. The active file must already be closed when this runs.
///
/// A file that fails to compress is left in place uncompressed and reported
/// in the returned list; the sweep continues with the remaining files.
/// Returns the archived paths and the failures.
pub(crate) fn compress_directory(dir: &Path) -> (Vec<PathBuf>, Vec<(PathBuf, io::Error)>) {
    let mut archived = Vec::new();
    let mut failed = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read log directory {:?}: {}", dir, e);
            return (archived, failed);
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("log") {
            continue;
        }

        match compress_file(&path) {
            Ok(archive) => {
                archived.push(archive);
            }
            Err(e) => {
                tracing::warn!("Failed to archive {:?}: {}", path, e);
                failed.push((path, e));
            }
        }
    }

    (archived, failed)
}

/// Gzip a single file to `<path>.gz` at maximum compression. The original is
/// deleted only once the archive is fully written and closed; on any failure
/// the partial archive is removed and the original is untouched.
fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let archive_path = gz_path(path);

    let result = (|| {
        let mut reader = File::open(path)?;
        let out = File::create(&archive_path)?;
        let mut encoder = GzEncoder::new(out, Compression::best());
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&archive_path);
        return Err(e);
    }

    fs::remove_file(path)?;
    Ok(archive_path)
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}
