// ABOUTME: Bundles an output directory into a single deflate-compressed zip archive.
// ABOUTME: The archive sits next to the directory as <dir>.zip and stores paths relative to it.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ScrapeError;

/// Path of the archive for `dir`: the same path with `.zip` appended.
pub fn archive_path(dir: &Path) -> PathBuf {
    // components() drops any trailing separator
    let mut name = dir.components().as_path().as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Zips every regular file under `dir` into `<dir>.zip` and returns its path.
pub fn archive_dir(dir: &Path) -> Result<PathBuf, ScrapeError> {
    let dest = archive_path(dir);
    let err = |op: &str, e: anyhow::Error| {
        ScrapeError::archive(dest.display().to_string(), op, Some(e))
    };

    let mut files = Vec::new();
    collect_files(dir, &mut files).map_err(|e| err("WalkDir", e.into()))?;
    files.sort();

    let file = File::create(&dest).map_err(|e| err("CreateArchive", e.into()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let relative = path
            .strip_prefix(dir)
            .map_err(|e| err("RelativePath", e.into()))?;
        let entry_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        zip.start_file(entry_name, options)
            .map_err(|e| err("StartEntry", e.into()))?;
        let data = fs::read(path).map_err(|e| err("ReadEntry", e.into()))?;
        zip.write_all(&data).map_err(|e| err("WriteEntry", e.into()))?;
    }
    zip.finish().map_err(|e| err("FinishArchive", e.into()))?;

    tracing::info!(archive = %dest.display(), entries = files.len(), "archived output");
    Ok(dest)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_archive_path_appends_zip() {
        assert_eq!(
            archive_path(Path::new("ScrapedData")),
            PathBuf::from("ScrapedData.zip")
        );
        assert_eq!(
            archive_path(Path::new("out/data.v1/")),
            PathBuf::from("out/data.v1.zip")
        );
    }

    #[test]
    fn test_archive_dir_keeps_relative_paths() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("run");
        fs::create_dir_all(out.join("media")).unwrap();
        fs::write(out.join("title.txt"), "Home").unwrap();
        fs::write(out.join("media").join("image_0.jpg"), [0xffu8, 0xd8]).unwrap();

        let dest = archive_dir(&out).unwrap();
        assert_eq!(dest, temp.path().join("run.zip"));

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["media/image_0.jpg", "title.txt"]);

        let mut title = String::new();
        archive
            .by_name("title.txt")
            .unwrap()
            .read_to_string(&mut title)
            .unwrap();
        assert_eq!(title, "Home");
    }

    #[test]
    fn test_archive_missing_dir_is_archive_error() {
        let temp = TempDir::new().unwrap();
        let err = archive_dir(&temp.path().join("absent")).unwrap_err();
        assert!(err.is_archive());
    }
}
