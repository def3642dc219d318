use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::{AppError, Result};

/// Pack the export directory into `<zip_name>.zip` next to it.
/// Entry names are relative to the directory root so unpacking recreates
/// the conversation layout directly.
pub fn zip_directory(src_dir: &Path, zip_name: &str) -> Result<PathBuf> {
    let zip_path = PathBuf::from(format!("{zip_name}.zip"));
    let file = File::create(&zip_path).map_err(|e| AppError::WriteFile {
        path: zip_path.display().to_string(),
        source: e,
    })?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in WalkDir::new(src_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(src_dir) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_file() {
            zip.start_file(name.as_str(), options).map_err(zip_error)?;
            let mut input = File::open(path).map_err(|e| AppError::ReadFile {
                path: path.display().to_string(),
                source: e,
            })?;
            io::copy(&mut input, &mut zip)?;
        } else if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)
                .map_err(zip_error)?;
        }
    }

    zip.finish().map_err(zip_error)?;
    log::info!("packed export into {}", zip_path.display());

    Ok(zip_path)
}

fn zip_error(error: zip::result::ZipError) -> AppError {
    AppError::Zip(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_zip_directory_preserves_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let export_dir = tmp.path().join("20200101-000000-slack_export");
        fs::create_dir_all(export_dir.join("general")).unwrap();
        fs::write(export_dir.join("users.json"), "[]").unwrap();
        fs::write(export_dir.join("general").join("2020-01-01.json"), "[{}]").unwrap();

        // write the zip inside the temp dir to keep the cwd clean
        let zip_path = tmp.path().join("archive.zip");
        let zip_name = zip_path.with_extension("");
        let created = zip_directory(&export_dir, &zip_name.to_string_lossy()).unwrap();

        assert_eq!(created, zip_path);

        let mut archive = ZipArchive::new(File::open(&created).unwrap()).unwrap();
        let mut day_file = archive.by_name("general/2020-01-01.json").unwrap();
        let mut content = String::new();
        day_file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "[{}]");
        drop(day_file);

        assert!(archive.by_name("users.json").is_ok());
    }

    #[test]
    fn test_zip_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let export_dir = tmp.path().join("empty-export");
        fs::create_dir_all(&export_dir).unwrap();

        let zip_name = tmp.path().join("empty");
        let created = zip_directory(&export_dir, &zip_name.to_string_lossy()).unwrap();

        let archive = ZipArchive::new(File::open(&created).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
