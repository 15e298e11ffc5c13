use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::GeneratedFile;
use crate::error::RelgenError;

/// Write generated files under `directory`, creating it first. Returns the
/// paths written, in input order.
pub fn write_files(directory: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, RelgenError> {
    fs::create_dir_all(directory)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = directory.join(&file.path);
        fs::write(&path, &file.contents)?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_files_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("models").join("nested");
        let files = vec![
            GeneratedFile {
                path: PathBuf::from("order.js"),
                contents: "module.exports = {};\n".to_string(),
            },
            GeneratedFile {
                path: PathBuf::from("init-models.js"),
                contents: String::new(),
            },
        ];

        let written = write_files(&output, &files).unwrap();
        assert_eq!(written, vec![output.join("order.js"), output.join("init-models.js")]);
        assert_eq!(
            fs::read_to_string(output.join("order.js")).unwrap(),
            "module.exports = {};\n"
        );
        assert!(output.join("init-models.js").exists());
    }

    #[test]
    fn test_write_files_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let file = GeneratedFile {
            path: PathBuf::from("tag.js"),
            contents: "new".to_string(),
        };
        fs::write(dir.path().join("tag.js"), "old").unwrap();
        write_files(dir.path(), &[file]).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("tag.js")).unwrap(), "new");
    }
}
