//! grammib-std: filesystem loading conveniences
//!
//! Provides the directory-search [`ResourceLocator`] used by native
//! deployments: an explicit path wins, then each configured directory is
//! tried with the module name as file name (with the usual MIB
//! extensions), leaving the bundled modules as the loader's last resort.

use std::fs;
use std::path::{Path, PathBuf};

use grammib_core::loader::{MibSource, ResourceLocator};

pub use grammib_core;

/// File extensions accepted as MIB sources (besides no extension).
const EXTENSIONS: &[&str] = &["mib", "txt", "my"];

/// Recursively collect MIB files from a directory.
///
/// Includes files with no extension, or `.mib`, `.txt`, `.my` extensions.
pub fn collect_mib_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_files_recursive(dir, &mut files);
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_files_recursive(&path, files);
            } else if path.is_file() && has_mib_extension(&path) {
                files.push(path);
            }
        }
    }
}

fn has_mib_extension(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => ext.is_empty() || EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)),
    }
}

/// A [`ResourceLocator`] over a list of search directories.
///
/// Resolution order per request: the name taken as an explicit path, then
/// each directory joined with the name (bare and with each known
/// extension).
#[derive(Clone, Debug, Default)]
pub struct DirLocator {
    dirs: Vec<PathBuf>,
}

impl DirLocator {
    /// Create a locator with no directories (explicit paths still
    /// resolve).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search directory.
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    /// Builder-style variant of [`add_dir`](Self::add_dir).
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.add_dir(dir);
        self
    }

    fn read(path: &Path) -> Option<MibSource> {
        let text = fs::read_to_string(path).ok()?;
        Some(MibSource {
            file: Some(path.display().to_string()),
            text,
        })
    }
}

impl ResourceLocator for DirLocator {
    fn locate(&mut self, name: &str) -> Option<MibSource> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Self::read(direct);
        }
        for dir in &self.dirs {
            let bare = dir.join(name);
            if bare.is_file() {
                return Self::read(&bare);
            }
            for ext in EXTENSIONS {
                let candidate = dir.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    return Self::read(&candidate);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammib_core::loader::MibLoader;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("grammib-std-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_collect_mib_files() {
        let dir = temp_dir("collect");
        for name in ["A-MIB.mib", "B-MIB.txt", "C-MIB.my", "D-MIB", "skip.rs"] {
            let mut f = fs::File::create(dir.join(name)).unwrap();
            writeln!(f, "-- placeholder").unwrap();
        }
        let nested = dir.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::File::create(nested.join("E-MIB.mib")).unwrap();

        let mut files = collect_mib_files(&dir);
        files.sort();
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, ["A-MIB.mib", "B-MIB.txt", "C-MIB.my", "D-MIB", "E-MIB.mib"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_dir_locator_loads_from_disk() {
        let dir = temp_dir("locator");
        let text = "DISK-MIB DEFINITIONS ::= BEGIN\n\
                    diskRoot OBJECT IDENTIFIER ::= { iso 77 }\n\
                    END\n";
        fs::write(dir.join("DISK-MIB.mib"), text).unwrap();

        let mut loader = MibLoader::new();
        loader.add_locator(Box::new(DirLocator::new().with_dir(&dir)));
        let id = loader.load("DISK-MIB").unwrap();
        let mib = loader.mib(id).unwrap();
        assert_eq!(mib.name, "DISK-MIB");
        assert!(mib.file.as_deref().unwrap().ends_with("DISK-MIB.mib"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = temp_dir("explicit");
        let path = dir.join("X-MIB.mib");
        fs::write(
            &path,
            "X-MIB DEFINITIONS ::= BEGIN\nxRoot OBJECT IDENTIFIER ::= { iso 78 }\nEND\n",
        )
        .unwrap();

        let mut loader = MibLoader::new();
        loader.add_locator(Box::new(DirLocator::new()));
        let id = loader.load(path.to_str().unwrap()).unwrap();
        assert_eq!(loader.mib(id).unwrap().name, "X-MIB");

        fs::remove_dir_all(&dir).unwrap();
    }
}
