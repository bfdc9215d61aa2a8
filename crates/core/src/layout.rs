use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Raw `gdb` output kept in the bundle.
pub const GDB_OUTPUT_FILE: &str = "gdb_output";
/// Raw `ldd` output kept in the bundle.
pub const LDD_OUTPUT_FILE: &str = "ldd_output";
pub const LAUNCHER_SCRIPT: &str = "runGDB.sh";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const LSB_RELEASE_FILE: &str = "lsb_release.out";
pub const UNAME_FILE: &str = "uname.out";

/// Logical layout of one collection run on disk.
///
/// Derived from the output directory and the core file name. It does *not*
/// perform any IO itself.
#[derive(Debug, Clone)]
pub struct StagingLayout {
    /// Directory that receives the staging directory and the archive.
    pub output_dir: PathBuf,
    /// `packcore-<core base name>`, shared by directory and archive.
    pub bundle_name: String,
    /// Working directory that holds every collected artifact.
    pub staging_dir: PathBuf,
    /// Final `.tar.gz` archive.
    pub archive_path: PathBuf,
}

impl StagingLayout {
    /// Compute the layout for `core_file` under `output_dir`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(output_dir: impl AsRef<Path>, core_file: &Path) -> Self {
        let output_dir = output_dir.as_ref().to_path_buf();
        let bundle_name = format!("packcore-{}", base_name(core_file));
        let staging_dir = output_dir.join(&bundle_name);
        let archive_path = output_dir.join(format!("{bundle_name}.tar.gz"));
        Self { output_dir, bundle_name, staging_dir, archive_path }
    }

    /// Location of a shallow-copied file (binary, core) inside staging.
    pub fn shallow_path(&self, source: &Path) -> PathBuf {
        self.staging_dir.join(base_name(source))
    }

    /// Location of a deep-copied file: its absolute path re-rooted at staging.
    pub fn deep_path(&self, source: &Path) -> PathBuf {
        self.staging_dir.join(relative_to_root(source))
    }

    pub fn gdb_output_path(&self) -> PathBuf {
        self.staging_dir.join(GDB_OUTPUT_FILE)
    }

    pub fn ldd_output_path(&self) -> PathBuf {
        self.staging_dir.join(LDD_OUTPUT_FILE)
    }

    pub fn launcher_path(&self) -> PathBuf {
        self.staging_dir.join(LAUNCHER_SCRIPT)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.staging_dir.join(MANIFEST_FILE)
    }
}

/// Final path component as a string, or the whole path when there is none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Clean `path` lexically and drop its root so it can be joined under another
/// directory without replacing it.
///
/// `..` removes the preceding segment (`bin/../lib` becomes `lib`) and is
/// discarded at the root, as `filepath.Clean` does. Symlinks are not followed.
pub fn relative_to_root(path: &Path) -> PathBuf {
    let mut parts: Vec<&OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    parts.into_iter().collect()
}
