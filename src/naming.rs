use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// An input file as seen by the dispatcher: nothing but its path split into
/// base and extension. No media metadata is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Path without its extension
    pub base_name: PathBuf,
    /// Extension including the leading dot, or empty
    pub extension: String,
}

impl MediaFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let base_name = path.with_extension("");

        Self { path, base_name, extension }
    }

    /// Lowercased extension without the dot, for allow-list checks
    pub fn normalized_extension(&self) -> String {
        self.extension.trim_start_matches('.').to_lowercase()
    }
}

/// Return `base + suffix + extension`, or the first of
/// `base + suffix + "_2" + extension`, `"_3"`, ... that does not exist yet.
pub fn next_available_name<P: AsRef<Path>>(base: P, suffix: &str, extension: &str) -> PathBuf {
    next_available_name_with(base, suffix, extension, |candidate| candidate.exists())
}

/// Same as [`next_available_name`] with a caller-supplied existence check
pub fn next_available_name_with<P, F>(base: P, suffix: &str, extension: &str, exists: F) -> PathBuf
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool,
{
    let base = base.as_ref();

    let candidate = join_name(base, suffix, "", extension);
    if !exists(&candidate) {
        return candidate;
    }

    let mut counter: u64 = 2;
    loop {
        let candidate = join_name(base, suffix, &format!("_{}", counter), extension);
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn join_name(base: &Path, suffix: &str, counter: &str, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    name.push(counter);
    name.push(extension);
    PathBuf::from(name)
}
