use std::env;
use std::path::{Path, PathBuf};

/// Resolve the absolute path to an executable binary.
///
/// Absolute paths are checked directly. Otherwise the binary is looked up in,
/// in order: the colon-separated `CARAVEL_EXTRA_PATHS` env var, the process
/// `PATH`, and a few standard system locations.
///
/// # Errors
///
/// Returns a descriptive message when the binary cannot be found or is not
/// executable.
pub fn resolve_binary(binary: &str) -> Result<PathBuf, String> {
    if binary.is_empty() {
        return Err("Binary name cannot be empty".to_string());
    }

    let candidate = Path::new(binary);
    if candidate.is_absolute() {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(format!("Binary at {} is not executable", candidate.display()))
        };
    }

    let mut search_paths = Vec::new();

    if let Ok(extra) = env::var("CARAVEL_EXTRA_PATHS") {
        search_paths.extend(extra.split(':').map(PathBuf::from));
    }

    if let Some(path_var) = env::var_os("PATH") {
        search_paths.extend(env::split_paths(&path_var));
    }

    search_paths.extend([PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")]);

    for directory in search_paths {
        if directory.as_os_str().is_empty() {
            continue;
        }

        let candidate_path = directory.join(binary);
        if is_executable(&candidate_path) {
            return Ok(candidate_path);
        }
    }

    Err(format!("Unable to locate executable '{binary}' in known search paths"))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
