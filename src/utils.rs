use log::info;
use std::fs;
use std::io;
use std::path::Path;

/// Creates `path` (and its parents) unless it already is a directory.
pub(crate) fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Output path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            fs::create_dir_all(path)
        }
        Err(e) => Err(e),
    }
}
