use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `body` to `path` atomically: temp file in the same directory,
/// fsync, then rename over the target.
pub(crate) fn write_atomic(path: &Path, body: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let mut file = fs::File::create(tmp)?;
    file.write_all(body)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

/// Read a file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
