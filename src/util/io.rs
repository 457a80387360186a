use std::fs;

use tracing::debug;

/// Write file at given filepath with content.
pub fn write_file<C>(filepath: &str, content: C) -> Result<(), String>
where
    C: AsRef<[u8]>,
{
    debug!("writing file: {}", filepath);
    if fs::write(filepath, content).is_err() {
        return Err(format!("error: failed to write file {}", filepath));
    }

    Ok(())
}
