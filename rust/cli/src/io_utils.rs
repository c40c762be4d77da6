//! File I/O utilities shared by the commands.
//!
//! - Reading and writing text files with transparent .zst (de)compression
//! - Ensuring parent directories exist before file writes
//!
//! ## Error Handling
//!
//! Functions return `Result<_, String>`; callers wrap the message into a
//! `CliError` with the context they have.

use std::path::Path;

/// Compression level used for parsed output and caches.
pub const ZSTD_LEVEL: i32 = 3;

/// Read text file with automatic .zst decompression detection.
///
/// UTF-8 BOM (Byte Order Mark) is stripped if present.
///
/// # Example
///
/// ```rust,no_run
/// # use rangekpi_cli::io_utils::read_text_auto;
/// use std::path::Path;
///
/// let content = read_text_auto(Path::new("input/Ah7d2c_check.txt")).unwrap();
/// let parsed = read_text_auto(Path::new("output/lookup.json.zst")).unwrap();
/// ```
pub fn read_text_auto(path: &Path) -> Result<String, String> {
    let bytes = read_bytes_auto(path)?;
    let mut content = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Read a text file, replacing invalid UTF-8 with U+FFFD instead of failing.
///
/// Range files are line oriented, so an undecodable byte only spoils the
/// line it sits on.
pub fn read_text_lossy(path: &Path) -> Result<String, String> {
    let bytes = read_bytes_auto(path)?;
    let mut content = String::from_utf8_lossy(&bytes).into_owned();
    strip_utf8_bom(&mut content);
    Ok(content)
}

fn read_bytes_auto(path: &Path) -> Result<Vec<u8>, String> {
    let raw = std::fs::read(path).map_err(|e| e.to_string())?;
    if is_zst(path) {
        zstd::decode_all(raw.as_slice()).map_err(|e| e.to_string())
    } else {
        Ok(raw)
    }
}

/// Write text, compressing with zstd when the path ends in `.zst`.
///
/// Parent directories are created as needed.
pub fn write_text_auto(path: &Path, content: &str) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let bytes = if is_zst(path) {
        zstd::encode_all(content.as_bytes(), ZSTD_LEVEL).map_err(|e| e.to_string())?
    } else {
        content.as_bytes().to_vec()
    };
    std::fs::write(path, bytes)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn is_zst(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zst"))
}

/// Ensure parent directory exists for given path, creating if needed.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// # use rangekpi_cli::io_utils::ensure_parent_dir;
///
/// let path = Path::new("output/parsed/file.json.zst");
/// ensure_parent_dir(path).unwrap();
/// ```
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

/// Strip UTF-8 BOM (Byte Order Mark) from the beginning of a string if present.
fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
