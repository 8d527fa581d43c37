use std::path::Path;
use std::sync::OnceLock;

static LOGO: OnceLock<Vec<u8>> = OnceLock::new();

/// Logo bytes, read from `path` the first time a read succeeds and shared by
/// every later caller. A failed read is not remembered, so the next call retries.
pub fn logo(path: &Path) -> Option<&'static [u8]> {
    if let Some(bytes) = LOGO.get() {
        return Some(bytes.as_slice());
    }
    match std::fs::read(path) {
        Ok(bytes) => {
            log::debug!("Loaded logo {} ({} bytes)", path.display(), bytes.len());
            Some(LOGO.get_or_init(|| bytes).as_slice())
        }
        Err(e) => {
            log::warn!("Cannot read logo {}: {e}", path.display());
            None
        }
    }
}
