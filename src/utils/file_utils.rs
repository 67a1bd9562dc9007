use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lists the immediate entries of `dir`, sorted by path.
///
/// Entries that fail to resolve mid-listing are dropped; only a failure to
/// open `dir` itself is reported.
pub fn list_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();

    entries.sort();
    Ok(entries)
}

/// Case-insensitive extension check. An empty allow-list accepts everything.
pub fn has_allowed_extension<S: AsRef<str>>(path: &Path, allowed: &[S]) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    let ext = ext.to_ascii_lowercase();
    allowed
        .iter()
        .any(|allowed_ext| allowed_ext.as_ref().eq_ignore_ascii_case(&ext))
}

#[cfg(test)]
pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("snapgen_test_{}_{}", std::process::id(), tag));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_allowed_extension() {
        let allowed = ["mp4", "mkv"];
        assert!(has_allowed_extension(Path::new("/a/clip.mp4"), &allowed));
        assert!(has_allowed_extension(Path::new("/a/clip.MP4"), &allowed));
        assert!(!has_allowed_extension(Path::new("/a/clip.txt"), &allowed));
        assert!(!has_allowed_extension(Path::new("/a/clip"), &allowed));

        let none: [&str; 0] = [];
        assert!(has_allowed_extension(Path::new("/a/clip"), &none));
    }

    #[test]
    fn test_list_entries_sorted() {
        let dir = scratch_dir("list_entries");
        fs::write(dir.join("b.mp4"), b"").unwrap();
        fs::write(dir.join("a.mp4"), b"").unwrap();
        fs::create_dir(dir.join("c")).unwrap();

        let entries = list_entries(&dir).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4", "c"]);

        assert!(list_entries(&dir.join("missing")).is_err());
    }
}
