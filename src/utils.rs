/// Splits a file name on its last `.` into a base name and an extension
/// that keeps the leading dot. Names without a dot have an empty extension.
pub fn split_file_name(file_name: &str) -> (String, String) {
    match file_name.rsplit_once('.') {
        Some((name, extension)) => (name.to_string(), format!(".{}", extension)),
        None => (file_name.to_string(), String::new()),
    }
}

/// Number of `.`-separated segments in a file name (`report.v2.txt` has three).
pub fn segment_count(file_name: &str) -> usize {
    file_name.split('.').count()
}

/// Strips directory components and characters that are unsafe in file names.
/// Returns `None` when nothing usable is left.
pub fn sanitize_upload_name(file_name: &str) -> Option<String> {
    let sanitized = sanitize_filename::sanitize(file_name);
    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_the_last_dot() {
        assert_eq!(split_file_name("notes.txt"), ("notes".into(), ".txt".into()));
        assert_eq!(split_file_name("report.v2.txt"), ("report.v2".into(), ".txt".into()));
        assert_eq!(split_file_name("README"), ("README".into(), "".into()));
        assert_eq!(split_file_name("archive."), ("archive".into(), ".".into()));
    }

    #[test]
    fn counts_segments() {
        assert_eq!(segment_count("README"), 1);
        assert_eq!(segment_count("notes.txt"), 2);
        assert_eq!(segment_count("report.v2.txt"), 3);
    }

    #[test]
    fn sanitizing_drops_path_components() {
        let name = sanitize_upload_name("../../etc/passwd.txt").unwrap();
        assert!(!name.contains('/'));
        assert!(name.ends_with("passwd.txt"));

        assert_eq!(sanitize_upload_name("notes.txt").as_deref(), Some("notes.txt"));
        assert_eq!(sanitize_upload_name(""), None);
        assert_eq!(sanitize_upload_name(".."), None);
    }
}
