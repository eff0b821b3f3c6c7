//! Input discovery.
//!
//! Resolves the CLI `path` argument into the ordered list of images to
//! border. The path may be a single file or a directory; directories are
//! read one level deep unless recursion is requested.
//!
//! ## Filtering
//!
//! Every candidate's *file name* is matched against shell-style patterns:
//! it must match at least one include pattern and no exclude pattern.
//!
//! | Pattern | Matches |
//! |---|---|
//! | `*` | any run of characters, including none |
//! | `?` | exactly one character |
//! | `[abc]`, `[a-z]` | one character from the set |
//! | `[!abc]` | one character not in the set |
//!
//! Matching is case-sensitive, so the stock include list spells out both
//! `*.jpg` and `*.JPG`. The stock exclude `*_border*` keeps outputs of a
//! previous run from being bordered again.
//!
//! Files that fail the patterns are reported back as skipped rather than
//! silently dropped, so the run summary can account for them. The same goes
//! for hidden files, hidden directories a recursive walk does not enter, and
//! entries the walk cannot read (dangling symlinks, unreadable directories,
//! symlink loops). Only a missing root ends the scan with an error.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path does not exist: {0}")]
    InvalidPath(PathBuf),
}

/// Include/exclude filename patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl FileFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Why `name` is rejected, or `None` if it passes.
    pub fn rejection(&self, name: &str) -> Option<String> {
        if let Some(pattern) = self.exclude.iter().find(|p| fnmatch(p, name)) {
            return Some(format!("matches exclude pattern '{pattern}'"));
        }
        if !self.include.iter().any(|p| fnmatch(p, name)) {
            return Some("matches no include pattern".to_string());
        }
        None
    }

    pub fn matches(&self, name: &str) -> bool {
        self.rejection(name).is_none()
    }
}

/// A file that was found but not selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Files selected for processing, in path order, plus the ones filtered out.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

/// Collect the images under `path`.
///
/// A file path is returned as-is when it passes `filter`. A directory is
/// walked (only its direct children unless `recursive`) and results are
/// sorted by path. Hidden entries and entries that cannot be read are not
/// selected but reported in [`ScanResult::skipped`].
pub fn collect_inputs(
    path: &Path,
    recursive: bool,
    filter: &FileFilter,
) -> Result<ScanResult, ScanError> {
    if !path.exists() {
        return Err(ScanError::InvalidPath(path.to_path_buf()));
    }

    let mut result = ScanResult::default();
    let candidates: Vec<PathBuf> = if path.is_dir() {
        let walker = WalkDir::new(path).min_depth(1).follow_links(true);
        let walker = if recursive {
            walker
        } else {
            walker.max_depth(1)
        };
        let mut found = Vec::new();
        let mut entries = walker.into_iter();
        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let unreadable = err.path().unwrap_or(path).to_path_buf();
                    warn!(path = %unreadable.display(), error = %err, "cannot read entry, skipped");
                    result.skipped.push(Skipped {
                        path: unreadable,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let is_dir = entry.file_type().is_dir();
            if is_hidden(entry.file_name()) {
                if is_dir {
                    // A flat walk never opens subdirectories, so there is nothing to prune
                    if recursive {
                        entries.skip_current_dir();
                        result.skipped.push(Skipped {
                            path: entry.into_path(),
                            reason: "hidden directory".to_string(),
                        });
                    }
                } else if entry.file_type().is_file() {
                    result.skipped.push(Skipped {
                        path: entry.into_path(),
                        reason: "hidden file".to_string(),
                    });
                }
                continue;
            }
            if entry.file_type().is_file() {
                found.push(entry.into_path());
            }
        }
        found.sort();
        found
    } else {
        vec![path.to_path_buf()]
    };

    for candidate in candidates {
        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match filter.rejection(&name) {
            None => result.files.push(candidate),
            Some(reason) => result.skipped.push(Skipped {
                path: candidate,
                reason,
            }),
        }
    }
    result.skipped.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(result)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Shell-style wildcard match of `name` against `pattern`.
///
/// - `fnmatch("*.jpg", "a.jpg")` → true
/// - `fnmatch("*_border*", "a_border-s.jpg")` → true
/// - `fnmatch("IMG_????.png", "IMG_0042.png")` → true
/// - `fnmatch("[!.]*", ".hidden")` → false
pub fn fnmatch(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position after the last `*` and the name index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    backtrack = Some((p + 1, n));
                    p += 1;
                    continue;
                }
                '?' => {
                    p += 1;
                    n += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next)) = match_class(&pattern, p, name[n]) {
                        if matched {
                            p = next;
                            n += 1;
                            continue;
                        }
                    } else if name[n] == '[' {
                        // Unterminated class: literal '['
                        p += 1;
                        n += 1;
                        continue;
                    }
                }
                c if c == name[n] => {
                    p += 1;
                    n += 1;
                    continue;
                }
                _ => {}
            }
        }
        match backtrack {
            Some((star_p, star_n)) => {
                p = star_p;
                n = star_n + 1;
                backtrack = Some((star_p, star_n + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Match `c` against the bracket class starting at `pattern[start] == '['`.
///
/// Returns whether it matched and the index just past the closing `]`, or
/// `None` if the class is unterminated.
fn match_class(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negated = matches!(pattern.get(i), Some('!'));
    if negated {
        i += 1;
    }
    let mut matched = false;
    let mut first = true;
    loop {
        let current = *pattern.get(i)?;
        if current == ']' && !first {
            return Some((matched != negated, i + 1));
        }
        first = false;
        if pattern.get(i + 1) == Some(&'-') && pattern.get(i + 2).is_some_and(|&e| e != ']') {
            let end = pattern[i + 2];
            if current <= c && c <= end {
                matched = true;
            }
            i += 3;
        } else {
            if current == c {
                matched = true;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfig;
    use crate::test_helpers::file_names;
    use tempfile::TempDir;

    fn stock_filter() -> FileFilter {
        let files = FilesConfig::default();
        FileFilter::new(files.include, files.exclude)
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    // =========================================================================
    // fnmatch tests
    // =========================================================================

    #[test]
    fn star_matches_any_run() {
        assert!(fnmatch("*.jpg", "photo.jpg"));
        assert!(fnmatch("*.jpg", ".jpg"));
        assert!(!fnmatch("*.jpg", "photo.jpeg"));
        assert!(fnmatch("*_border*", "photo_border-s_exif.jpg"));
        assert!(!fnmatch("*_border*", "photo.jpg"));
        assert!(fnmatch("*", ""));
    }

    #[test]
    fn star_backtracks() {
        assert!(fnmatch("*a*b", "xaxxab"));
        assert!(fnmatch("a*b*c", "abbbc"));
        assert!(!fnmatch("a*b*c", "abbb"));
    }

    #[test]
    fn question_mark_is_one_char() {
        assert!(fnmatch("IMG_????.png", "IMG_0042.png"));
        assert!(!fnmatch("IMG_????.png", "IMG_042.png"));
    }

    #[test]
    fn bracket_classes() {
        assert!(fnmatch("[abc].jpg", "b.jpg"));
        assert!(!fnmatch("[abc].jpg", "d.jpg"));
        assert!(fnmatch("[a-c]x", "bx"));
        assert!(fnmatch("[!.]*", "photo.jpg"));
        assert!(!fnmatch("[!.]*", ".hidden"));
        assert!(fnmatch("[]]", "]"));
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        assert!(fnmatch("a[b", "a[b"));
        assert!(!fnmatch("a[b", "ab"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!fnmatch("*.jpg", "PHOTO.JPG"));
        assert!(fnmatch("*.JPG", "PHOTO.JPG"));
    }

    // =========================================================================
    // FileFilter tests
    // =========================================================================

    #[test]
    fn stock_filter_accepts_photos_and_rejects_outputs() {
        let filter = stock_filter();
        assert!(filter.matches("photo.jpg"));
        assert!(filter.matches("PHOTO.JPEG"));
        assert!(filter.matches("scan.png"));
        assert!(!filter.matches("photo_border-s.jpg"));
        assert!(!filter.matches("anim.gif"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = FileFilter::new(vec!["*".into()], vec!["*.txt".into()]);
        assert_eq!(
            filter.rejection("notes.txt").as_deref(),
            Some("matches exclude pattern '*.txt'")
        );
        assert!(filter.matches("notes.md"));
    }

    // =========================================================================
    // collect_inputs tests
    // =========================================================================

    #[test]
    fn directory_is_flat_by_default() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b.jpg"));
        touch(&tmp.path().join("a.png"));
        touch(&tmp.path().join("nested/c.jpg"));

        let result = collect_inputs(tmp.path(), false, &stock_filter()).unwrap();
        assert_eq!(
            result.files,
            vec![tmp.path().join("a.png"), tmp.path().join("b.jpg")]
        );
    }

    #[test]
    fn recursive_walk_descends() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("nested/deeper/c.jpg"));

        let result = collect_inputs(tmp.path(), true, &stock_filter()).unwrap();
        assert_eq!(result.files.len(), 2);
        assert!(result.files.contains(&tmp.path().join("nested/deeper/c.jpg")));
    }

    #[test]
    fn filtered_files_are_reported_as_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("a_border-s.jpg"));
        touch(&tmp.path().join("clip.gif"));

        let result = collect_inputs(tmp.path(), false, &stock_filter()).unwrap();
        assert_eq!(result.files, vec![tmp.path().join("a.jpg")]);
        assert_eq!(result.skipped.len(), 2);
        assert!(
            result
                .skipped
                .iter()
                .any(|s| s.path.ends_with("clip.gif") && s.reason.contains("no include"))
        );
        assert_eq!(file_names(tmp.path()).len(), 3);
    }

    #[test]
    fn hidden_entries_are_reported_as_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join(".IMG_1.jpg"));
        touch(&tmp.path().join(".cache/x.jpg"));
        touch(&tmp.path().join("a.jpg"));

        let result = collect_inputs(tmp.path(), true, &stock_filter()).unwrap();
        assert_eq!(result.files, vec![tmp.path().join("a.jpg")]);
        assert_eq!(
            result.skipped,
            vec![
                Skipped {
                    path: tmp.path().join(".IMG_1.jpg"),
                    reason: "hidden file".to_string(),
                },
                Skipped {
                    path: tmp.path().join(".cache"),
                    reason: "hidden directory".to_string(),
                },
            ]
        );
    }

    #[test]
    fn hidden_directory_is_not_reported_on_flat_walk() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join(".cache/x.jpg"));
        touch(&tmp.path().join(".IMG_1.jpg"));

        let result = collect_inputs(tmp.path(), false, &stock_filter()).unwrap();
        assert!(result.files.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].path.ends_with(".IMG_1.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped_and_walk_continues() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("b.png"));
        std::os::unix::fs::symlink(tmp.path().join("missing"), tmp.path().join("notes.txt"))
            .unwrap();

        let result = collect_inputs(tmp.path(), false, &stock_filter()).unwrap();
        assert_eq!(
            result.files,
            vec![tmp.path().join("a.jpg"), tmp.path().join("b.png")]
        );
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].path, tmp.path().join("notes.txt"));
        assert!(!result.skipped[0].reason.is_empty());
    }

    #[test]
    fn single_file_passes_through_filter() {
        let tmp = TempDir::new().unwrap();
        let photo = tmp.path().join("photo.jpg");
        let output = tmp.path().join("photo_border-s.jpg");
        touch(&photo);
        touch(&output);

        let result = collect_inputs(&photo, false, &stock_filter()).unwrap();
        assert_eq!(result.files, vec![photo]);

        let result = collect_inputs(&output, false, &stock_filter()).unwrap();
        assert!(result.files.is_empty());
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn missing_path_is_invalid() {
        let err = collect_inputs(Path::new("/nonexistent/photos"), false, &stock_filter())
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidPath(_)));
    }
}
