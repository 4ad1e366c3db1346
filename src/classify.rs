//! Path classification for spreadsheet artifacts.
//!
//! Decides, from the base file name alone, whether a changed path is a
//! tracked artifact worth mirroring or editor noise to skip. Directory
//! components never participate in the decision.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::watcher::ChangeKind;

/// Default pattern for tracked artifact names.
///
/// An identifier of word characters and hyphens, an underscore, a kind
/// tag, an optional numeric suffix, then a spreadsheet extension. The
/// kind tags are case sensitive while the extension is not.
pub const DEFAULT_TRACKED_PATTERN: &str =
    r"^[\w-]+_(EngData|DataDictionary)\d*\.(?i:xlsx|xlsm|xlsb|xltx|xltm|xlam)$";

/// Transient names produced by spreadsheet editors mid-save.
///
/// Ordered by how often each form shows up in practice. The prefixes are
/// case sensitive.
fn temp_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^~\$.+\.xlsx?$").unwrap(),
            Regex::new(r"^.+\.tmp$").unwrap(),
            Regex::new(r"^\..+\.xlsx?\.tmp$").unwrap(),
        ]
    })
}

/// Classifies changed paths by base name.
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    tracked: Regex,
}

impl ArtifactClassifier {
    /// Classifier with the built-in tracked pattern.
    pub fn new() -> Self {
        static TRACKED: OnceLock<Regex> = OnceLock::new();
        Self {
            tracked: TRACKED
                .get_or_init(|| Regex::new(DEFAULT_TRACKED_PATTERN).unwrap())
                .clone(),
        }
    }

    /// Classifier with a configured tracked pattern override.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            tracked: Regex::new(pattern)?,
        })
    }

    /// True when the base name matches the tracked pattern.
    ///
    /// Paths without a UTF-8 base name are never tracked.
    pub fn is_tracked_artifact(&self, path: &Path) -> bool {
        match base_name(path) {
            Some(name) => self.tracked.is_match(name),
            None => false,
        }
    }

    /// True when the base name matches any transient editor form.
    pub fn is_temp_artifact(&self, path: &Path) -> bool {
        match base_name(path) {
            Some(name) => temp_patterns().iter().any(|re| re.is_match(name)),
            None => false,
        }
    }

    /// A change qualifies for processing only when the path is tracked,
    /// is not transient, and the change is an update. Temp always wins
    /// over tracked.
    pub fn qualifies(&self, path: &Path, kind: ChangeKind) -> bool {
        kind == ChangeKind::Updated && self.is_tracked_artifact(path) && !self.is_temp_artifact(path)
    }
}

impl Default for ArtifactClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn base_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn classifier() -> ArtifactClassifier {
        ArtifactClassifier::new()
    }

    #[test]
    fn accepts_tracked_names() {
        let c = classifier();
        for name in [
            "Foo_EngData.xlsx",
            "Foo_EngData1.xlsx",
            "Foo_EngData12.xlsm",
            "data-pack_DataDictionary.xlsb",
            "data-pack_DataDictionary42.xltx",
            "a_b-c_EngData.xltm",
            "pack_EngData.xlam",
        ] {
            assert!(c.is_tracked_artifact(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn extension_is_case_insensitive_but_kind_tag_is_not() {
        let c = classifier();
        assert!(c.is_tracked_artifact(Path::new("Foo_EngData.XLSX")));
        assert!(c.is_tracked_artifact(Path::new("Foo_DataDictionary.XlSm")));
        assert!(!c.is_tracked_artifact(Path::new("Foo_engdata.xlsx")));
        assert!(!c.is_tracked_artifact(Path::new("Foo_DATADICTIONARY.xlsx")));
    }

    #[test]
    fn rejects_untracked_names() {
        let c = classifier();
        for name in [
            "Foo_EngData.xls",
            "Foo_EngData.csv",
            "Foo_EngData.xlsx.bak",
            "EngData.xlsx",
            "_EngData.xlsx",
            "Foo EngData.xlsx",
            "Foo_EngDataExtra.xlsx",
            "notes.txt",
        ] {
            assert!(!c.is_tracked_artifact(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn classifies_by_base_name_only() {
        let c = classifier();
        let nested = PathBuf::from("/repo/sheets/deep/Foo_EngData.xlsx");
        assert!(c.is_tracked_artifact(&nested));
        // A tracked-looking directory does not rescue an untracked file.
        assert!(!c.is_tracked_artifact(Path::new("/repo/Foo_EngData.xlsx/readme.txt")));
    }

    #[test]
    fn recognizes_temp_forms() {
        let c = classifier();
        for name in [
            "~$Foo_EngData.xlsx",
            "~$report.xls",
            "anything.tmp",
            "Foo_EngData.xlsx.tmp",
            ".Foo_EngData.xlsx.tmp",
            ".lockfile.xls.tmp",
        ] {
            assert!(c.is_temp_artifact(Path::new(name)), "{name}");
        }
        // The transient prefixes are case sensitive.
        assert!(!c.is_temp_artifact(Path::new("~$Foo.XLSX")));
        assert!(!c.is_temp_artifact(Path::new("Foo_EngData.xlsx")));
    }

    #[test]
    fn temp_wins_over_tracked() {
        // A permissive override makes the predicates overlap.
        let c = ArtifactClassifier::with_pattern(r"^.+\.tmp$").unwrap();
        let path = Path::new("Foo_EngData.tmp");
        assert!(c.is_tracked_artifact(path));
        assert!(c.is_temp_artifact(path));
        assert!(!c.qualifies(path, ChangeKind::Updated));
    }

    #[test]
    fn only_updates_qualify() {
        let c = classifier();
        let path = Path::new("Foo_EngData.xlsx");
        assert!(c.qualifies(path, ChangeKind::Updated));
        assert!(!c.qualifies(path, ChangeKind::Created));
        assert!(!c.qualifies(path, ChangeKind::Deleted));
    }

    #[test]
    fn rejects_invalid_pattern_override() {
        assert!(ArtifactClassifier::with_pattern("([unclosed").is_err());
    }
}
