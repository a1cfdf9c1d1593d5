//! Text-marker conditions.
//!
//! Many long-running operations expose their progress as a page that is
//! re-rendered on every refresh: while the task runs the page carries a
//! "Refresh" button, and once it finishes it carries "Done" or
//! "Acknowledge" instead. [`MarkerCondition`] fetches that text from a
//! [`TextSource`] and classifies it with plain substring [`MarkerRules`].
//!
//! Classification order:
//!
//! 1. any `failed` marker present: `Failed`
//! 2. any `in_progress` marker present: `StillInProgress`
//! 3. any `completed` marker present: `Completed`
//! 4. no `completed` markers configured: `Completed`
//! 5. otherwise: `Failed` (unexpected page)

use crate::condition::{PollCondition, PollResult};
use crate::result::{PollError, TaskpollResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Longest page excerpt quoted in an "unexpected page" failure
const EXCERPT_CHARS: usize = 120;

// =============================================================================
// TEXT SOURCES
// =============================================================================

/// Produces the current text of whatever is being observed
pub trait TextSource {
    /// Read the current text
    fn fetch(&mut self) -> TaskpollResult<String>;

    /// Human-readable name of the source
    fn describe(&self) -> String;
}

impl<S: TextSource + ?Sized> TextSource for &mut S {
    fn fetch(&mut self) -> TaskpollResult<String> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: TextSource + ?Sized> TextSource for Box<S> {
    fn fetch(&mut self) -> TaskpollResult<String> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Reads a file on every fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    /// Observe the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The observed path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileTextSource {
    fn fetch(&mut self) -> TaskpollResult<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Replays a fixed sequence of pages; the last entry repeats once the
/// sequence is exhausted
#[derive(Debug, Clone, Default)]
pub struct ScriptedTextSource {
    pages: VecDeque<Result<String, String>>,
    last: Option<Result<String, String>>,
    fetches: u32,
}

impl ScriptedTextSource {
    /// Create a source that returns `pages` in order
    pub fn new<I, P>(pages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(|page| Ok(page.into())).collect(),
            last: None,
            fetches: 0,
        }
    }

    /// Append a fetch that fails with `reason`
    #[must_use]
    pub fn then_error(mut self, reason: impl Into<String>) -> Self {
        self.pages.push_back(Err(reason.into()));
        self
    }

    /// Append a page
    #[must_use]
    pub fn then_page(mut self, page: impl Into<String>) -> Self {
        self.pages.push_back(Ok(page.into()));
        self
    }

    /// Number of fetches made
    #[must_use]
    pub const fn fetches(&self) -> u32 {
        self.fetches
    }
}

impl TextSource for ScriptedTextSource {
    fn fetch(&mut self) -> TaskpollResult<String> {
        self.fetches += 1;
        if let Some(next) = self.pages.pop_front() {
            self.last = Some(next);
        }
        match &self.last {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(reason)) => Err(PollError::observation(reason.clone())),
            None => Err(PollError::observation("no pages scripted")),
        }
    }

    fn describe(&self) -> String {
        "scripted pages".to_string()
    }
}

// =============================================================================
// MARKER RULES
// =============================================================================

/// Substrings that classify an observed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMarkerRules")]
pub struct MarkerRules {
    in_progress: Vec<String>,
    completed: Vec<String>,
    failed: Vec<String>,
}

impl MarkerRules {
    /// Build and validate a rule set.
    ///
    /// At least one in-progress or completed marker is required, and no
    /// marker may be empty.
    pub fn new(
        in_progress: Vec<String>,
        completed: Vec<String>,
        failed: Vec<String>,
    ) -> TaskpollResult<Self> {
        if in_progress.is_empty() && completed.is_empty() {
            return Err(PollError::configuration(
                "marker rules need at least one in-progress or completed marker",
            ));
        }
        let mut all = in_progress.iter().chain(&completed).chain(&failed);
        if all.any(String::is_empty) {
            return Err(PollError::configuration("markers must not be empty"));
        }

        Ok(Self {
            in_progress,
            completed,
            failed,
        })
    }

    /// Rules for a "wait while this indicator is present" check
    pub fn while_present(marker: impl Into<String>) -> TaskpollResult<Self> {
        Self::new(vec![marker.into()], Vec::new(), Vec::new())
    }

    /// Rules for a progress page that shows a Refresh button while running
    /// and a Done or Acknowledge button when finished
    #[must_use]
    pub fn task_progress_page() -> Self {
        Self {
            in_progress: vec![r#"type="submit" name="Refresh""#.to_string()],
            completed: vec![
                r#"type="submit" name="Done""#.to_string(),
                r#"type="submit" name="Acknowledge""#.to_string(),
            ],
            failed: Vec::new(),
        }
    }

    /// In-progress markers
    #[must_use]
    pub fn in_progress(&self) -> &[String] {
        &self.in_progress
    }

    /// Completed markers
    #[must_use]
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Failure markers
    #[must_use]
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Classify a page
    #[must_use]
    pub fn classify(&self, text: &str) -> PollResult {
        if let Some(marker) = find_marker(&self.failed, text) {
            return PollResult::Failed(format!("failure marker '{marker}' found"));
        }
        if find_marker(&self.in_progress, text).is_some() {
            return PollResult::StillInProgress;
        }
        if self.completed.is_empty() || find_marker(&self.completed, text).is_some() {
            return PollResult::Completed;
        }
        PollResult::Failed(format!("unexpected page: {}", excerpt(text)))
    }
}

fn find_marker<'a>(markers: &'a [String], text: &str) -> Option<&'a str> {
    markers
        .iter()
        .map(String::as_str)
        .find(|marker| text.contains(marker))
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    let mut excerpt: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    if trimmed.chars().count() > EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

#[derive(Debug, Deserialize)]
struct RawMarkerRules {
    #[serde(default)]
    in_progress: Vec<String>,
    #[serde(default)]
    completed: Vec<String>,
    #[serde(default)]
    failed: Vec<String>,
}

impl TryFrom<RawMarkerRules> for MarkerRules {
    type Error = PollError;

    fn try_from(raw: RawMarkerRules) -> Result<Self, Self::Error> {
        Self::new(raw.in_progress, raw.completed, raw.failed)
    }
}

// =============================================================================
// MARKER CONDITION
// =============================================================================

/// Fetches text from a source and classifies it with marker rules
#[derive(Debug, Clone)]
pub struct MarkerCondition<S: TextSource> {
    source: S,
    rules: MarkerRules,
}

impl<S: TextSource> MarkerCondition<S> {
    /// Create a condition over `source`
    pub const fn new(source: S, rules: MarkerRules) -> Self {
        Self { source, rules }
    }

    /// The rules in use
    pub const fn rules(&self) -> &MarkerRules {
        &self.rules
    }

    /// The underlying source
    pub const fn source(&self) -> &S {
        &self.source
    }
}

impl<S: TextSource> PollCondition for MarkerCondition<S> {
    fn evaluate(&mut self) -> PollResult {
        match self.source.fetch() {
            Ok(text) => self.rules.classify(&text),
            Err(PollError::Observation { reason, .. }) => PollResult::Failed(reason),
            Err(err) => PollResult::Failed(err.to_string()),
        }
    }

    fn description(&self) -> String {
        format!("operation at {}", self.source.describe())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rules(in_progress: &[&str], completed: &[&str], failed: &[&str]) -> MarkerRules {
        let owned = |markers: &[&str]| markers.iter().map(|m| (*m).to_string()).collect();
        MarkerRules::new(owned(in_progress), owned(completed), owned(failed)).unwrap()
    }

    mod rules_tests {
        use super::*;

        #[test]
        fn test_requires_progress_or_completed_marker() {
            let err = MarkerRules::new(Vec::new(), Vec::new(), vec!["ERROR".into()]).unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn test_rejects_empty_marker() {
            let err = MarkerRules::new(vec![String::new()], Vec::new(), Vec::new()).unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn test_classify_in_progress() {
            let rules = MarkerRules::task_progress_page();
            let page = r#"<form><input type="submit" name="Refresh" value="Refresh"></form>"#;
            assert_eq!(rules.classify(page), PollResult::StillInProgress);
        }

        #[test]
        fn test_classify_completed() {
            let rules = MarkerRules::task_progress_page();
            let page = r#"<input type="submit" name="Acknowledge" value="Acknowledge">"#;
            assert_eq!(rules.classify(page), PollResult::Completed);
        }

        #[test]
        fn test_classify_unexpected_page() {
            let rules = MarkerRules::task_progress_page();
            match rules.classify("<title>Login</title>") {
                PollResult::Failed(reason) => {
                    assert!(reason.starts_with("unexpected page"));
                    assert!(reason.contains("Login"));
                }
                other => panic!("unexpected result: {other}"),
            }
        }

        #[test]
        fn test_failure_marker_wins() {
            let rules = rules(&["Refresh"], &["Done"], &["WORKFLOW ASSOCIATION ERROR"]);
            let result = rules.classify("WORKFLOW ASSOCIATION ERROR ... Refresh");
            assert!(result.is_failed());
        }

        #[test]
        fn test_in_progress_checked_before_completed() {
            let rules = rules(&["Refresh"], &["Done"], &[]);
            assert!(rules.classify("Done so far: 40%  [Refresh]").is_in_progress());
        }

        #[test]
        fn test_while_present_completes_when_marker_gone() {
            let rules = MarkerRules::while_present("importprogress").unwrap();
            assert!(rules.classify("/secure/admin/importprogress").is_in_progress());
            assert!(rules.classify("/secure/ImportResult.jspa").is_completed());
        }

        #[test]
        fn test_excerpt_truncates_long_pages() {
            let long = "x".repeat(500);
            let text = excerpt(&long);
            assert_eq!(text.len(), EXCERPT_CHARS + 3);
            assert!(text.ends_with("..."));
            assert_eq!(excerpt("   "), "<empty>");
        }

        #[test]
        fn test_yaml_rules() {
            let parsed: MarkerRules =
                serde_yaml_ng::from_str("in_progress: [Refresh]\ncompleted: [Done]\n").unwrap();
            assert_eq!(parsed.in_progress(), ["Refresh".to_string()]);
            assert_eq!(parsed.completed(), ["Done".to_string()]);
            assert!(parsed.failed().is_empty());
        }

        #[test]
        fn test_yaml_rules_validated() {
            let result: Result<MarkerRules, _> = serde_yaml_ng::from_str("failed: [Oops]\n");
            assert!(result.is_err());
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_scripted_pages() {
            let source = ScriptedTextSource::new(["Refresh", "Refresh", "Done"]);
            let mut condition = MarkerCondition::new(source, rules(&["Refresh"], &["Done"], &[]));
            assert!(condition.evaluate().is_in_progress());
            assert!(condition.evaluate().is_in_progress());
            assert!(condition.evaluate().is_completed());
            assert_eq!(condition.source().fetches(), 3);
        }

        #[test]
        fn test_fetch_error_becomes_failed() {
            let source = ScriptedTextSource::new(["Refresh"]).then_error("connection refused");
            let mut condition = MarkerCondition::new(source, rules(&["Refresh"], &["Done"], &[]));
            assert!(condition.evaluate().is_in_progress());
            assert_eq!(
                condition.evaluate(),
                PollResult::Failed("connection refused".into())
            );
        }

        #[test]
        fn test_empty_script_fails() {
            let mut condition =
                MarkerCondition::new(ScriptedTextSource::default(), rules(&["x"], &[], &[]));
            assert!(condition.evaluate().is_failed());
        }

        #[test]
        fn test_file_source() {
            let mut file = NamedTempFile::new().unwrap();
            write!(file, "status: Done").unwrap();
            let source = FileTextSource::new(file.path());
            assert_eq!(source.path(), file.path());
            let mut condition = MarkerCondition::new(source, rules(&["Running"], &["Done"], &[]));
            assert!(condition.evaluate().is_completed());
            assert!(condition.description().contains("operation at"));
        }

        #[test]
        fn test_missing_file_becomes_failed() {
            let dir = tempfile::tempdir().unwrap();
            let source = FileTextSource::new(dir.path().join("missing.txt"));
            let mut condition = MarkerCondition::new(source, rules(&["Running"], &["Done"], &[]));
            match condition.evaluate() {
                PollResult::Failed(reason) => assert!(reason.contains("I/O")),
                other => panic!("unexpected result: {other}"),
            }
        }
    }
}
