//! Recursive includer.
//!
//! Expands inclusion directives (by default LaTeX's `\input{path}`) in place,
//! depth-first and pre-order: an included file is emitted completely before
//! the line following its directive.
//!
//! The traversal keeps an explicit stack of open files instead of recursing,
//! so deep trees never exhaust the call stack and a file that reappears on
//! its own chain is reported as [`MergeError::IncludeCycle`].

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::instrument;

use crate::error::{Location, MergeError, Result};
use crate::fragment::{Fragment, content};

/// The directive the original LaTeX tooling recognises.
pub const DEFAULT_DIRECTIVE: &str = r"\input{";

/// The extension LaTeX appends to extension-less `\input` targets.
pub const DEFAULT_IMPLICIT_EXTENSION: &str = "tex";

/// How directives are recognised and resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeOptions {
    /// Substring that marks a line as a directive.
    pub directive: String,
    /// Directory relative targets resolve against. `None` uses the root
    /// document's directory.
    pub base_dir: Option<PathBuf>,
    /// Extension tried when a target has none and does not exist as written.
    pub implicit_extension: Option<String>,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_owned(),
            base_dir: None,
            implicit_extension: Some(DEFAULT_IMPLICIT_EXTENSION.to_owned()),
        }
    }
}

/// What an expansion touched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IncludeReport {
    /// Every file opened, in the order it was opened.
    pub files: Vec<PathBuf>,
    /// Directive lines replaced by file contents.
    pub directives_expanded: usize,
    /// Lines copied to the output.
    pub lines_written: usize,
    /// Deepest nesting reached; the root alone is depth 1.
    pub max_depth: usize,
}

/// An open file on the traversal stack.
struct Frame {
    fragment: Fragment,
    /// Canonical path, used for cycle detection.
    identity: PathBuf,
    /// Index of the next line to process.
    next: usize,
}

impl Frame {
    fn open(fragment: Fragment) -> Result<Self> {
        let identity = std::fs::canonicalize(fragment.path())
            .map_err(|e| MergeError::io(fragment.path(), e))?;
        Ok(Self {
            fragment,
            identity,
            next: 0,
        })
    }
}

/// Expands inclusion directives.
#[derive(Clone, Debug, Default)]
pub struct Includer {
    options: IncludeOptions,
}

impl Includer {
    #[must_use]
    pub const fn new(options: IncludeOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &IncludeOptions {
        &self.options
    }

    /// Expand `root` into `out`.
    ///
    /// Output is written as the traversal proceeds; on error `out` holds
    /// whatever was emitted before the failure. Use
    /// [`Includer::expand_to_vec`] and [`crate::output::write_atomic`] when a
    /// half-written file must never appear on disk.
    ///
    /// # Errors
    /// Missing files, malformed directives, inclusion cycles and I/O errors
    /// on either side.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn expand_into<W: Write>(&self, root: &Path, out: &mut W) -> Result<IncludeReport> {
        let base_dir = self.base_dir(root);
        let mut report = IncludeReport::default();

        let mut stack = vec![Frame::open(Fragment::read(root, None)?)?];
        report.files.push(root.to_owned());
        report.max_depth = 1;

        while let Some(frame) = stack.last_mut() {
            let Some(line) = frame.fragment.lines().get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;

            if !line.contains(self.options.directive.as_str()) {
                out.write_all(line.as_bytes()).map_err(MergeError::Output)?;
                report.lines_written += 1;
                continue;
            }

            let location = Location::new(frame.fragment.path(), frame.next);
            let target = self.resolve(&base_dir, directive_target(line, &location)?);
            tracing::debug!(%location, target = %target.display(), "expanding directive");

            let child = Frame::open(Fragment::read(&target, Some(location))?)?;
            if stack.iter().any(|f| f.identity == child.identity) {
                let chain = stack
                    .iter()
                    .map(|f| f.fragment.path().to_owned())
                    .chain(std::iter::once(target))
                    .collect();
                return Err(MergeError::IncludeCycle { chain });
            }

            report.files.push(target);
            report.directives_expanded += 1;
            stack.push(child);
            report.max_depth = report.max_depth.max(stack.len());
        }

        out.flush().map_err(MergeError::Output)?;
        tracing::info!(
            files = report.files.len(),
            directives = report.directives_expanded,
            lines = report.lines_written,
            "expansion complete"
        );
        Ok(report)
    }

    /// Expand `root` into a fresh buffer.
    ///
    /// # Errors
    /// Same as [`Includer::expand_into`].
    pub fn expand_to_vec(&self, root: &Path) -> Result<(Vec<u8>, IncludeReport)> {
        let mut buf = Vec::new();
        let report = self.expand_into(root, &mut buf)?;
        Ok((buf, report))
    }

    fn base_dir(&self, root: &Path) -> PathBuf {
        self.options.base_dir.clone().unwrap_or_else(|| {
            root.parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        })
    }

    fn resolve(&self, base_dir: &Path, target: &str) -> PathBuf {
        let path = base_dir.join(target);
        match &self.options.implicit_extension {
            Some(ext) if path.extension().is_none() && !path.exists() => {
                let with_ext = path.with_extension(ext);
                if with_ext.exists() { with_ext } else { path }
            }
            _ => path,
        }
    }
}

/// The path between the first `{` and the first `}` of a directive line.
fn directive_target<'a>(line: &'a str, location: &Location) -> Result<&'a str> {
    let text = content(line);
    let malformed = |reason| MergeError::MalformedDirective {
        location: location.clone(),
        text: text.to_owned(),
        reason,
    };

    let open = text.find('{').ok_or_else(|| malformed("missing opening brace"))?;
    let close = text.find('}').ok_or_else(|| malformed("missing closing brace"))?;
    if close < open {
        return Err(malformed("closing brace before opening brace"));
    }
    let target = text[open + 1..close].trim();
    if target.is_empty() {
        return Err(malformed("empty path"));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn expand(root: &Path) -> Result<(String, IncludeReport)> {
        let (buf, report) = Includer::default().expand_to_vec(root)?;
        Ok((String::from_utf8(buf).unwrap(), report))
    }

    #[test]
    fn root_without_directives_is_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("book.tex");
        let text = "\\documentclass{book}\r\n\\begin{document}\nHello\n\\end{document}";
        fs::write(&root, text).unwrap();

        let (out, report) = expand(&root).unwrap();
        assert_eq!(out, text);
        assert_eq!(report.directives_expanded, 0);
        assert_eq!(report.lines_written, 4);
        assert_eq!(report.max_depth, 1);
    }

    #[test]
    fn nested_includes_expand_depth_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("book.tex"),
            "r1\n\\input{a.tex}\nr2\n",
        )
        .unwrap();
        fs::write(dir.path().join("a.tex"), "a1\n\\input{b.tex}\na2\n").unwrap();
        fs::write(dir.path().join("b.tex"), "b1\n").unwrap();

        let (out, report) = expand(&dir.path().join("book.tex")).unwrap();
        assert_eq!(out, "r1\na1\nb1\na2\nr2\n");
        assert_eq!(report.directives_expanded, 2);
        assert_eq!(report.max_depth, 3);
        assert_eq!(
            report.files,
            vec![
                dir.path().join("book.tex"),
                dir.path().join("a.tex"),
                dir.path().join("b.tex"),
            ]
        );
    }

    #[test]
    fn directive_line_text_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("book.tex"),
            "before \\input{a.tex} after\n",
        )
        .unwrap();
        fs::write(dir.path().join("a.tex"), "A\n").unwrap();

        let (out, _) = expand(&dir.path().join("book.tex")).unwrap();
        assert_eq!(out, "A\n");
    }

    #[test]
    fn same_file_twice_in_sequence_is_not_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("book.tex"),
            "\\input{rule.tex}\nmid\n\\input{rule.tex}\n",
        )
        .unwrap();
        fs::write(dir.path().join("rule.tex"), "---\n").unwrap();

        let (out, _) = expand(&dir.path().join("book.tex")).unwrap();
        assert_eq!(out, "---\nmid\n---\n");
    }

    #[test]
    fn implicit_extension_is_tried() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("book.tex"), "\\input{chapters/one}\n").unwrap();
        fs::create_dir(dir.path().join("chapters")).unwrap();
        fs::write(dir.path().join("chapters/one.tex"), "one\n").unwrap();

        let (out, _) = expand(&dir.path().join("book.tex")).unwrap();
        assert_eq!(out, "one\n");
    }

    #[test]
    fn implicit_extension_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("book.tex"), "\\input{one}\n").unwrap();
        fs::write(dir.path().join("one.tex"), "one\n").unwrap();

        let includer = Includer::new(IncludeOptions {
            implicit_extension: None,
            ..IncludeOptions::default()
        });
        let err = includer
            .expand_to_vec(&dir.path().join("book.tex"))
            .unwrap_err();
        assert!(matches!(err, MergeError::FileNotFound { .. }), "{err:?}");
    }

    #[test]
    fn missing_include_names_the_directive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("book.tex");
        fs::write(&root, "x\n\\input{gone.tex}\n").unwrap();

        let err = expand(&root).unwrap_err();
        match err {
            MergeError::FileNotFound {
                path,
                included_from,
            } => {
                assert_eq!(path, dir.path().join("gone.tex"));
                assert_eq!(included_from, Some(Location::new(&root, 2)));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_root_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand(&dir.path().join("book.tex")).unwrap_err();
        assert!(
            matches!(err, MergeError::FileNotFound { included_from: None, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn self_include_is_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.tex"), "\\input{a.tex}\n").unwrap();

        let err = expand(&dir.path().join("a.tex")).unwrap_err();
        assert!(matches!(err, MergeError::IncludeCycle { .. }), "{err:?}");
    }

    #[test]
    fn indirect_cycle_reports_chain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("book.tex"), "\\input{a.tex}\n").unwrap();
        fs::write(dir.path().join("a.tex"), "\\input{b.tex}\n").unwrap();
        fs::write(dir.path().join("b.tex"), "\\input{a.tex}\n").unwrap();

        let err = expand(&dir.path().join("book.tex")).unwrap_err();
        match err {
            MergeError::IncludeCycle { chain } => {
                let names: Vec<_> = chain
                    .iter()
                    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                    .collect();
                assert_eq!(names, ["book.tex", "a.tex", "b.tex", "a.tex"]);
            }
            other => panic!("expected IncludeCycle, got {other:?}"),
        }
    }

    #[test]
    fn custom_directive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("book.tex"), "\\include{a}\n\\input{b}\n").unwrap();
        fs::write(dir.path().join("a.tex"), "A\n").unwrap();

        let includer = Includer::new(IncludeOptions {
            directive: r"\include{".to_owned(),
            ..IncludeOptions::default()
        });
        let (buf, _) = includer.expand_to_vec(&dir.path().join("book.tex")).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "A\n\\input{b}\n");
    }

    #[test]
    fn explicit_base_dir_overrides_root_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("src/book.tex"), "\\input{intro.tex}\n").unwrap();
        fs::write(dir.path().join("parts/intro.tex"), "intro\n").unwrap();

        let includer = Includer::new(IncludeOptions {
            base_dir: Some(dir.path().join("parts")),
            ..IncludeOptions::default()
        });
        let (buf, _) = includer
            .expand_to_vec(&dir.path().join("src/book.tex"))
            .unwrap();
        assert_eq!(buf, b"intro\n");
    }

    #[test]
    fn target_between_first_braces() {
        let loc = Location::new("book.tex", 1);
        assert_eq!(
            directive_target("\\input{ch1.tex}\n", &loc).unwrap(),
            "ch1.tex"
        );
        assert_eq!(
            directive_target("\\input{ch1.tex} % {note}\n", &loc).unwrap(),
            "ch1.tex"
        );
        assert_eq!(directive_target("\\input{ ch1 }", &loc).unwrap(), "ch1");
    }

    #[test]
    fn malformed_targets_are_rejected() {
        let loc = Location::new("book.tex", 9);
        for (line, reason) in [
            ("\\input{ch1.tex\n", "missing closing brace"),
            ("} \\input{ch1.tex\n", "closing brace before opening brace"),
            ("\\input{}\n", "empty path"),
            ("\\input  x}\n", "missing opening brace"),
        ] {
            match directive_target(line, &loc) {
                Err(MergeError::MalformedDirective {
                    location,
                    reason: got,
                    ..
                }) => {
                    assert_eq!(location, loc);
                    assert_eq!(got, reason, "line {line:?}");
                }
                other => panic!("expected MalformedDirective for {line:?}, got {other:?}"),
            }
        }
    }
}
