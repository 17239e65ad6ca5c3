//! Append-only text accumulator with placeholder splicing.
//!
//! Templates carry literal placeholder tokens (`<RPC_ID>`,
//! `/*DATA_LAYOUT*/`, ...). `replace_all` fills scalar placeholders
//! everywhere at once; `splice_at_first` consumes one occurrence at a
//! time, left to right, so the same token can stand for several
//! distinct expansion sites in one template.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("placeholder `{token}` not found in template")]
    PlaceholderNotFound { token: String },

    #[error("reading template {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    buf: String,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Append the content of `path` verbatim.
    pub fn append_file(&mut self, path: &Path) -> Result<(), TemplateError> {
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.buf.push_str(&text);
        Ok(())
    }

    /// Splice the full content of another accumulator.
    pub fn append_nested(&mut self, other: &Accumulator) {
        self.buf.push_str(&other.buf);
    }

    /// Replace every occurrence of `token` in the current content.
    pub fn replace_all(&mut self, token: &str, value: &str) {
        if self.buf.contains(token) {
            self.buf = self.buf.replace(token, value);
        }
    }

    /// Remove the first remaining `token` and insert `generated` in its place.
    pub fn splice_at_first(&mut self, token: &str, generated: &str) -> Result<(), TemplateError> {
        let at = self
            .buf
            .find(token)
            .ok_or_else(|| TemplateError::PlaceholderNotFound {
                token: token.to_string(),
            })?;
        self.buf.replace_range(at..at + token.len(), generated);
        Ok(())
    }

    /// Number of occurrences of `token` still in the buffer.
    pub fn occurrences(&self, token: &str) -> usize {
        if token.is_empty() {
            return 0;
        }
        self.buf.matches(token).count()
    }

    pub fn text(&self) -> &str {
        &self.buf
    }

    pub fn into_text(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_consumes_left_to_right() {
        let mut acc = Accumulator::new();
        acc.append("a[SLOT]b[SLOT]c");

        acc.splice_at_first("[SLOT]", "1").unwrap();
        assert_eq!(acc.text(), "a1b[SLOT]c");
        assert_eq!(acc.occurrences("[SLOT]"), 1);

        acc.splice_at_first("[SLOT]", "2").unwrap();
        assert_eq!(acc.text(), "a1b2c");

        let err = acc.splice_at_first("[SLOT]", "3").unwrap_err();
        assert!(
            matches!(&err, TemplateError::PlaceholderNotFound { token } if token == "[SLOT]"),
            "{err}"
        );
        assert_eq!(acc.text(), "a1b2c");
    }

    #[test]
    fn replace_all_is_exhaustive_and_immediate() {
        let mut acc = Accumulator::new();
        acc.append("<ID> + <ID>");
        acc.replace_all("<ID>", "7");
        acc.append(" + <ID>");
        assert_eq!(acc.text(), "7 + 7 + <ID>");
    }

    #[test]
    fn nested_accumulators() {
        let mut inner = Accumulator::new();
        inner.append("inner;");
        let mut outer = Accumulator::new();
        outer.append("outer:");
        outer.append_nested(&inner);
        outer.append_nested(&inner);
        assert_eq!(outer.into_text(), "outer:inner;inner;");
    }

    #[test]
    fn append_file_missing() {
        let mut acc = Accumulator::new();
        let err = acc
            .append_file(Path::new("/definitely/not/here.tmpl"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }), "{err}");
    }

    #[test]
    fn append_file_verbatim() {
        let path = std::env::temp_dir().join(format!("rpcgen-append-{}.tmpl", std::process::id()));
        fs::write(&path, "line one\n\tline two\n").unwrap();

        let mut acc = Accumulator::new();
        acc.append("head\n");
        acc.append_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(acc.text(), "head\nline one\n\tline two\n");
    }
}
