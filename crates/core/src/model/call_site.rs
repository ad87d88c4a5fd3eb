use serde::{Deserialize, Serialize};
use statree_protocol::SharedStr;

/// File recorded by the profiler for built-in (C-implemented) functions.
pub const BUILTIN_FILE: &str = "~";
/// Display name used in the location hierarchy for [`BUILTIN_FILE`].
pub const BUILTIN_DISPLAY: &str = "<built-in>";
/// Function name the profiler gives to a file's module-level code.
pub const MODULE_FUNCTION: &str = "<module>";

/// Identity of a profiled callable: `(file, line, function)`.
///
/// Serialized as the 3-array `[file, line, function]`, the shape the key
/// takes in a decoded stats dump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(
    from = "(SharedStr, u32, SharedStr)",
    into = "(SharedStr, u32, SharedStr)"
)]
pub struct CallSiteKey {
    pub file: SharedStr,
    pub line: u32,
    pub function: SharedStr,
}

impl CallSiteKey {
    pub fn new(file: impl Into<SharedStr>, line: u32, function: impl Into<SharedStr>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// `(directory, file name)` of the recorded file path.
    pub fn split_file(&self) -> (&str, &str) {
        split_path(&self.file)
    }
}

impl From<(SharedStr, u32, SharedStr)> for CallSiteKey {
    fn from((file, line, function): (SharedStr, u32, SharedStr)) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

impl From<CallSiteKey> for (SharedStr, u32, SharedStr) {
    fn from(key: CallSiteKey) -> Self {
        (key.file, key.line, key.function)
    }
}

impl std::fmt::Display for CallSiteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}({})", self.file, self.line, self.function)
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Split a path into `(head, tail)` at the last separator.
///
/// Trailing separators are trimmed from the head unless the head is made of
/// separators only, so `/a/b` gives `("/a", "b")`, `/a` gives `("/", "a")`
/// and a bare name gives `("", name)`.
pub fn split_path(path: &str) -> (&str, &str) {
    let Some(pos) = path.rfind(is_separator) else {
        return ("", path);
    };
    let head = &path[..=pos];
    let tail = &path[pos + 1..];
    let trimmed = head.trim_end_matches(is_separator);
    if trimmed.is_empty() {
        (head, tail)
    } else {
        (trimmed, tail)
    }
}
