//! Identity of the test making assertions.

use std::path::{Path, PathBuf};

use snappiershot_core::{Mapping, Value};

/// Where a snapshot session was opened: the test's source file, its fully
/// qualified function path and the arguments it was called with.
///
/// Parameterized tests should pass their parameters as arguments so that each
/// combination gets its own snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerInfo {
    pub file: PathBuf,
    pub function: String,
    pub args: Mapping<Value>,
}

impl CallerInfo {
    pub fn new(file: impl Into<PathBuf>, function: impl Into<String>) -> Self {
        CallerInfo {
            file: file.into(),
            function: function.into(),
            args: Mapping::new(),
        }
    }

    /// Add a named argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name, value.into());
        self
    }

    /// Resolve a `file!()` path against the calling crate's manifest directory.
    ///
    /// `file!()` is relative to the directory cargo was invoked for, which is
    /// the workspace root for workspace members, so the manifest directory
    /// and each of its ancestors are tried in turn.
    pub fn resolve_file(manifest_dir: &Path, file: &str) -> PathBuf {
        let file = Path::new(file);
        if file.is_absolute() {
            return file.to_path_buf();
        }
        manifest_dir
            .ancestors()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| manifest_dir.join(file))
    }
}

/// Strip the helper item and any closure segments from a `type_name` path.
#[doc(hidden)]
pub fn trim_function_path(name: &'static str) -> &'static str {
    let mut name = name.strip_suffix("::__here").unwrap_or(name);
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    name
}

/// The fully qualified path of the enclosing function.
#[macro_export]
macro_rules! function_path {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::caller::trim_function_path(__type_name_of(__here))
    }};
}

/// Build a [`CallerInfo`] for the enclosing test function.
///
/// ```ignore
/// let caller = caller_info!(); // no arguments
/// let caller = caller_info!(width, height); // arguments by name
/// ```
#[macro_export]
macro_rules! caller_info {
    ($($arg:ident),* $(,)?) => {
        $crate::CallerInfo::new(
            $crate::CallerInfo::resolve_file(
                ::std::path::Path::new(env!("CARGO_MANIFEST_DIR")),
                file!(),
            ),
            $crate::function_path!(),
        )
        $(.arg(stringify!($arg), ::std::clone::Clone::clone(&$arg)))*
    };
}
