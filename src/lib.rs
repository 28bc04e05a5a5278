//! A permissive, indentation-sensitive document loader for YAML-like text,
//! plus a matching serializer.
//!
//! Loading is a single linear pass through three phases:
//!
//! 1. **Classify** ([`classify`]): each raw line becomes a typed node,
//!    independent of context. Classification never fails.
//! 2. **Assemble** ([`assemble`]): nodes thread into one hierarchy driven by
//!    indentation, with stateful handling of continuations, blank lines, and
//!    block scalars.
//! 3. **Build** ([`build`]): the hierarchy splits into documents and each
//!    becomes a native [`Value`], resolving anchors and folding block
//!    scalars along the way.
//!
//! Errors are recoverable by default: under [`ErrorMode::Accumulate`] the
//! loader substitutes best-effort values and collects every problem in
//! [`Loaded::errors`]; under [`ErrorMode::FailFast`] the first problem aborts
//! the whole parse.
//!
//! ```
//! let loaded = yamlite::parse("name: app\nports:\n  - 80\n  - 443\n").unwrap();
//! let map = loaded.documents[0].value.as_mapping().unwrap();
//! assert_eq!(map["name"].as_str(), Some("app"));
//! assert_eq!(map["ports"].as_sequence().unwrap().len(), 2);
//! ```

pub mod assemble;
pub mod build;
pub mod classify;
pub mod compact;
pub mod dump;
pub mod error;
pub mod scalar;
pub mod value;

pub use build::Document;
pub use dump::{dump, dump_documents};
pub use error::{ErrorMode, LoadError, Result};
pub use value::{Date, Value};

use assemble::Assembler;
use error::ErrorSink;

/// Loading options.
#[derive(Debug, Clone)]
pub struct Options {
    /// How errors propagate.
    pub error_mode: ErrorMode,
    /// Interpret `YYYY-MM-DD` scalars as [`Date`] values.
    pub interpret_dates: bool,
    /// Record comments in [`Document::comments`].
    pub include_comments: bool,
    /// Record `%` directives in [`Document::directives`].
    pub include_directives: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Accumulate,
            interpret_dates: true,
            include_comments: true,
            include_directives: false,
        }
    }
}

/// The outcome of a load: every document in the input, plus the errors
/// accumulated while producing them.
#[derive(Debug)]
pub struct Loaded {
    pub documents: Vec<Document>,
    pub errors: Vec<LoadError>,
}

/// Parse a complete input with default options.
pub fn parse(input: &str) -> Result<Loaded> {
    parse_with_options(input, &Options::default())
}

/// Parse a complete input. Lines split on `\n`, with a trailing `\r`
/// stripped per line; blank lines are preserved for the assembler.
pub fn parse_with_options(input: &str, options: &Options) -> Result<Loaded> {
    parse_lines(
        input
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line)),
        options,
    )
}

/// Parse from any supplier of raw lines.
pub fn parse_lines<'a, I>(lines: I, options: &Options) -> Result<Loaded>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sink = ErrorSink::new(options.error_mode);
    let mut assembler = Assembler::new();
    for (number, line) in lines.into_iter().enumerate() {
        assembler.push_line(line, number + 1);
    }
    let (tree, root) = assembler.finish(&mut sink)?;
    let documents = build::build_documents(&tree, root, options, &mut sink)?;
    Ok(Loaded {
        documents,
        errors: sink.into_errors(),
    })
}
