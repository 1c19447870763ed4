//! Configuration content handling for envdiff
//!
//! Turns raw configuration text into immutable [`ConfigTree`]s, flattens trees
//! into canonical path-keyed [`FlatField`]s and normalizes leaf values so that
//! equivalent spellings compare equal.

pub mod error;
pub mod flatten;
pub mod format;
pub mod normalize;
pub mod parsers;
pub mod path;
pub mod tree;

pub use error::{Error, Result, StructuralError};
pub use flatten::{FlatField, MAX_DEPTH, flatten, flatten_partial};
pub use format::{AutoParser, ConfigParser, Format};
pub use normalize::{NormalizedValue, normalize};
pub use parsers::{JsonParser, TomlParser, YamlParser};
pub use path::{PathSegment, parse_path, render_path, trailing_key};
pub use tree::{ConfigTree, Node, NodeId, ScalarType, ScalarValue, TreeBuilder};
