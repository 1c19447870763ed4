//! Format parsers producing [`ConfigTree`](crate::tree::ConfigTree)s

mod json;
mod toml;
mod yaml;

pub use self::json::JsonParser;
pub use self::toml::TomlParser;
pub use self::yaml::YamlParser;
