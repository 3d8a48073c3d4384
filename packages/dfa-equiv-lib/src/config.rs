use serde::{Deserialize, Serialize};
use dfa_equiv_macros::config;

use crate::logger::LogLevel;

pub trait IntoOr<T> {
    fn into_or(self, or: T) -> T;
}

impl<T> IntoOr<Option<T>> for Option<T> {
    fn into_or(self, or: Option<T>) -> Option<T> {
        match self {
            Some(t) => Some(t),
            None => or,
        }
    }
}

impl<T> IntoOr<T> for Option<T> {
    fn into_or(self, or: T) -> T {
        self.unwrap_or(or)
    }
}

pub trait GeneralConfig {
    fn logger(&self) -> &LoggerConfig;
}

config! {
    pub struct LoggerConfig {
        enabled: bool = true,
        log_file: bool = false,
        log_level: LogLevel = LogLevel::Info,
    }
}

config! {
    pub struct EquivalenceConfig {
        timeout: Option<std::time::Duration> = None,
        max_product_states: Option<usize> = None,
    }
}

/// The kind of artifact the renderer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Only the Graphviz source is written.
    Dot,
    Png,
    Svg,
}

impl ImageFormat {
    /// File extension and `dot -T` argument of the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Dot => "dot",
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

config! {
    pub struct RenderConfig {
        output_dir: std::path::PathBuf = std::path::PathBuf::from("dfa_images"),
        format: ImageFormat = ImageFormat::Png,
        dot_binary: String = "dot".to_string(),
        highlight_witness: bool = true,
    }
}

config! {
    pub struct ServerConfig {
        host: String = "127.0.0.1".to_string(),
        port: u16 = 5000,
        // per-request bound, a smaller `equivalence.max_product_states` wins
        max_product_states: usize = 100_000,
        // number of `check-*` artifact directories kept on disk
        max_retained_checks: usize = 64,
    }
}

config! {
    pub struct DfaEquivConfig {
        equivalence: EquivalenceConfig (Option<PartialEquivalenceConfig> = EquivalenceConfig::default()),
        render: RenderConfig (Option<PartialRenderConfig> = RenderConfig::default()),
        server: ServerConfig (Option<PartialServerConfig> = ServerConfig::default()),
        logger: LoggerConfig (Option<PartialLoggerConfig> = LoggerConfig::default()),
    }
}

impl GeneralConfig for DfaEquivConfig {
    fn logger(&self) -> &LoggerConfig {
        &self.logger
    }
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = DfaEquivConfig::from_toml_str("").unwrap();
    assert_eq!(config, DfaEquivConfig::default());
    assert_eq!(config.get_server().get_port(), &5000);
    assert_eq!(config.get_render().get_format(), &ImageFormat::Png);
    assert!(config.get_equivalence().get_max_product_states().is_none());
    assert_eq!(config.get_server().get_max_product_states(), &100_000);
    assert_eq!(config.get_server().get_max_retained_checks(), &64);
}

#[test]
fn test_partial_config() {
    let config = DfaEquivConfig::from_toml_str(
        r#"
        [equivalence]
        max_product_states = 64

        [render]
        format = "Svg"
        output_dir = "out/images"

        [logger]
        log_level = "Debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.get_equivalence().get_max_product_states(), &Some(64));
    assert!(config.get_equivalence().get_timeout().is_none());
    assert_eq!(config.get_render().get_format(), &ImageFormat::Svg);
    assert_eq!(
        config.get_render().get_output_dir(),
        &std::path::PathBuf::from("out/images")
    );
    assert_eq!(config.get_render().get_dot_binary(), "dot");
    assert_eq!(config.logger().get_log_level(), &LogLevel::Debug);
    assert!(*config.logger().get_enabled());
}

#[test]
fn test_unknown_config_key_is_rejected() {
    assert!(DfaEquivConfig::from_toml_str("[render]\ncolour = \"red\"\n").is_err());
}
