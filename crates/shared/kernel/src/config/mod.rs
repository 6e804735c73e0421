use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use stride_domain::config::StrideConfig;
use tracing::{debug, info};

/// Default config file stem looked up in the working directory (`stride.toml`, `stride.json`, ...).
pub const DEFAULT_CONFIG_STEM: &str = "stride";
/// Prefix for environment overrides, e.g. `STRIDE__RETRY__MAX_RETRIES=5`.
pub const ENV_PREFIX: &str = "STRIDE";

/// Custom error type for config loading.
#[stride_derive::stride_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layers, lowest precedence first:
/// 1. **Base File**: the given path (must exist), or the optional `stride.*` file in the
///    working directory when no path is provided.
/// 2. **Environment Overrides**: variables prefixed with `STRIDE__`, nested with double
///    underscores (`STRIDE__JOURNAL__CAPACITY` maps to `journal.capacity`).
///
/// Missing keys fall back to the `Default` of `T` as long as `T` uses `#[serde(default)]`.
///
/// # Errors
/// This function will return an error if:
/// * An explicitly provided configuration file cannot be found or parsed.
/// * The merged values do not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use stride_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path: Option<&Path> = path.as_ref().map(AsRef::as_ref);
    let file = match path {
        Some(p) => {
            info!(path = %p.display(), "Loading config file");
            File::from(p).required(true)
        },
        None => {
            debug!(stem = DEFAULT_CONFIG_STEM, "No config path given, probing optional default");
            File::with_name(DEFAULT_CONFIG_STEM).required(false)
        },
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads the toolkit-wide [`StrideConfig`].
///
/// # Errors
/// See [`load_config`].
pub fn load_stride_config(path: Option<impl AsRef<Path>>) -> Result<StrideConfig, ConfigError> {
    load_config::<StrideConfig>(path)
}
