// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings the installer reads from package
//! metadata. Every package may carry an `extra` object, and everything the
//! installer cares about sits below its `oxideshop` key. Where that metadata
//! comes from is left to the caller to figure out.
//!
//! # Root Settings
//!
//! The project's root package may point the installer at a custom shop source
//! directory:
//!
//! ```json
//! { "oxideshop": { "source-path": "$HOME/shop/source" } }
//! ```
//!
//! # Package Settings
//!
//! Each shop package may tune how it gets installed:
//!
//! ```json
//! {
//!     "oxideshop": {
//!         "blacklist-filter": ["documentation/**/*", "*.md"],
//!         "source-directory": "src",
//!         "target-directory": "flow",
//!         "assets-directory": "out"
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Key of `extra` that holds all installer settings.
pub const EXTRA_ROOT_KEY: &str = "oxideshop";

/// Root package settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginSettings {
    /// Path to shop source directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl PluginSettings {
    /// Extract settings from `extra` object of root package.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Deserialize`] if settings are malformed.
    /// - Return [`ConfigError::ShellExpansion`] if source path cannot be
    ///   expanded.
    pub fn from_extra(extra: &Value) -> Result<Self> {
        let mut settings: PluginSettings = from_extra_key(extra)?;

        // INVARIANT: Perform shell expansion on source path field.
        if let Some(path) = settings.source_path.take() {
            settings.source_path = Some(PathBuf::from(
                shellexpand::full(path.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(settings)
    }
}

impl FromStr for PluginSettings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::from_extra(&serde_json::from_str(data)?)
    }
}

/// Per-package installation settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageExtra {
    /// Glob expressions of package files that must not be copied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist_filter: Option<Vec<String>>,

    /// Directory inside package to copy from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<String>,

    /// Name of directory to install package into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<String>,

    /// Directory inside package that holds its public assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_directory: Option<String>,
}

impl PackageExtra {
    /// Extract settings from `extra` object of a package.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Deserialize`] if settings are malformed, e.g.,
    ///   blacklist filter is not a list of strings.
    pub fn from_extra(extra: &Value) -> Result<Self> {
        from_extra_key(extra)
    }

    /// Blacklist filter of package, empty if none was given.
    pub fn blacklist_filter(&self) -> &[String] {
        self.blacklist_filter.as_deref().unwrap_or_default()
    }
}

impl FromStr for PackageExtra {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::from_extra(&serde_json::from_str(data)?)
    }
}

impl Display for PackageExtra {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let mut extra = serde_json::Map::new();
        extra.insert(
            EXTRA_ROOT_KEY.into(),
            serde_json::to_value(self).map_err(ConfigError::Deserialize)?,
        );

        fmt.write_str(
            serde_json::to_string_pretty(&extra)
                .map_err(ConfigError::Deserialize)?
                .as_str(),
        )
    }
}

fn from_extra_key<T>(extra: &Value) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match extra.get(EXTRA_ROOT_KEY) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(settings) => Ok(T::deserialize(settings)?),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to (de)serialize configuration.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn deserialize_package_extra() -> anyhow::Result<()> {
        let result: PackageExtra = r#"
            {
                "branch-alias": { "dev-main": "1.0.x-dev" },
                "oxideshop": {
                    "blacklist-filter": ["documentation/**/*", "*.md"],
                    "source-directory": "src",
                    "target-directory": "flow",
                    "assets-directory": "public"
                }
            }
        "#
        .parse()?;

        let expect = PackageExtra {
            blacklist_filter: Some(vec!["documentation/**/*".into(), "*.md".into()]),
            source_directory: Some("src".into()),
            target_directory: Some("flow".into()),
            assets_directory: Some("public".into()),
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn missing_installer_key_yields_defaults() -> anyhow::Result<()> {
        assert_eq!("{}".parse::<PackageExtra>()?, PackageExtra::default());
        assert_eq!(
            r#"{ "oxideshop": null }"#.parse::<PackageExtra>()?,
            PackageExtra::default()
        );
        assert_eq!(PackageExtra::default().blacklist_filter(), &[] as &[String]);

        Ok(())
    }

    #[test]
    fn non_list_blacklist_filter_is_rejected() {
        let result = r#"{ "oxideshop": { "blacklist-filter": "*.md" } }"#.parse::<PackageExtra>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn serialize_package_extra() {
        let result = PackageExtra {
            blacklist_filter: Some(vec!["*.md".into()]),
            source_directory: None,
            target_directory: Some("flow".into()),
            assets_directory: None,
        }
        .to_string();

        let expect = indoc! {r#"
            {
              "oxideshop": {
                "blacklist-filter": [
                  "*.md"
                ],
                "target-directory": "flow"
              }
            }"#};

        assert_eq!(result, expect);
    }

    #[sealed_test(env = [("SHOP_ROOT", "/var/www/shop")])]
    fn deserialize_plugin_settings() -> anyhow::Result<()> {
        let result: PluginSettings = r#"
            { "oxideshop": { "source-path": "$SHOP_ROOT/source" } }
        "#
        .parse()?;

        let expect = PluginSettings {
            source_path: Some(PathBuf::from("/var/www/shop/source")),
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn plugin_settings_default_to_no_source_path() -> anyhow::Result<()> {
        assert_eq!("{}".parse::<PluginSettings>()?, PluginSettings::default());

        Ok(())
    }
}
