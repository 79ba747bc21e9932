// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme package installation.
//!
//! A theme is split in two on installation. Templates and the theme metadata
//! file go below `Application/views/<theme>`, while public assets go below
//! `out/<theme>`. The assets directory of the package is excluded from the
//! first copy, and copied separately in the second.

use crate::{
    copy::{combine_filters, copy_filtered},
    installer::{vcs_filter, Installation, Result, BLACKLIST_ALL_FILES},
    path::normalize_separators,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File whose presence marks a theme as installed.
pub const THEME_METADATA_FILE: &str = "theme.php";

/// Directory below shop source that holds all themes.
pub const PATH_TO_THEMES: &str = "Application/views";

/// Directory below shop source that holds public theme assets.
pub const PUBLIC_ASSETS_DIRECTORY: &str = "out";

/// Assets directory inside a theme package if none is configured.
pub const DEFAULT_ASSETS_DIRECTORY: &str = "out";

/// Installer for `oxideshop-theme` packages.
pub struct ThemeInstaller<'a> {
    installation: Installation<'a>,
}

impl<'a> ThemeInstaller<'a> {
    pub fn new(installation: Installation<'a>) -> Self {
        Self { installation }
    }

    /// Name of theme directory.
    ///
    /// Configured target directory wins over the name part of the package
    /// name, e.g., `flow` for `vendor/flow`.
    pub fn theme_directory(&self) -> &'a str {
        let package = self.installation.package();
        match package.extra().target_directory.as_deref() {
            Some(target) => target,
            None => package
                .name()
                .split('/')
                .nth(1)
                .unwrap_or(package.name()),
        }
    }

    /// Assets directory inside package.
    pub fn assets_directory(&self) -> &'a str {
        self.installation
            .package()
            .extra()
            .assets_directory
            .as_deref()
            .unwrap_or(DEFAULT_ASSETS_DIRECTORY)
    }

    /// Theme directory inside shop source.
    pub fn target_path(&self) -> PathBuf {
        self.installation
            .shop_source()
            .join(PATH_TO_THEMES)
            .join(self.theme_directory())
    }

    /// Public assets directory of theme inside shop source.
    pub fn assets_target_path(&self) -> PathBuf {
        self.installation
            .shop_source()
            .join(PUBLIC_ASSETS_DIRECTORY)
            .join(self.theme_directory())
    }

    /// Theme counts as installed once its metadata file exists.
    pub fn is_installed(&self) -> bool {
        self.target_path().join(THEME_METADATA_FILE).exists()
    }

    /// Copy theme files into shop.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Copy`] if files cannot be
    ///   copied.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn install(&self, package_path: &Path) -> Result<()> {
        let name = self.installation.package().name();
        info!("installing theme package {name}");
        self.copy_package(package_path)?;
        info!("theme package {name} installed");

        Ok(())
    }

    /// Copy theme files into shop, asking first if theme already is installed.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Copy`] if files cannot be
    ///   copied.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn update(&self, package_path: &Path) -> Result<()> {
        let name = self.installation.package().name();
        info!("updating theme package {name}");

        let question = format!(
            "All files in the following directories will be overwritten:\n- {}\n- {}\nDo you want to overwrite them? (y/N) ",
            self.target_path().display(),
            self.installation
                .shop_source()
                .join(self.assets_directory())
                .display(),
        );
        if self
            .installation
            .ask_if_installed(self.is_installed(), &question)
        {
            self.copy_package(package_path)?;
            info!("theme package {name} updated");
        } else {
            info!("theme package {name} skipped");
        }

        Ok(())
    }

    /// Themes are left in place on uninstall.
    pub fn uninstall(&self, _package_path: &Path) -> Result<()> {
        debug!(
            "nothing to uninstall for theme package {}",
            self.installation.package().name()
        );

        Ok(())
    }

    fn copy_package(&self, package_path: &Path) -> Result<()> {
        let assets_filter = format!(
            "{}/{BLACKLIST_ALL_FILES}",
            normalize_separators(self.assets_directory()).trim_end_matches('/')
        );

        copy_filtered(
            package_path,
            self.target_path(),
            combine_filters([
                vec![assets_filter],
                self.installation.blacklist(),
                vcs_filter(),
            ]),
        )?;

        self.install_assets(package_path)
    }

    fn install_assets(&self, package_path: &Path) -> Result<()> {
        let source = package_path.join(self.assets_directory());
        if !source.exists() {
            debug!("theme has no assets at {:?}", source.display());
            return Ok(());
        }

        copy_filtered(
            &source,
            self.assets_target_path(),
            self.installation.blacklist(),
        )?;

        Ok(())
    }
}
