// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Component package installation.
//!
//! Components carry no files the shop needs copied. They only need their
//! service definitions imported into the shop's project configuration.

use crate::installer::{Installation, Result};

use std::path::Path;
use tracing::{info, instrument};

/// Installer for `oxideshop-component` packages.
pub struct ComponentInstaller<'a> {
    installation: Installation<'a>,
}

impl<'a> ComponentInstaller<'a> {
    pub fn new(installation: Installation<'a>) -> Self {
        Self { installation }
    }

    /// Components are never reported as installed, so every install event
    /// refreshes their imports.
    pub fn is_installed(&self) -> bool {
        false
    }

    /// Register service import of component.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Framework`] if the shop
    ///   framework fails.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn install(&self, package_path: &Path) -> Result<()> {
        info!("installing component {}", self.installation.package().name());
        self.register(package_path)
    }

    /// Register service import of component again.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Framework`] if the shop
    ///   framework fails.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn update(&self, package_path: &Path) -> Result<()> {
        info!("updating component {}", self.installation.package().name());
        self.register(package_path)
    }

    /// Drop service import of component.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Framework`] if the shop
    ///   framework fails.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn uninstall(&self, package_path: &Path) -> Result<()> {
        info!("uninstalling component {}", self.installation.package().name());
        self.installation.framework.remove_import(package_path)?;

        Ok(())
    }

    fn register(&self, package_path: &Path) -> Result<()> {
        let framework = self.installation.framework;
        framework.remove_non_existing_imports()?;
        framework.add_import(package_path)?;

        Ok(())
    }
}
