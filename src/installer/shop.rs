// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shop package installation.
//!
//! The shop package itself is copied into the shop source directory, minus
//! everything it blacklists. A handful of files need more care though:
//!
//! - `config.inc.php` is created from `config.inc.php.dist` only if there is
//!   no configuration yet.
//! - `Setup/` files are only copied while the shop still needs to be set up,
//!   i.e., while configuration is missing or still holds placeholders.
//! - `.htaccess` and `robots.txt` files are only copied if absent, because
//!   shop owners tend to customize them.

use crate::{
    copy::{
        combine_filters, copy_file, copy_filtered, glob::GlobList, walk::FilteredWalk, CopyError,
    },
    installer::{vcs_filter, Installation, Result},
    path::SHOP_SOURCE_DIRECTORY,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File whose presence marks the shop as installed.
pub const SHOP_ENTRY_FILE: &str = "index.php";

pub const SHOP_CONFIG_FILE: &str = "config.inc.php";
pub const SHOP_CONFIG_DIST_FILE: &str = "config.inc.php.dist";

/// Files only copied if absent.
pub const HTACCESS_FILTER: &str = "**/.htaccess";
pub const ROBOTS_EXCLUSION_FILTER: &str = "**/robots.txt";

/// Files only copied while shop needs to be set up.
pub const SETUP_FILES_FILTER: &str = "Setup/**/*";

/// Placeholders of a shop configuration that was never filled in.
pub const CONFIG_PLACEHOLDERS: [&str; 7] = [
    "<dbHost>",
    "<dbName>",
    "<dbUser>",
    "<dbPwd>",
    "<sShopURL>",
    "<sShopDir>",
    "<sCompileDir>",
];

/// Installer for `oxideshop` packages.
pub struct ShopInstaller<'a> {
    installation: Installation<'a>,
}

impl<'a> ShopInstaller<'a> {
    pub fn new(installation: Installation<'a>) -> Self {
        Self { installation }
    }

    /// Shop counts as installed once its entry point exists.
    pub fn is_installed(&self) -> bool {
        self.installation
            .shop_source()
            .join(SHOP_ENTRY_FILE)
            .exists()
    }

    /// Directory inside package to copy from.
    pub fn source_path(&self, package_path: &Path) -> PathBuf {
        let source = self
            .installation
            .package()
            .extra()
            .source_directory
            .as_deref()
            .unwrap_or(SHOP_SOURCE_DIRECTORY);

        package_path.join(source)
    }

    /// Copy shop files into shop source directory.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Copy`] if files cannot be
    ///   copied or configuration cannot be read.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn install(&self, package_path: &Path) -> Result<()> {
        let name = self.installation.package().name();
        info!("installing shop package {name}");
        self.copy_package(package_path)?;
        info!("shop package {name} installed");

        Ok(())
    }

    /// Copy shop files into shop source, asking first if shop already is
    /// installed.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Copy`] if files cannot be
    ///   copied or configuration cannot be read.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn update(&self, package_path: &Path) -> Result<()> {
        let name = self.installation.package().name();
        info!("updating shop package {name}");

        let question = format!(
            "All files in the following directories will be overwritten:\n- {}\nDo you want to overwrite them? (y/N) ",
            self.installation.shop_source().display()
        );
        if self
            .installation
            .ask_if_installed(self.is_installed(), &question)
        {
            self.copy_package(package_path)?;
            info!("shop package {name} updated");
        } else {
            info!("shop package {name} skipped");
        }

        Ok(())
    }

    /// Shop files are left in place on uninstall.
    pub fn uninstall(&self, _package_path: &Path) -> Result<()> {
        debug!(
            "nothing to uninstall for shop package {}",
            self.installation.package().name()
        );

        Ok(())
    }

    /// Check if shop configuration exists and has been filled in.
    ///
    /// # Errors
    ///
    /// - Return [`CopyError::ReadFile`] if configuration cannot be read.
    pub fn is_configured(&self) -> Result<bool> {
        let path = self.installation.shop_source().join(SHOP_CONFIG_FILE);
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path).map_err(|err| CopyError::ReadFile {
            source: err,
            path: path.clone(),
        })?;

        Ok(!CONFIG_PLACEHOLDERS
            .iter()
            .any(|placeholder| contents.contains(placeholder)))
    }

    fn copy_package(&self, package_path: &Path) -> Result<()> {
        let source = self.source_path(package_path);
        let target = self.installation.shop_source();

        // INVARIANT: Decide on setup before the copy brings in a fresh config.
        let needs_setup = !self.is_configured()?;

        copy_filtered(
            &source,
            target,
            combine_filters([
                self.installation.blacklist(),
                vcs_filter(),
                vec![
                    HTACCESS_FILTER.into(),
                    ROBOTS_EXCLUSION_FILTER.into(),
                    SETUP_FILES_FILTER.into(),
                ],
            ]),
        )?;

        self.copy_config_dist(target)?;
        self.copy_selected(&source, &[HTACCESS_FILTER, ROBOTS_EXCLUSION_FILTER], false)?;

        if needs_setup {
            info!("shop is not configured yet, copying setup files");
            self.copy_selected(&source, &[SETUP_FILES_FILTER], true)?;
        }

        Ok(())
    }

    fn copy_config_dist(&self, target: &Path) -> Result<()> {
        let config = target.join(SHOP_CONFIG_FILE);
        let dist = target.join(SHOP_CONFIG_DIST_FILE);
        if !config.exists() && dist.exists() {
            debug!("create {SHOP_CONFIG_FILE} from {SHOP_CONFIG_DIST_FILE}");
            copy_file(dist, config)?;
        }

        Ok(())
    }

    /// Copy files matching `selection`, still honouring the blacklist.
    fn copy_selected(&self, source: &Path, selection: &[&str], overwrite: bool) -> Result<()> {
        let blacklist = GlobList::new(combine_filters([
            self.installation.blacklist(),
            vcs_filter(),
        ]))?;
        let selection = GlobList::new(selection.iter().copied())?;

        for entry in FilteredWalk::blacklisted(source, blacklist) {
            let entry = entry.map_err(CopyError::from)?;
            if entry.is_dir() || !selection.is_match_any(entry.relative()) {
                continue;
            }

            let destination = self.installation.shop_source().join(entry.relative_path());
            if !overwrite && destination.exists() {
                debug!("keep existing {:?}", destination.display());
                continue;
            }

            copy_file(entry.path(), &destination)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        installer::{AssumeNo, DetachedFramework, Package},
        nest::nest,
    };

    fn with_config<T>(contents: Option<&str>, check: impl FnOnce(&ShopInstaller<'_>) -> T) -> T {
        let dir = tempfile::tempdir().unwrap();
        if let Some(contents) = contents {
            nest([(SHOP_CONFIG_FILE, contents)])
                .materialize(dir.path())
                .unwrap();
        }
        let package = Package::new("oxid-esales/oxideshop-ce", "oxideshop", "/vendor/shop");
        let installer = ShopInstaller::new(Installation::new(
            dir.path(),
            &package,
            &AssumeNo,
            &DetachedFramework,
        ));

        check(&installer)
    }

    #[test]
    fn missing_config_is_not_configured() {
        assert!(!with_config(None, |installer| installer.is_configured().unwrap()));
    }

    #[test]
    fn placeholder_config_is_not_configured() {
        let config = "$this->dbHost = '<dbHost>';\n$this->dbName = 'shop';";
        assert!(!with_config(Some(config), |installer| installer
            .is_configured()
            .unwrap()));
    }

    #[test]
    fn filled_in_config_is_configured() {
        let config = "$this->dbHost = 'localhost';\n$this->dbName = 'shop';";
        assert!(with_config(Some(config), |installer| installer
            .is_configured()
            .unwrap()));
    }

    #[test]
    fn source_defaults_to_source_directory_of_package() {
        with_config(None, |installer| {
            assert_eq!(
                installer.source_path(Path::new("/vendor/shop")),
                PathBuf::from("/vendor/shop/source")
            );
            assert!(!installer.is_installed());
        });
    }
}
