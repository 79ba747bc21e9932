// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Module package installation.
//!
//! Modules are owned by the shop framework. It knows how to copy module files
//! and how to register module configuration, so this installer only decides
//! _when_ to call into it.

use crate::installer::{Installation, Result};

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Directory below shop source that holds all modules.
pub const MODULES_DIRECTORY: &str = "modules";

/// Module package as handed to the shop framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePackage {
    /// Full package name.
    pub name: String,

    /// Directory the package was placed in.
    pub package_path: PathBuf,

    pub blacklist_filter: Vec<String>,

    /// Directory inside package to install from, empty for package root.
    pub source_directory: String,

    /// Directory below `modules/` to install into.
    pub target_directory: String,
}

impl ModulePackage {
    fn from_installation(installation: &Installation<'_>, package_path: &Path) -> Self {
        let package = installation.package();
        let extra = package.extra();
        Self {
            name: package.name().into(),
            package_path: package_path.into(),
            blacklist_filter: extra.blacklist_filter().to_vec(),
            source_directory: extra.source_directory.clone().unwrap_or_default(),
            target_directory: extra
                .target_directory
                .clone()
                .unwrap_or_else(|| package.name().into()),
        }
    }
}

/// Installer for `oxideshop-module` packages.
pub struct ModuleInstaller<'a> {
    installation: Installation<'a>,
}

impl<'a> ModuleInstaller<'a> {
    pub fn new(installation: Installation<'a>) -> Self {
        Self { installation }
    }

    /// Module directory inside shop source.
    pub fn target_path(&self) -> PathBuf {
        let package = self.installation.package();
        let target = package
            .extra()
            .target_directory
            .as_deref()
            .unwrap_or(package.name());

        self.installation
            .shop_source()
            .join(MODULES_DIRECTORY)
            .join(target)
    }

    /// Module counts as installed once its directory exists.
    pub fn is_installed(&self) -> bool {
        self.target_path().exists()
    }

    /// Install module through shop framework.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Framework`] if the shop
    ///   framework fails.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn install(&self, package_path: &Path) -> Result<()> {
        let module = ModulePackage::from_installation(&self.installation, package_path);
        info!("installing module package {}", module.name);
        self.installation.framework.install_module(&module)?;

        Ok(())
    }

    /// Update module, asking first if module files would be overwritten.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Framework`] if the shop
    ///   framework fails.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn update(&self, package_path: &Path) -> Result<()> {
        let module = ModulePackage::from_installation(&self.installation, package_path);
        info!("updating module package {}", module.name);

        let framework = self.installation.framework;
        if !framework.module_files_installed(&module) {
            framework.install_module(&module)?;
            return Ok(());
        }

        let question = format!(
            "Update operation will overwrite {} files in the directory source/{}/{}. Do you want to overwrite them?",
            module.name, MODULES_DIRECTORY, module.target_directory
        );
        if self.installation.confirm.confirm(&question) {
            info!("overwriting files of module package {}", module.name);
            framework.install_module(&module)?;
        } else {
            info!("files of module package {} left untouched", module.name);
        }

        Ok(())
    }

    /// Uninstall module through shop framework.
    ///
    /// # Errors
    ///
    /// - Return [`crate::installer::InstallerError::Framework`] if the shop
    ///   framework fails.
    #[instrument(skip(self, package_path), level = "debug")]
    pub fn uninstall(&self, package_path: &Path) -> Result<()> {
        let module = ModulePackage::from_installation(&self.installation, package_path);
        let framework = self.installation.framework;
        info!("uninstalling module package {}", module.name);
        framework.uninstall_module(&module, framework.is_launched())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PackageExtra,
        installer::{AssumeNo, AssumeYes, Confirm, FrameworkResult, Package, ShopFramework},
    };
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct ModuleFramework {
        files_installed: bool,
        installed: RefCell<Vec<ModulePackage>>,
    }

    impl ShopFramework for ModuleFramework {
        fn is_launched(&self) -> bool {
            true
        }

        fn is_project_configuration_empty(&self) -> bool {
            false
        }

        fn generate_project_configuration(&self, _launched: bool) -> FrameworkResult<()> {
            Ok(())
        }

        fn remove_non_existing_imports(&self) -> FrameworkResult<()> {
            Ok(())
        }

        fn add_import(&self, _path: &Path) -> FrameworkResult<()> {
            Ok(())
        }

        fn remove_import(&self, _path: &Path) -> FrameworkResult<()> {
            Ok(())
        }

        fn module_files_installed(&self, _module: &ModulePackage) -> bool {
            self.files_installed
        }

        fn install_module(&self, module: &ModulePackage) -> FrameworkResult<()> {
            self.installed.borrow_mut().push(module.clone());
            Ok(())
        }

        fn uninstall_module(&self, _module: &ModulePackage, _launched: bool) -> FrameworkResult<()> {
            Ok(())
        }
    }

    fn package() -> Package {
        Package::new("vendor/flow-module", "oxideshop-module", "/vendor/flow-module").with_extra(
            PackageExtra {
                blacklist_filter: Some(vec!["docs/**/*".into()]),
                target_directory: Some("flow/module".into()),
                ..Default::default()
            },
        )
    }

    fn update_with(files_installed: bool, confirm: &dyn Confirm) -> usize {
        let framework = ModuleFramework {
            files_installed,
            ..Default::default()
        };
        let package = package();
        let installer = ModuleInstaller::new(Installation::new(
            Path::new("/shop/source"),
            &package,
            confirm,
            &framework,
        ));
        installer.update(package.install_path()).unwrap();
        let count = framework.installed.borrow().len();
        count
    }

    #[test]
    fn module_package_carries_package_settings() {
        let framework = ModuleFramework::default();
        let package = package();
        let installer = ModuleInstaller::new(Installation::new(
            Path::new("/shop/source"),
            &package,
            &AssumeNo,
            &framework,
        ));
        installer.install(package.install_path()).unwrap();

        let expect = ModulePackage {
            name: "vendor/flow-module".into(),
            package_path: PathBuf::from("/vendor/flow-module"),
            blacklist_filter: vec!["docs/**/*".into()],
            source_directory: String::new(),
            target_directory: "flow/module".into(),
        };
        assert_eq!(framework.installed.borrow().as_slice(), &[expect]);
        assert_eq!(
            installer.target_path(),
            PathBuf::from("/shop/source/modules/flow/module")
        );
    }

    #[test]
    fn target_defaults_to_package_name() {
        let framework = ModuleFramework::default();
        let package = Package::new("vendor/module", "oxideshop-module", "/vendor/module");
        let installer = ModuleInstaller::new(Installation::new(
            Path::new("/shop/source"),
            &package,
            &AssumeNo,
            &framework,
        ));
        assert_eq!(
            installer.target_path(),
            PathBuf::from("/shop/source/modules/vendor/module")
        );
        assert!(!installer.is_installed());
    }

    #[test]
    fn update_installs_without_asking_if_files_are_missing() {
        assert_eq!(update_with(false, &AssumeNo), 1);
    }

    #[test]
    fn update_overwrites_only_when_confirmed() {
        assert_eq!(update_with(true, &AssumeNo), 0);
        assert_eq!(update_with(true, &AssumeYes), 1);
    }
}
