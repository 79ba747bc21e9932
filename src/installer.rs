// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shop package installation.
//!
//! The installer never runs on its own. A host package manager resolves and
//! downloads packages, then calls into the installer at certain points of its
//! lifecycle: after an install, after an update, and right before a package
//! gets removed. The installer then makes sure that every shop package ends
//! up where the shop expects it.
//!
//! # Package Types
//!
//! Only four package types are handled, everything else is left alone:
//!
//! | Type                  | Variant     | Installation                         |
//! |-----------------------|-------------|--------------------------------------|
//! | `oxideshop`           | Shop        | Filtered copy into shop source       |
//! | `oxideshop-module`    | Module      | Delegated to shop framework          |
//! | `oxideshop-theme`     | Theme       | Filtered copy of theme and assets    |
//! | `oxideshop-component` | Component   | Service import registration          |
//!
//! # Collaborators
//!
//! Much of the actual work is owned by the shop framework, e.g., module
//! installation and service import registration. The installer reaches the
//! framework through the [`ShopFramework`] trait, and asks the user for
//! confirmation through the [`Confirm`] trait. Both are handed in explicitly.

pub mod component;
pub mod module;
pub mod shop;
pub mod theme;

use crate::{
    config::{ConfigError, PackageExtra, PluginSettings},
    copy::{glob::GlobError, CopyError},
    installer::{
        component::ComponentInstaller, module::ModuleInstaller, module::ModulePackage,
        shop::ShopInstaller, theme::ThemeInstaller,
    },
    path::{default_shop_source_dir, NoWorkingDirectory},
};

use serde_json::Value;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, instrument, warn};

/// Glob expression that matches every file below a directory.
pub const BLACKLIST_ALL_FILES: &str = "**/*";

/// Version control metadata that is never copied.
pub const VCS_FILTER: [&str; 10] = [
    ".git",
    ".git/**",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".svn",
    ".svn/**",
    ".hg",
    ".hg/**",
    ".hgignore",
];

/// Version control filter as owned list.
pub fn vcs_filter() -> Vec<String> {
    VCS_FILTER.iter().map(ToString::to_string).collect()
}

/// Supported package types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    Shop,
    Module,
    Theme,
    Component,
}

impl PackageKind {
    /// Package type string used in package metadata.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shop => "oxideshop",
            Self::Module => "oxideshop-module",
            Self::Theme => "oxideshop-theme",
            Self::Component => "oxideshop-component",
        }
    }

    /// Human readable description for log output.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Shop => "shop package",
            Self::Module => "module package",
            Self::Theme => "theme package",
            Self::Component => "component",
        }
    }
}

impl FromStr for PackageKind {
    type Err = InstallerError;

    fn from_str(package_type: &str) -> Result<Self, Self::Err> {
        match package_type {
            "oxideshop" => Ok(Self::Shop),
            "oxideshop-module" => Ok(Self::Module),
            "oxideshop-theme" => Ok(Self::Theme),
            "oxideshop-component" => Ok(Self::Component),
            _ => Err(InstallerError::UnsupportedType {
                package_type: package_type.into(),
            }),
        }
    }
}

impl Display for PackageKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Package handed over by the host package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    package_type: String,
    install_path: PathBuf,
    extra: PackageExtra,
}

impl Package {
    /// Construct new package with default settings.
    pub fn new(
        name: impl Into<String>,
        package_type: impl Into<String>,
        install_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            package_type: package_type.into(),
            install_path: install_path.into(),
            extra: PackageExtra::default(),
        }
    }

    /// Attach installer settings to package.
    pub fn with_extra(mut self, extra: PackageExtra) -> Self {
        self.extra = extra;
        self
    }

    /// Attach installer settings from raw `extra` object of package.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError::Config`] if settings are malformed.
    pub fn with_raw_extra(self, extra: &Value) -> Result<Self> {
        Ok(self.with_extra(PackageExtra::from_extra(extra)?))
    }

    /// Full package name, e.g., `vendor/package`.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn package_type(&self) -> &str {
        self.package_type.as_str()
    }

    /// Directory the host placed the package in.
    pub fn install_path(&self) -> &Path {
        self.install_path.as_path()
    }

    pub fn extra(&self) -> &PackageExtra {
        &self.extra
    }
}

/// Ask user a yes or no question.
pub trait Confirm {
    /// Return true if user agreed.
    fn confirm(&self, question: &str) -> bool;
}

/// Interactive confirmation on the terminal.
///
/// Defaults to "no" when the user just hits enter, or if no answer can be
/// obtained at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireConfirm;

impl Confirm for InquireConfirm {
    fn confirm(&self, question: &str) -> bool {
        match inquire::Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(error) => {
                warn!("cannot obtain answer, assuming no: {error}");
                false
            }
        }
    }
}

/// Non-interactive confirmation that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, question: &str) -> bool {
        debug!("assume no: {question}");
        false
    }
}

/// Non-interactive confirmation that always agrees.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, question: &str) -> bool {
        debug!("assume yes: {question}");
        true
    }
}

/// Services of the shop framework the installer depends on.
pub trait ShopFramework {
    /// Check if shop has been launched, i.e., is configured and running.
    fn is_launched(&self) -> bool;

    /// Check if project configuration has not been generated yet.
    fn is_project_configuration_empty(&self) -> bool;

    /// Generate default project configuration.
    fn generate_project_configuration(&self, launched: bool) -> FrameworkResult<()>;

    /// Drop service imports whose files no longer exist.
    fn remove_non_existing_imports(&self) -> FrameworkResult<()>;

    /// Register service import of package at path.
    fn add_import(&self, path: &Path) -> FrameworkResult<()>;

    /// Unregister service import of package at path.
    fn remove_import(&self, path: &Path) -> FrameworkResult<()>;

    /// Check if files of module have already been installed.
    fn module_files_installed(&self, module: &ModulePackage) -> bool;

    /// Install module files and configuration.
    fn install_module(&self, module: &ModulePackage) -> FrameworkResult<()>;

    /// Uninstall module files and configuration.
    fn uninstall_module(&self, module: &ModulePackage, launched: bool) -> FrameworkResult<()>;
}

/// Stand-in for a shop framework that is not attached.
///
/// Reports a shop that was never launched, and only logs the calls it
/// cannot honour.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedFramework;

impl ShopFramework for DetachedFramework {
    fn is_launched(&self) -> bool {
        false
    }

    fn is_project_configuration_empty(&self) -> bool {
        false
    }

    fn generate_project_configuration(&self, _launched: bool) -> FrameworkResult<()> {
        warn!("no shop framework attached, project configuration not generated");
        Ok(())
    }

    fn remove_non_existing_imports(&self) -> FrameworkResult<()> {
        warn!("no shop framework attached, stale imports not removed");
        Ok(())
    }

    fn add_import(&self, path: &Path) -> FrameworkResult<()> {
        warn!("no shop framework attached, import {:?} not added", path.display());
        Ok(())
    }

    fn remove_import(&self, path: &Path) -> FrameworkResult<()> {
        warn!("no shop framework attached, import {:?} not removed", path.display());
        Ok(())
    }

    fn module_files_installed(&self, _module: &ModulePackage) -> bool {
        false
    }

    fn install_module(&self, module: &ModulePackage) -> FrameworkResult<()> {
        Err(FrameworkError::new(format!(
            "cannot install module {} without shop framework",
            module.name
        )))
    }

    fn uninstall_module(&self, module: &ModulePackage, _launched: bool) -> FrameworkResult<()> {
        Err(FrameworkError::new(format!(
            "cannot uninstall module {} without shop framework",
            module.name
        )))
    }
}

/// Everything a package installer needs to do its job.
#[derive(Clone, Copy)]
pub struct Installation<'a> {
    pub(crate) shop_source: &'a Path,
    pub(crate) package: &'a Package,
    pub(crate) confirm: &'a dyn Confirm,
    pub(crate) framework: &'a dyn ShopFramework,
}

impl<'a> Installation<'a> {
    pub fn new(
        shop_source: &'a Path,
        package: &'a Package,
        confirm: &'a dyn Confirm,
        framework: &'a dyn ShopFramework,
    ) -> Self {
        Self {
            shop_source,
            package,
            confirm,
            framework,
        }
    }

    /// Root of shop source directory.
    pub fn shop_source(&self) -> &'a Path {
        self.shop_source
    }

    pub fn package(&self) -> &'a Package {
        self.package
    }

    /// Blacklist filter of package.
    pub(crate) fn blacklist(&self) -> Vec<String> {
        self.package.extra().blacklist_filter().to_vec()
    }

    /// Ask question only if package is already installed.
    ///
    /// Nothing can be overwritten by a fresh install, so there is nothing to
    /// ask about.
    pub(crate) fn ask_if_installed(&self, installed: bool, question: &str) -> bool {
        if !installed {
            return true;
        }

        self.confirm.confirm(question)
    }
}

/// Installer for one of the supported package types.
pub enum PackageInstaller<'a> {
    Shop(ShopInstaller<'a>),
    Module(ModuleInstaller<'a>),
    Theme(ThemeInstaller<'a>),
    Component(ComponentInstaller<'a>),
}

impl<'a> PackageInstaller<'a> {
    /// Select installer for package type.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError::UnsupportedType`] if package type is not
    ///   supported.
    pub fn new(installation: Installation<'a>) -> Result<Self> {
        let kind: PackageKind = installation.package.package_type().parse()?;
        Ok(match kind {
            PackageKind::Shop => Self::Shop(ShopInstaller::new(installation)),
            PackageKind::Module => Self::Module(ModuleInstaller::new(installation)),
            PackageKind::Theme => Self::Theme(ThemeInstaller::new(installation)),
            PackageKind::Component => Self::Component(ComponentInstaller::new(installation)),
        })
    }

    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Shop(_) => PackageKind::Shop,
            Self::Module(_) => PackageKind::Module,
            Self::Theme(_) => PackageKind::Theme,
            Self::Component(_) => PackageKind::Component,
        }
    }

    /// Check if package already has been installed.
    pub fn is_installed(&self) -> bool {
        match self {
            Self::Shop(installer) => installer.is_installed(),
            Self::Module(installer) => installer.is_installed(),
            Self::Theme(installer) => installer.is_installed(),
            Self::Component(installer) => installer.is_installed(),
        }
    }

    /// Install package located at `package_path`.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if installation fails.
    pub fn install(&self, package_path: &Path) -> Result<()> {
        match self {
            Self::Shop(installer) => installer.install(package_path),
            Self::Module(installer) => installer.install(package_path),
            Self::Theme(installer) => installer.install(package_path),
            Self::Component(installer) => installer.install(package_path),
        }
    }

    /// Update package located at `package_path`.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if update fails.
    pub fn update(&self, package_path: &Path) -> Result<()> {
        match self {
            Self::Shop(installer) => installer.update(package_path),
            Self::Module(installer) => installer.update(package_path),
            Self::Theme(installer) => installer.update(package_path),
            Self::Component(installer) => installer.update(package_path),
        }
    }

    /// Uninstall package located at `package_path`.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if uninstall fails.
    pub fn uninstall(&self, package_path: &Path) -> Result<()> {
        match self {
            Self::Shop(installer) => installer.uninstall(package_path),
            Self::Module(installer) => installer.uninstall(package_path),
            Self::Theme(installer) => installer.uninstall(package_path),
            Self::Component(installer) => installer.uninstall(package_path),
        }
    }
}

/// Entry point for package operations requested by the host.
#[derive(Debug)]
pub struct PackageInstallerTrigger<C = InquireConfirm, F = DetachedFramework>
where
    C: Confirm,
    F: ShopFramework,
{
    settings: PluginSettings,
    confirm: C,
    framework: F,
}

impl<C, F> PackageInstallerTrigger<C, F>
where
    C: Confirm,
    F: ShopFramework,
{
    /// Construct new trigger with default settings.
    pub fn new(confirm: C, framework: F) -> Self {
        Self {
            settings: PluginSettings::default(),
            confirm,
            framework,
        }
    }

    pub fn set_settings(&mut self, settings: PluginSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn framework(&self) -> &F {
        &self.framework
    }

    /// Check if package type is handled.
    pub fn supports(&self, package_type: &str) -> bool {
        package_type.parse::<PackageKind>().is_ok()
    }

    /// Path to shop source directory.
    ///
    /// Configured source path wins over `$PWD/source`.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError::NoWorkingDirectory`] if default path cannot
    ///   be determined.
    pub fn shop_source_path(&self) -> Result<PathBuf> {
        match &self.settings.source_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_shop_source_dir()?),
        }
    }

    /// Install package unless it already is installed.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if installation fails.
    #[instrument(skip(self, package), fields(package = package.name()), level = "debug")]
    pub fn install_package(&self, package: &Package) -> Result<()> {
        let shop_source = self.shop_source_path()?;
        let installer = self.installer(&shop_source, package)?;
        if installer.is_installed() {
            debug!("{} {} already installed", installer.kind().description(), package.name());
            return Ok(());
        }

        installer.install(package.install_path())
    }

    /// Update package.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if update fails.
    #[instrument(skip(self, package), fields(package = package.name()), level = "debug")]
    pub fn update_package(&self, package: &Package) -> Result<()> {
        let shop_source = self.shop_source_path()?;
        self.installer(&shop_source, package)?
            .update(package.install_path())
    }

    /// Uninstall package.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if uninstall fails.
    #[instrument(skip(self, package), fields(package = package.name()), level = "debug")]
    pub fn uninstall_package(&self, package: &Package) -> Result<()> {
        let shop_source = self.shop_source_path()?;
        self.installer(&shop_source, package)?
            .uninstall(package.install_path())
    }

    fn installer<'a>(
        &'a self,
        shop_source: &'a Path,
        package: &'a Package,
    ) -> Result<PackageInstaller<'a>> {
        PackageInstaller::new(Installation::new(
            shop_source,
            package,
            &self.confirm,
            &self.framework,
        ))
    }
}

/// Lifecycle events of the host package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// All packages have been installed.
    PostInstallCmd,

    /// All packages have been updated.
    PostUpdateCmd,

    /// A package is about to be removed.
    PrePackageUninstall,
}

impl HostEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostInstallCmd => "post-install-cmd",
            Self::PostUpdateCmd => "post-update-cmd",
            Self::PrePackageUninstall => "pre-package-uninstall",
        }
    }
}

impl FromStr for HostEvent {
    type Err = InstallerError;

    fn from_str(event: &str) -> Result<Self, Self::Err> {
        match event {
            "post-install-cmd" => Ok(Self::PostInstallCmd),
            "post-update-cmd" => Ok(Self::PostUpdateCmd),
            "pre-package-uninstall" => Ok(Self::PrePackageUninstall),
            _ => Err(InstallerError::UnknownEvent {
                event: event.into(),
            }),
        }
    }
}

impl Display for HostEvent {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Installer plugin as seen by the host.
#[derive(Debug)]
pub struct Plugin<C = InquireConfirm, F = DetachedFramework>
where
    C: Confirm,
    F: ShopFramework,
{
    trigger: PackageInstallerTrigger<C, F>,
}

impl<C, F> Plugin<C, F>
where
    C: Confirm,
    F: ShopFramework,
{
    /// Activate plugin with settings from `extra` object of root package.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError::Config`] if settings are malformed.
    pub fn activate(confirm: C, framework: F, root_extra: &Value) -> Result<Self> {
        let mut trigger = PackageInstallerTrigger::new(confirm, framework);
        trigger.set_settings(PluginSettings::from_extra(root_extra)?);

        Ok(Self { trigger })
    }

    /// Events the plugin wants to be called for.
    pub fn subscribed_events() -> [HostEvent; 3] {
        [
            HostEvent::PostInstallCmd,
            HostEvent::PostUpdateCmd,
            HostEvent::PrePackageUninstall,
        ]
    }

    pub fn trigger(&self) -> &PackageInstallerTrigger<C, F> {
        &self.trigger
    }

    /// Handle host event.
    ///
    /// Install and update events process every package of the local
    /// repository, uninstall events process the packages being removed.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if any package operation fails.
    pub fn dispatch(&self, event: HostEvent, packages: &[Package]) -> Result<()> {
        debug!("dispatch {event} for {} packages", packages.len());
        match event {
            HostEvent::PostInstallCmd => self.install_packages(packages),
            HostEvent::PostUpdateCmd => self.update_packages(packages),
            HostEvent::PrePackageUninstall => packages
                .iter()
                .try_for_each(|package| self.uninstall_package(package)),
        }
    }

    /// Install every supported package.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if any package operation fails.
    pub fn install_packages(&self, packages: &[Package]) -> Result<()> {
        self.generate_default_project_configuration_if_missing()?;
        for package in self.supported(packages) {
            self.trigger.install_package(package)?;
        }

        Ok(())
    }

    /// Update every supported package.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if any package operation fails.
    pub fn update_packages(&self, packages: &[Package]) -> Result<()> {
        self.generate_default_project_configuration_if_missing()?;
        for package in self.supported(packages) {
            self.trigger.update_package(package)?;
        }

        Ok(())
    }

    /// Uninstall package if it is supported.
    ///
    /// # Errors
    ///
    /// - Return [`InstallerError`] if uninstall fails.
    pub fn uninstall_package(&self, package: &Package) -> Result<()> {
        if !self.trigger.supports(package.package_type()) {
            return Ok(());
        }

        self.trigger.uninstall_package(package)
    }

    fn supported<'p>(&'p self, packages: &'p [Package]) -> impl Iterator<Item = &'p Package> {
        packages
            .iter()
            .filter(|package| self.trigger.supports(package.package_type()))
    }

    fn generate_default_project_configuration_if_missing(&self) -> Result<()> {
        let framework = self.trigger.framework();
        if framework.is_project_configuration_empty() {
            let launched = framework.is_launched();
            info!("generate default project configuration (launched shop: {launched})");
            framework.generate_project_configuration(launched)?;
        }

        Ok(())
    }
}

/// Shop framework call failed.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FrameworkError {
    message: String,
}

impl FrameworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Friendly result alias :3
pub type FrameworkResult<T, E = FrameworkError> = std::result::Result<T, E>;

/// All possible error types for package installation.
#[derive(Debug, thiserror::Error)]
pub enum InstallerError {
    /// Package type is not handled by any installer.
    #[error("package type {package_type:?} is not supported")]
    UnsupportedType { package_type: String },

    /// Host event is not known.
    #[error("host event {event:?} is not known")]
    UnknownEvent { event: String },

    /// Package settings are malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Glob expression is malformed.
    #[error(transparent)]
    Glob(#[from] GlobError),

    /// Package files cannot be copied.
    #[error(transparent)]
    Copy(#[from] CopyError),

    /// Shop framework call failed.
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// Shop source directory cannot be determined.
    #[error(transparent)]
    NoWorkingDirectory(#[from] NoWorkingDirectory),
}

/// Friendly result alias :3
pub type Result<T, E = InstallerError> = std::result::Result<T, E>;
