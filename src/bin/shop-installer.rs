// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use shop_installer::{
    copy_filtered,
    installer::{
        AssumeYes, Confirm, DetachedFramework, InquireConfirm, Package, PackageInstallerTrigger,
    },
    PackageExtra, PluginSettings,
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  shop-installer [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Install(opts) => run_package(opts, Operation::Install),
            Command::Update(opts) => run_package(opts, Operation::Update),
            Command::Uninstall(opts) => run_package(opts, Operation::Uninstall),
            Command::Copy(opts) => run_copy(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Install package into shop unless already installed.
    #[command(override_usage = "shop-installer install [options] --type <type> --name <name> --package-path <path>")]
    Install(PackageOptions),

    /// Update package in shop.
    #[command(override_usage = "shop-installer update [options] --type <type> --name <name> --package-path <path>")]
    Update(PackageOptions),

    /// Uninstall package from shop.
    #[command(override_usage = "shop-installer uninstall [options] --type <type> --name <name> --package-path <path>")]
    Uninstall(PackageOptions),

    /// Copy directory tree excluding blacklisted entries.
    #[command(override_usage = "shop-installer copy [options] <source> <target> [<glob>]...")]
    Copy(CopyOptions),
}

#[derive(Args, Clone, Debug)]
struct PackageOptions {
    /// Package type, e.g., oxideshop-theme.
    #[arg(short = 't', long = "type", value_name = "type")]
    pub package_type: String,

    /// Full package name, e.g., vendor/package.
    #[arg(short, long, value_name = "name")]
    pub name: String,

    /// Directory the package was placed in.
    #[arg(short, long, value_name = "path")]
    pub package_path: PathBuf,

    /// Path to shop source directory, defaults to ./source.
    #[arg(short, long, value_name = "path")]
    pub shop_source: Option<PathBuf>,

    /// Extra object of package as JSON.
    #[arg(short, long, value_name = "json")]
    pub extra: Option<String>,

    /// Answer yes to every question.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Clone, Debug)]
struct CopyOptions {
    /// Directory to copy from.
    #[arg(required = true, value_name = "source")]
    pub source: PathBuf,

    /// Directory to copy into.
    #[arg(required = true, value_name = "target")]
    pub target: PathBuf,

    /// Glob expressions of entries to exclude.
    #[arg(value_name = "glob")]
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Install,
    Update,
    Uninstall,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_package(opts: PackageOptions, operation: Operation) -> Result<()> {
    if opts.yes {
        run_operation(opts, operation, AssumeYes)
    } else {
        run_operation(opts, operation, InquireConfirm)
    }
}

fn run_operation(opts: PackageOptions, operation: Operation, confirm: impl Confirm) -> Result<()> {
    let extra = match opts.extra {
        Some(extra) => extra.parse()?,
        None => PackageExtra::default(),
    };
    let package = Package::new(opts.name, opts.package_type, opts.package_path).with_extra(extra);

    let mut trigger = PackageInstallerTrigger::new(confirm, DetachedFramework);
    trigger.set_settings(PluginSettings {
        source_path: opts.shop_source,
    });

    if !trigger.supports(package.package_type()) {
        anyhow::bail!("package type {:?} is not supported", package.package_type());
    }

    match operation {
        Operation::Install => trigger.install_package(&package)?,
        Operation::Update => trigger.update_package(&package)?,
        Operation::Uninstall => trigger.uninstall_package(&package)?,
    }

    Ok(())
}

fn run_copy(opts: CopyOptions) -> Result<()> {
    copy_filtered(opts.source, opts.target, opts.blacklist)?;

    Ok(())
}
