// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shop package installer.
//!
//! Installs e-commerce shop packages delivered by a package manager into the
//! shop's source tree. The core of it all is a filtered overlay copy: walk a
//! package's file tree, drop everything a blacklist of glob expressions
//! matches, and copy the rest into place.
//!
//! # Layout
//!
//! - [`copy::glob`]: glob matching of relative paths.
//! - [`copy::walk`]: lazy directory walk that prunes blacklisted entries.
//! - [`copy`]: filtered tree copying on top of the walk.
//! - [`nest`]: flat path map to nested tree conversion, used to describe
//!   file trees in fixtures.
//! - [`config`]: installer settings read from package metadata.
//! - [`installer`]: per package type installation and host event handling.

pub mod config;
pub mod copy;
pub mod installer;
pub mod nest;
pub mod path;

pub use crate::{
    config::{PackageExtra, PluginSettings},
    copy::{
        copy_filtered,
        glob::{GlobExpression, GlobList},
        walk::FilteredWalk,
    },
    installer::{
        HostEvent, Package, PackageInstaller, PackageInstallerTrigger, PackageKind, Plugin,
    },
    nest::{nest, NestedTree, Node},
};
