//! Command implementations
//!
//! Every command returns `Ok(true)` when all settings it touched
//! succeeded, `Ok(false)` when some of them failed.

pub mod declarative;
pub mod setting;

use std::path::PathBuf;

use crate::Context;
use crate::config::Manifest;
use crate::paths;
use crate::provider::IniFileProvider;

/// Resolve the target file: `--file`, then the manifest's `path`, then the default
pub(crate) fn target_file(ctx: &Context, manifest: Option<&Manifest>) -> PathBuf {
    ctx.file
        .as_deref()
        .map(paths::expand)
        .or_else(|| manifest.and_then(Manifest::target_path))
        .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_PLUGIN_FILE))
}

/// Build the INI provider for the resolved target file
pub(crate) fn open_provider(ctx: &Context, manifest: Option<&Manifest>) -> IniFileProvider {
    let path = target_file(ctx, manifest);
    log::info!("Managing {}", path.display());
    IniFileProvider::new(path)
        .create_missing(ctx.create)
        .prune_empty_sections(ctx.prune_empty_sections)
}
