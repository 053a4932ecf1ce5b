//! Cache management CLI commands.

use clap::Subcommand;
use mapconverter::cache::{clear_disk_cache, disk_cache_stats};
use mapconverter::config::{format_size, ConfigFile};

use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the disk cache, removing all cached tiles
    Clear,
    /// Show disk cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(config: &ConfigFile, action: CacheAction) -> Result<(), CliError> {
    let cache_dir = &config.cache.directory;

    match action {
        CacheAction::Clear => {
            println!("Clearing disk cache at: {}", cache_dir.display());
            let result = clear_disk_cache(cache_dir).map_err(CliError::CacheClear)?;
            println!(
                "Deleted {} files, freed {}",
                result.files_deleted,
                format_size(result.bytes_freed)
            );
        }
        CacheAction::Stats => {
            println!("Disk cache: {}", cache_dir.display());
            let usage = disk_cache_stats(cache_dir).map_err(CliError::CacheStats)?;
            println!("  Tiles: {}", usage.files);
            println!("  Size:  {}", format_size(usage.bytes));
            println!("  Memory budget: {}", format_size(config.cache.memory_size));
        }
    }
    Ok(())
}
