pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod pages;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::SiteConfig;

pub use adapters::{FsFragmentSource, HttpFragmentSource};
pub use core::{
    document::Document,
    includer::{resolve_fragment_url, FragmentIncluder},
    resolver::{derive_module_name, PageContext, PageModule, PageRegistry},
    site::{PageLoader, RenderedPage},
    site_build::SiteBuilder,
};
pub use utils::error::{Result, ScaffoldError};
