// Adapters layer: concrete fragment sources for external systems.

pub mod fs;
pub mod http;

pub use fs::FsFragmentSource;
pub use http::HttpFragmentSource;
