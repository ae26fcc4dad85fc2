pub mod toml_config;

pub use toml_config::SiteConfig;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "scaffold")]
#[command(about = "Static site scaffold: page modules, fragment includes, dev server and build step")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "scaffold.toml")]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve includes/, public/ and src/ as static roots
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(long)]
        port: Option<u16>,

        /// Project directory containing the static roots
        #[arg(long)]
        root: Option<String>,
    },

    /// Copy source trees into the output directory and relativise index.html
    Build {
        #[arg(long)]
        root: Option<String>,
    },

    /// Boot one HTML page: run its page module, fill includes, print the result
    Render {
        /// HTML file to render
        page: String,

        /// Site origin used to build the page URL and fetch fragments
        #[arg(long)]
        origin: Option<String>,

        /// Read fragments from the local static roots instead of over HTTP
        #[arg(long)]
        offline: bool,

        #[arg(short, long)]
        output: Option<String>,

        /// Print the include report as JSON on stderr
        #[arg(long)]
        report: bool,

        /// Fail when any data-include placeholder could not be filled
        #[arg(long)]
        strict: bool,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut SiteConfig) {
        match &self.command {
            Command::Serve { root, .. } | Command::Build { root } => {
                if let Some(root) = root {
                    config.server.root = root.clone();
                }
            }
            Command::Render { origin, strict, .. } => {
                if let Some(origin) = origin {
                    config.site.origin = origin.clone();
                }
                if *strict {
                    config.site.strict_includes = true;
                }
            }
        }
    }
}
