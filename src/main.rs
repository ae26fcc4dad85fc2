use anyhow::Context;
use clap::Parser;
use static_scaffold::config::Command;
use static_scaffold::utils::error::ErrorSeverity;
use static_scaffold::utils::{logger, validation::Validate};
use static_scaffold::{
    pages, server, CliConfig, Document, FragmentIncluder, FsFragmentSource, HttpFragmentSource,
    PageLoader, ScaffoldError, SiteBuilder, SiteConfig,
};
use std::path::Path;
use std::sync::Arc;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting static-scaffold");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match SiteConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    match &cli.command {
        Command::Serve { port, .. } => {
            let port = config.resolve_port(*port);
            server::serve(&config, port).await?;
        }
        Command::Build { .. } => match SiteBuilder::from_config(&config).run() {
            Ok(report) => {
                tracing::debug!("Build report: {:?}", report);
                println!("✅ Build complete: {} file(s) copied", report.files_copied);
            }
            Err(e) => exit_with(&e),
        },
        Command::Render {
            page,
            offline,
            output,
            report,
            ..
        } => {
            render(&config, page, *offline, output.as_deref(), *report).await?;
        }
    }

    Ok(())
}

async fn render(
    config: &SiteConfig,
    page: &str,
    offline: bool,
    output: Option<&str>,
    print_report: bool,
) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(page).with_context(|| format!("reading {}", page))?;

    let file_name = Path::new(page)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("index.html");
    let origin = Url::parse(&config.site.origin).context("parsing site.origin")?;
    let location = origin.join(file_name)?;

    let includer = if offline {
        FragmentIncluder::new(FsFragmentSource::from_config(config))
    } else {
        FragmentIncluder::new(HttpFragmentSource::new()?)
    };

    let registry = Arc::new(pages::default_registry(&config.site.module_dir));
    let loader = PageLoader::new(registry, includer).configured(config);

    tracing::info!("Rendering {} as {}", page, location);
    let rendered = match loader.boot(&location, Document::parse(html)).await {
        Ok(rendered) => rendered,
        Err(e) => exit_with(&e),
    };

    for warning in &rendered.warnings {
        tracing::warn!("{}", warning);
    }

    if print_report {
        let report = serde_json::json!({
            "module": rendered.module,
            "includes": rendered.includes,
            "registered_pages": loader.registered_pages(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    match output {
        Some(path) => {
            std::fs::write(path, rendered.document.html())
                .with_context(|| format!("writing {}", path))?;
            println!("📁 Output saved to: {}", path);
        }
        None => println!("{}", rendered.document.html()),
    }

    Ok(())
}

fn exit_with(e: &ScaffoldError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
