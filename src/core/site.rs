use crate::core::document::Document;
use crate::core::includer::{mark_active_nav, FragmentIncluder};
use crate::core::resolver::{derive_module_name, PageContext, PageRegistry};
use crate::domain::model::{IncludeReport, ModuleName, ModulePath};
use crate::domain::ports::SiteConfigProvider;
use crate::utils::error::{Result, ScaffoldError};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub name: ModuleName,
    pub path: ModulePath,
    pub registered: bool,
    pub ran: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct RenderedPage {
    pub document: Document,
    pub module: ModuleReport,
    pub includes: IncludeReport,
    pub warnings: Vec<String>,
}

/// Boots a parsed page: page module first, then placeholders, then nav state.
pub struct PageLoader {
    registry: Arc<PageRegistry>,
    includer: FragmentIncluder,
    include_base: String,
    auto_include: bool,
    mark_nav: bool,
    strict_includes: bool,
}

impl PageLoader {
    pub fn new(registry: Arc<PageRegistry>, includer: FragmentIncluder) -> Self {
        Self {
            registry,
            includer,
            include_base: "./".to_string(),
            auto_include: true,
            mark_nav: true,
            strict_includes: false,
        }
    }

    /// Takes include base and the boot switches from the site configuration.
    pub fn configured(self, config: &dyn SiteConfigProvider) -> Self {
        self.with_include_base(config.include_base())
            .with_auto_include(config.auto_include())
            .with_active_nav(config.mark_active_nav())
            .with_strict_includes(config.strict_includes())
    }

    /// Base for `data-include` and page-module fragments, relative to the page URL.
    pub fn with_include_base(mut self, include_base: impl Into<String>) -> Self {
        self.include_base = include_base.into();
        self
    }

    pub fn with_auto_include(mut self, enabled: bool) -> Self {
        self.auto_include = enabled;
        self
    }

    pub fn with_active_nav(mut self, enabled: bool) -> Self {
        self.mark_nav = enabled;
        self
    }

    /// When set, any failed `data-include` turns into an error from `boot`.
    pub fn with_strict_includes(mut self, strict: bool) -> Self {
        self.strict_includes = strict;
        self
    }

    /// Page names known to the registry, sorted.
    pub fn registered_pages(&self) -> Vec<String> {
        self.registry.names().map(|n| n.to_string()).collect()
    }

    pub fn fragment_base(&self, location: &Url) -> Result<Url> {
        Ok(location.join(&self.include_base)?)
    }

    pub async fn boot(&self, location: &Url, document: Document) -> Result<RenderedPage> {
        let name = derive_module_name(location.path());
        let path = self.registry.module_path(&name);
        let fragment_base = self.fragment_base(location)?;
        let registered = self.registry.contains(&name);
        if !registered {
            tracing::debug!("No page registered as {}", name);
        }

        let mut ctx = PageContext::new(
            document,
            location.clone(),
            fragment_base.clone(),
            self.includer.clone(),
        );

        let module = match self.registry.load_and_run(&name, &mut ctx).await {
            Ok(()) => {
                tracing::info!("Page module {} completed", path);
                ModuleReport {
                    name,
                    path,
                    registered,
                    ran: true,
                    error: None,
                }
            }
            Err(e) => {
                // 頁面模組失敗不影響後續流程
                match &e {
                    ScaffoldError::NoEntryPoint { .. } => {
                        tracing::warn!("Page module loaded but has no entry point: {}", path)
                    }
                    _ => tracing::error!("Failed to load page module {}: {}", path, e),
                }
                ModuleReport {
                    name,
                    path,
                    registered,
                    ran: false,
                    error: Some(e.to_string()),
                }
            }
        };

        let PageContext {
            mut document,
            warnings,
            ..
        } = ctx;

        let includes = if self.auto_include {
            self.includer.include_all(&mut document, &fragment_base).await
        } else {
            IncludeReport::default()
        };

        if self.strict_includes {
            if let Some(failed) = includes.first_failure() {
                if let Some(outcome) = failed.outcome().cloned() {
                    outcome.into_result(&failed.url)?;
                }
            }
        }

        if self.mark_nav {
            mark_active_nav(&mut document, location.path());
        }

        Ok(RenderedPage {
            document,
            module,
            includes,
            warnings,
        })
    }
}
