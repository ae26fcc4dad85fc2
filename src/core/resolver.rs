use crate::core::document::Document;
use crate::core::includer::{resolve_fragment_url, FragmentIncluder};
use crate::domain::model::{FragmentOutcome, ModuleName, ModulePath};
use crate::utils::error::{Result, ScaffoldError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Maps a document path to its page module name.
///
/// `""`, `"/"` and `"index.html"` all map to `index`; `"/docs/about.html?x=1#top"` maps to `about`.
/// The last `/` segment is taken before the query is stripped, so `/x?next=/about.html` is `about`.
pub fn derive_module_name(path: &str) -> ModuleName {
    let segment = path.rsplit('/').next().unwrap_or_default();
    let segment = segment.split(['?', '#']).next().unwrap_or_default();
    let stem = segment.strip_suffix(".html").unwrap_or(segment);
    ModuleName::sanitize(stem)
}

/// Everything a page module may touch while it runs.
pub struct PageContext {
    pub document: Document,
    pub location: Url,
    /// Base for relative fragment specifiers (normally the page's own URL).
    pub fragment_base: Url,
    pub includer: FragmentIncluder,
    pub warnings: Vec<String>,
}

impl PageContext {
    pub fn new(document: Document, location: Url, fragment_base: Url, includer: FragmentIncluder) -> Self {
        Self {
            document,
            location,
            fragment_base,
            includer,
            warnings: Vec::new(),
        }
    }

    /// Resolves `specifier` against the fragment base and injects it into `selector`.
    pub async fn load_fragment(&mut self, selector: &str, specifier: &str) -> Result<FragmentOutcome> {
        let url = resolve_fragment_url(specifier, &self.fragment_base);
        let outcome = self
            .includer
            .fetch_and_inject(&mut self.document, &url, selector)
            .await?;

        if !outcome.is_injected() {
            self.warnings.push(format!("fragment {} for {} was not injected", url, selector));
        }
        Ok(outcome)
    }
}

#[async_trait]
pub trait PageModule: Send + Sync {
    async fn run(&self, ctx: &mut PageContext) -> Result<()>;
}

enum PageEntry {
    Module(Arc<dyn PageModule>),
    // 只有 HTML、沒有行為的頁面
    Static,
}

/// Page identifier to entry point, fixed before any page is booted.
pub struct PageRegistry {
    module_dir: String,
    pages: BTreeMap<ModuleName, PageEntry>,
}

impl PageRegistry {
    pub fn new(module_dir: impl Into<String>) -> Self {
        Self {
            module_dir: module_dir.into(),
            pages: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, module: impl PageModule + 'static) -> &mut Self {
        self.pages
            .insert(ModuleName::sanitize(name), PageEntry::Module(Arc::new(module)));
        self
    }

    pub fn register_static(&mut self, name: &str) -> &mut Self {
        self.pages.insert(ModuleName::sanitize(name), PageEntry::Static);
        self
    }

    pub fn contains(&self, name: &ModuleName) -> bool {
        self.pages.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &ModuleName> {
        self.pages.keys()
    }

    pub fn module_path(&self, name: &ModuleName) -> ModulePath {
        ModulePath::new(&self.module_dir, name)
    }

    pub async fn load_and_run(&self, name: &ModuleName, ctx: &mut PageContext) -> Result<()> {
        let path = self.module_path(name);

        let module = match self.pages.get(name) {
            Some(PageEntry::Module(module)) => Arc::clone(module),
            Some(PageEntry::Static) => {
                return Err(ScaffoldError::NoEntryPoint {
                    path: path.to_string(),
                })
            }
            None => {
                return Err(ScaffoldError::ModuleNotFound {
                    path: path.to_string(),
                })
            }
        };

        tracing::debug!("Running page module {}", path);
        module.run(ctx).await.map_err(|e| ScaffoldError::PageModuleError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
