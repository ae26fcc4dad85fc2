use crate::domain::model::FetchedFragment;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where fragment HTML comes from (HTTP origin, local static roots, test doubles).
///
/// `Ok` carries any HTTP-like status; `Err` means the request never completed.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedFragment>;
}

pub trait SiteConfigProvider: Send + Sync {
    fn origin(&self) -> &str;
    fn module_dir(&self) -> &str;
    fn include_base(&self) -> &str;
    fn static_roots(&self) -> Vec<String>;
    fn auto_include(&self) -> bool;
    fn mark_active_nav(&self) -> bool;
    fn strict_includes(&self) -> bool;
}
