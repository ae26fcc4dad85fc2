use crate::domain::model::FetchedFragment;
use crate::domain::ports::{FragmentSource, SiteConfigProvider};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// Serves fragment URLs from local static roots, the same lookup order the server uses.
///
/// Only the URL path is used; the host is ignored. A miss in every root is a 404.
#[derive(Debug, Clone)]
pub struct FsFragmentSource {
    roots: Vec<PathBuf>,
}

impl FsFragmentSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn from_config(config: &dyn SiteConfigProvider) -> Self {
        Self::new(config.static_roots().into_iter().map(PathBuf::from).collect())
    }

    fn relative_path(url: &str) -> Option<PathBuf> {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
        };

        let mut relative = PathBuf::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                other => relative.push(other),
            }
        }
        Some(relative)
    }

    async fn read_from(root: &Path, relative: &Path) -> Result<Option<String>> {
        let mut candidate = root.join(relative);
        if tokio::fs::metadata(&candidate).await.is_ok_and(|m| m.is_dir()) {
            candidate.push("index.html");
        }

        match tokio::fs::read_to_string(&candidate).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FragmentSource for FsFragmentSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFragment> {
        let Some(relative) = Self::relative_path(url) else {
            tracing::warn!("Refusing fragment path outside the static roots: {}", url);
            return Ok(FetchedFragment {
                status: 403,
                body: String::new(),
            });
        };

        for root in &self.roots {
            if let Some(body) = Self::read_from(root, &relative).await? {
                tracing::debug!("Fragment {} served from {}", url, root.display());
                return Ok(FetchedFragment { status: 200, body });
            }
        }

        Ok(FetchedFragment {
            status: 404,
            body: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_roots_are_tried_in_order() {
        let includes = TempDir::new().unwrap();
        let public = TempDir::new().unwrap();
        std::fs::write(public.path().join("nav.html"), "<nav>public</nav>").unwrap();
        std::fs::write(public.path().join("footer.html"), "public footer").unwrap();
        std::fs::write(includes.path().join("footer.html"), "includes footer").unwrap();

        let source = FsFragmentSource::new(vec![
            includes.path().to_path_buf(),
            public.path().to_path_buf(),
        ]);

        let nav = source.fetch("http://localhost:3000/nav.html").await.unwrap();
        assert_eq!(nav.status, 200);
        assert_eq!(nav.body, "<nav>public</nav>");

        let footer = source.fetch("http://localhost:3000/footer.html?v=1").await.unwrap();
        assert_eq!(footer.body, "includes footer");

        let missing = source.fetch("http://localhost:3000/none.html").await.unwrap();
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn test_parent_segments_are_refused() {
        let root = TempDir::new().unwrap();
        let source = FsFragmentSource::new(vec![root.path().to_path_buf()]);
        let fragment = source.fetch("../secret.html").await.unwrap();
        assert_eq!(fragment.status, 403);
    }
}
