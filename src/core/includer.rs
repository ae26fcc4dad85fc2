use crate::core::document::{Document, Element};
use crate::domain::model::{FragmentOutcome, FragmentRequest, IncludeReport};
use crate::domain::ports::FragmentSource;
use crate::utils::error::{Result, ScaffoldError};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::task::JoinSet;
use url::Url;

pub const INCLUDE_ATTRIBUTE: &str = "data-include";

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*:)?//").expect("absolute url pattern is valid")
});

static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-zA-Z0-9]+$").expect("extension pattern is valid"));

/// Resolves a fragment specifier to a fetchable URL.
///
/// - `https://…` and `//…` are returned as given;
/// - `/nav` resolves against the origin of `base`;
/// - anything else resolves relative to `base`.
///
/// Relative and root-relative specifiers without an extension get `.html`.
pub fn resolve_fragment_url(raw: &str, base: &Url) -> String {
    let specifier = raw.trim();
    if ABSOLUTE_URL.is_match(specifier) {
        return specifier.to_string();
    }

    let candidate = ensure_html_extension(specifier);
    match base.join(&candidate) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Could not resolve {} against {}: {}", candidate, base, e);
            candidate
        }
    }
}

fn ensure_html_extension(specifier: &str) -> String {
    let split_at = specifier.find(['?', '#']).unwrap_or(specifier.len());
    let (path, suffix) = specifier.split_at(split_at);

    if FILE_EXTENSION.is_match(path) {
        return specifier.to_string();
    }
    format!("{}.html{}", path.trim_end_matches('/'), suffix)
}

/// Markup produced for one request: the fragment itself or a diagnostic comment.
#[derive(Debug, Clone)]
pub struct FetchedMarkup {
    pub outcome: FragmentOutcome,
    pub markup: String,
}

fn comment_safe(text: &str) -> String {
    text.replace("--", "- -")
}

async fn fetch_markup(source: &dyn FragmentSource, url: &str) -> FetchedMarkup {
    match source.fetch(url).await {
        Ok(fragment) if fragment.is_success() => FetchedMarkup {
            outcome: FragmentOutcome::Injected {
                bytes: fragment.body.len(),
            },
            markup: fragment.body,
        },
        Ok(fragment) => {
            tracing::warn!("Failed to fetch fragment {} ({})", url, fragment.status);
            FetchedMarkup {
                outcome: FragmentOutcome::FailedStatus {
                    status: fragment.status,
                },
                markup: format!(
                    "<!-- include failed: {} ({}) -->",
                    comment_safe(url),
                    fragment.status
                ),
            }
        }
        Err(e) => {
            tracing::error!("Fragment fetch error for {}: {}", url, e);
            let message = match e {
                ScaffoldError::HttpError(inner) => inner.to_string(),
                other => other.to_string(),
            };
            FetchedMarkup {
                markup: format!("<!-- include error: {} -->", comment_safe(&message)),
                outcome: FragmentOutcome::FailedNetwork { message },
            }
        }
    }
}

/// A placeholder located in the document plus where its markup comes from.
struct IncludeTarget {
    element: Element,
    label: String,
    url: String,
}

#[derive(Clone)]
pub struct FragmentIncluder {
    source: Arc<dyn FragmentSource>,
}

impl FragmentIncluder {
    pub fn new(source: impl FragmentSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_arc(source: Arc<dyn FragmentSource>) -> Self {
        Self { source }
    }

    /// Fetches without touching any document; fetch failures become diagnostic markup.
    pub async fn fetch_fragment(&self, url: &str) -> FetchedMarkup {
        fetch_markup(self.source.as_ref(), url).await
    }

    /// Fetches `url` into the first element matching `selector`.
    ///
    /// Fetch failures never produce an `Err`: the container gets a diagnostic comment and the
    /// outcome says what happened. Only a bad selector or a missing container is an error.
    pub async fn fetch_and_inject(
        &self,
        document: &mut Document,
        url: &str,
        selector: &str,
    ) -> Result<FragmentOutcome> {
        let container = document
            .select_first(selector)?
            .ok_or_else(|| ScaffoldError::ContainerNotFound {
                selector: selector.to_string(),
            })?;

        let mut request = FragmentRequest::new(selector, url);
        request.begin();
        let fetched = self.fetch_fragment(url).await;
        document.replace_inner(&container, &fetched.markup);
        request.finish(fetched.outcome.clone());

        tracing::debug!("Fragment {} -> {}: {:?}", url, selector, request.state);
        Ok(fetched.outcome)
    }

    /// Fills every `[data-include]` placeholder, resolving specifiers against `base`.
    pub async fn include_all(&self, document: &mut Document, base: &Url) -> IncludeReport {
        let placeholders: Vec<Element> = document
            .elements()
            .into_iter()
            .filter(|el| el.attr(INCLUDE_ATTRIBUTE).is_some_and(|v| !v.trim().is_empty()))
            .collect();

        let targets: Vec<IncludeTarget> = top_level(document, placeholders)
            .into_iter()
            .map(|element| {
                let specifier = element.attr(INCLUDE_ATTRIBUTE).unwrap_or_default().trim().to_string();
                IncludeTarget {
                    label: format!("[{}=\"{}\"]", INCLUDE_ATTRIBUTE, specifier),
                    url: resolve_fragment_url(&specifier, base),
                    element,
                }
            })
            .collect();

        self.include_targets(document, targets).await
    }

    /// Re-fetches `[data-auto-refresh]` areas from their `data-refresh-url`, used as written.
    pub async fn refresh_all(&self, document: &mut Document, base: &Url) -> IncludeReport {
        let targets: Vec<IncludeTarget> = crate::core::refresh::refresh_targets(document)
            .into_iter()
            .map(|(element, refresh_url)| IncludeTarget {
                label: element
                    .attr("id")
                    .map(|id| format!("#{}", id))
                    .unwrap_or_else(|| format!("[data-refresh-url=\"{}\"]", refresh_url)),
                url: resolve_refresh_url(&refresh_url, base),
                element,
            })
            .collect();

        self.include_targets(document, targets).await
    }

    async fn include_targets(&self, document: &mut Document, targets: Vec<IncludeTarget>) -> IncludeReport {
        if targets.is_empty() {
            return IncludeReport::default();
        }

        let mut requests: Vec<FragmentRequest> = targets
            .iter()
            .map(|t| FragmentRequest::new(t.label.clone(), t.url.clone()))
            .collect();

        // 各請求互相獨立，全部同時發出
        let mut tasks = JoinSet::new();
        for (idx, target) in targets.iter().enumerate() {
            requests[idx].begin();
            let source = Arc::clone(&self.source);
            let url = target.url.clone();
            tasks.spawn(async move { (idx, fetch_markup(source.as_ref(), &url).await) });
        }

        let mut fetched: Vec<Option<FetchedMarkup>> = vec![None; targets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, markup)) => fetched[idx] = Some(markup),
                Err(e) => tracing::error!("Fragment task failed: {}", e),
            }
        }

        // 目標互不包含，寫回順序不影響結果
        for (idx, target) in targets.iter().enumerate() {
            let result = fetched[idx].take().unwrap_or_else(|| FetchedMarkup {
                outcome: FragmentOutcome::FailedNetwork {
                    message: "fetch task did not complete".to_string(),
                },
                markup: "<!-- include error: fetch task did not complete -->".to_string(),
            });
            document.replace_inner(&target.element, &result.markup);
            requests[idx].finish(result.outcome);
        }

        let report = IncludeReport { requests };
        tracing::info!(
            "Included {} fragment(s), {} failed",
            report.injected(),
            report.failed()
        );
        report
    }
}

/// Refresh URLs point at arbitrary endpoints, so no extension is added.
pub fn resolve_refresh_url(raw: &str, base: &Url) -> String {
    let raw = raw.trim();
    match base.join(raw) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Could not resolve refresh url {} against {}: {}", raw, base, e);
            raw.to_string()
        }
    }
}

/// Drops elements nested inside an earlier element of the same set.
pub(crate) fn top_level(document: &Document, elements: Vec<Element>) -> Vec<Element> {
    let mut kept: Vec<Element> = Vec::new();
    for element in elements {
        if kept.iter().any(|outer| document.is_inside(outer, &element)) {
            tracing::debug!("Skipping nested placeholder <{}>", element.name);
            continue;
        }
        kept.push(element);
    }
    kept
}

/// Marks `nav .nav-link` anchors whose `href` matches the current page as `active`.
///
/// Returns how many links ended up active.
pub fn mark_active_nav(document: &mut Document, current_path: &str) -> usize {
    let without_query = current_path.split(['?', '#']).next().unwrap_or_default();
    let current = without_query.rsplit('/').next().unwrap_or_default();
    let is_index = current.is_empty() || current == "index.html";

    let links = match document.select("nav a.nav-link") {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Nav lookup failed: {}", e);
            return 0;
        }
    };

    let mut active = 0;
    for link in &links {
        let Some(href) = link.attr("href") else {
            continue;
        };
        let is_active = (href == "index.html" && is_index) || href == current;
        if is_active {
            active += 1;
        }
        document.set_class(link, "active", is_active);
    }
    active
}
