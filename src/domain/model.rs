use serde::{Deserialize, Serialize};
use std::fmt;

/// Sanitised page module name, always non-empty and limited to `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ModuleName(String);

impl ModuleName {
    pub const DEFAULT: &'static str = "index";

    /// Keeps only the allowed characters; an empty result becomes `index`.
    pub fn sanitize(raw: &str) -> Self {
        let name: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();

        if name.is_empty() {
            Self(Self::DEFAULT.to_string())
        } else {
            Self(name)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// 反序列化也要經過 sanitize
impl From<String> for ModuleName {
    fn from(raw: String) -> Self {
        Self::sanitize(&raw)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Module path relative to the page loader, e.g. `./controller/about.js`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(base_dir: &str, name: &ModuleName) -> Self {
        let base = base_dir.trim_matches(|c| c == '/' || c == '.');
        if base.is_empty() {
            Self(format!("./{}.js", name))
        } else {
            Self(format!("./{}/{}.js", base, name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw response of a fragment source.
#[derive(Debug, Clone)]
pub struct FetchedFragment {
    pub status: u16,
    pub body: String,
}

impl FetchedFragment {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Terminal result of one fragment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FragmentOutcome {
    Injected { bytes: usize },
    FailedStatus { status: u16 },
    FailedNetwork { message: String },
}

impl FragmentOutcome {
    pub fn is_injected(&self) -> bool {
        matches!(self, FragmentOutcome::Injected { .. })
    }

    /// Turns a failed outcome into an error so the caller can treat it as fatal.
    pub fn into_result(self, url: &str) -> crate::utils::error::Result<usize> {
        use crate::utils::error::ScaffoldError;

        match self {
            FragmentOutcome::Injected { bytes } => Ok(bytes),
            FragmentOutcome::FailedStatus { status } => Err(ScaffoldError::FragmentStatusError {
                url: url.to_string(),
                status,
            }),
            FragmentOutcome::FailedNetwork { message } => {
                Err(ScaffoldError::FragmentNetworkError {
                    url: url.to_string(),
                    message,
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentState {
    Pending,
    Fetching,
    Done(FragmentOutcome),
}

impl FragmentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FragmentState::Done(_))
    }
}

/// One (container, url) pair. Lives for a single fetch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentRequest {
    pub container: String,
    pub url: String,
    pub state: FragmentState,
}

impl FragmentRequest {
    pub fn new(container: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            url: url.into(),
            state: FragmentState::Pending,
        }
    }

    pub fn begin(&mut self) {
        if self.state == FragmentState::Pending {
            self.state = FragmentState::Fetching;
        }
    }

    /// Terminal states are never left again.
    pub fn finish(&mut self, outcome: FragmentOutcome) {
        if !self.state.is_terminal() {
            self.state = FragmentState::Done(outcome);
        }
    }

    pub fn outcome(&self) -> Option<&FragmentOutcome> {
        match &self.state {
            FragmentState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IncludeReport {
    pub requests: Vec<FragmentRequest>,
}

impl IncludeReport {
    pub fn injected(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.outcome().is_some_and(FragmentOutcome::is_injected))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.outcome().is_some_and(|o| !o.is_injected()))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn first_failure(&self) -> Option<&FragmentRequest> {
        self.requests
            .iter()
            .find(|r| r.outcome().is_some_and(|o| !o.is_injected()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_sanitize() {
        assert_eq!(ModuleName::sanitize("about").as_str(), "about");
        assert_eq!(ModuleName::sanitize("Some Page!").as_str(), "SomePage");
        assert_eq!(ModuleName::sanitize("my_page-2").as_str(), "my_page-2");
        assert_eq!(ModuleName::sanitize("").as_str(), "index");
        assert_eq!(ModuleName::sanitize("!!!").as_str(), "index");
        assert_eq!(ModuleName::sanitize("日本語").as_str(), "index");
    }

    #[test]
    fn test_module_name_deserialize_sanitizes() {
        let name: ModuleName = serde_json::from_str(r#""../etc/passwd""#).unwrap();
        assert_eq!(name.as_str(), "etcpasswd");

        let empty: ModuleName = serde_json::from_str(r#""""#).unwrap();
        assert_eq!(empty.as_str(), "index");

        assert_eq!(serde_json::to_string(&name).unwrap(), r#""etcpasswd""#);
    }

    #[test]
    fn test_module_path_is_relative() {
        let name = ModuleName::sanitize("about");
        assert_eq!(ModulePath::new("controller", &name).as_str(), "./controller/about.js");
        assert_eq!(ModulePath::new("/controller/", &name).as_str(), "./controller/about.js");
        assert_eq!(ModulePath::new("./pages", &name).as_str(), "./pages/about.js");
        assert_eq!(ModulePath::new("", &name).as_str(), "./about.js");
    }

    #[test]
    fn test_fragment_request_state_machine() {
        let mut request = FragmentRequest::new("#footer", "http://localhost/footer.html");
        assert_eq!(request.state, FragmentState::Pending);

        request.begin();
        assert_eq!(request.state, FragmentState::Fetching);

        request.finish(FragmentOutcome::FailedStatus { status: 404 });
        request.finish(FragmentOutcome::Injected { bytes: 10 });
        assert_eq!(
            request.outcome(),
            Some(&FragmentOutcome::FailedStatus { status: 404 })
        );
    }

    #[test]
    fn test_outcome_into_result() {
        let ok = FragmentOutcome::Injected { bytes: 3 }.into_result("u");
        assert_eq!(ok.unwrap(), 3);

        let err = FragmentOutcome::FailedStatus { status: 500 }
            .into_result("http://x/nav.html")
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
