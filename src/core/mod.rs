pub mod document;
pub mod includer;
pub mod refresh;
pub mod resolver;
pub mod site;
pub mod site_build;

pub use crate::domain::model::{FragmentOutcome, FragmentRequest, IncludeReport, ModuleName, ModulePath};
pub use crate::domain::ports::{FragmentSource, SiteConfigProvider};
pub use crate::utils::error::Result;
