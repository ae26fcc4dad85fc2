//! Built-in page modules, one per HTML page.

pub mod about;
pub mod index;

use crate::core::resolver::{PageContext, PageRegistry};
use crate::utils::error::{Result, ScaffoldError};

/// Fragment shared by every built-in page.
pub const FOOTER_SELECTOR: &str = "#footer";
pub const FOOTER_FRAGMENT: &str = "./footer.html";

pub fn default_registry(module_dir: &str) -> PageRegistry {
    let mut registry = PageRegistry::new(module_dir);
    registry
        .register("index", index::IndexPage)
        .register("about", about::AboutPage);
    registry
}

/// Title, a fresh app container, heading and paragraph.
pub(crate) fn render_intro(ctx: &mut PageContext, title: &str, heading: &str, paragraph: &str) {
    ctx.document.set_title(title);
    ctx.document.clear_app();
    ctx.document.render_heading(heading);
    ctx.document.render_paragraph(paragraph);
}

/// Footer fragment plus the copyright year. A page without `#footer` is not an error.
pub(crate) async fn load_footer(ctx: &mut PageContext) -> Result<()> {
    match ctx.load_fragment(FOOTER_SELECTOR, FOOTER_FRAGMENT).await {
        Ok(_) => {}
        Err(ScaffoldError::ContainerNotFound { selector }) => {
            tracing::debug!("Page has no {} container, footer skipped", selector);
        }
        Err(e) => return Err(e),
    }
    ctx.document.setup_year_element();
    Ok(())
}
