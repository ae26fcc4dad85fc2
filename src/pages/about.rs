use crate::core::resolver::{PageContext, PageModule};
use crate::utils::error::Result;
use async_trait::async_trait;

pub struct AboutPage;

#[async_trait]
impl PageModule for AboutPage {
    async fn run(&self, ctx: &mut PageContext) -> Result<()> {
        super::render_intro(
            ctx,
            "About - Example",
            "About This Site",
            "This page was picked from the page registry by its file name.",
        );
        super::load_footer(ctx).await
    }
}
