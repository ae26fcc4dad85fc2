use crate::core::resolver::{PageContext, PageModule};
use crate::utils::error::Result;
use async_trait::async_trait;

pub struct IndexPage;

#[async_trait]
impl PageModule for IndexPage {
    async fn run(&self, ctx: &mut PageContext) -> Result<()> {
        super::render_intro(
            ctx,
            "Home - Example",
            "Welcome - Home Page",
            "This content was rendered by the index page module.",
        );
        super::load_footer(ctx).await
    }
}
