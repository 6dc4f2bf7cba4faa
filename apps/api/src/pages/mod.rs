// Pages: persistence, resolution with visibility rules, owner mutations, the render
// cache and the static pre-render pass.

pub mod cache;
pub mod editing;
pub mod handlers;
pub mod resolver;
pub mod static_gen;
pub mod store;

pub use cache::RenderCache;
pub use resolver::PageResolver;
pub use store::{PageStore, PgPageStore};
