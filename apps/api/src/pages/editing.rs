//! Owner-side mutations: create, metadata, publication, layout save, structural edits.
//!
//! Each mutation checks ownership, validates its input, and drops the page's public
//! render from the cache so the next visit renders fresh.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{normalize_layout, Node, NodePath, Props, RawLayout};
use crate::models::page::{validate_slug, NewPage, Page, PageMetadataUpdate, PageRow};
use crate::pages::cache::RenderCache;
use crate::pages::store::PageStore;
use crate::render::{BuiltinCatalog, EditorSession};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Page {id} not found"))
}

/// Loads a page for its owner. A page owned by someone else is reported as missing.
async fn load_owned(store: &dyn PageStore, id: Uuid, user_id: Uuid) -> Result<PageRow, AppError> {
    match store.find_by_id(id).await? {
        Some(row) if row.user_id == user_id => Ok(row),
        _ => Err(not_found(id)),
    }
}

fn require_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    Ok(())
}

pub async fn create_page(store: &dyn PageStore, new_page: NewPage) -> Result<Page, AppError> {
    require_title(&new_page.title)?;
    validate_slug(&new_page.slug).map_err(AppError::Validation)?;

    let row = store.create(&new_page).await?;
    info!("Created page {} ('{}') for user {}", row.id, row.slug, row.user_id);
    Ok(Page::from(row))
}

/// Title, description and slug changes. The slug is frozen once the page is published.
pub async fn update_metadata(
    store: &dyn PageStore,
    cache: &RenderCache,
    id: Uuid,
    user_id: Uuid,
    update: PageMetadataUpdate,
) -> Result<Page, AppError> {
    let current = load_owned(store, id, user_id).await?;

    if let Some(title) = &update.title {
        require_title(title)?;
    }
    if let Some(slug) = &update.slug {
        if *slug != current.slug {
            if current.published {
                return Err(AppError::Validation(
                    "slug cannot change while the page is published".to_string(),
                ));
            }
            validate_slug(slug).map_err(AppError::Validation)?;
        }
    }

    let row = store
        .update_metadata(id, user_id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;

    cache.invalidate(&current.slug).await;
    cache.invalidate(&row.slug).await;
    Ok(Page::from(row))
}

pub async fn set_published(
    store: &dyn PageStore,
    cache: &RenderCache,
    id: Uuid,
    user_id: Uuid,
    published: bool,
) -> Result<Page, AppError> {
    let row = store
        .set_published(id, user_id, published)
        .await?
        .ok_or_else(|| not_found(id))?;

    cache.invalidate(&row.slug).await;
    info!(
        "Page {} is now {}",
        row.id,
        if published { "published" } else { "unpublished" }
    );
    Ok(Page::from(row))
}

/// Accepts an object, a JSON-encoded object string, or `null` (clears the layout).
/// Anything else is rejected rather than silently stored.
pub fn layout_for_save(raw: Value) -> Result<Option<Value>, AppError> {
    if raw.is_null() {
        return Ok(None);
    }
    normalize_layout(RawLayout::from(raw))
        .map(|doc| Some(doc.into_value()))
        .ok_or_else(|| AppError::Validation("layout must be a JSON object".to_string()))
}

pub async fn save_layout(
    store: &dyn PageStore,
    cache: &RenderCache,
    id: Uuid,
    user_id: Uuid,
    raw: Value,
) -> Result<Page, AppError> {
    let layout = layout_for_save(raw)?;

    let row = store
        .save_layout(id, user_id, layout.as_ref())
        .await?
        .ok_or_else(|| not_found(id))?;

    cache.invalidate(&row.slug).await;
    info!("Saved layout for page {}", row.id);
    Ok(Page::from(row))
}

/// One structural edit. Paths use the dotted form shown in the editor (`"0.2.1"`);
/// a missing parent addresses the top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Insert {
        parent: Option<NodePath>,
        index: usize,
        node: Value,
    },
    Remove {
        path: NodePath,
    },
    Move {
        from: NodePath,
        to_parent: Option<NodePath>,
        index: usize,
    },
    UpdateProps {
        path: NodePath,
        props: Map<String, Value>,
    },
}

fn apply_op(session: &mut EditorSession<'_, BuiltinCatalog>, op: EditOp) -> Result<(), AppError> {
    match op {
        EditOp::Insert {
            parent,
            index,
            node,
        } => {
            let node = Node::from_value(&node)
                .ok_or_else(|| AppError::Validation("node must be a JSON object".to_string()))?;
            if !node.kind.is_known() {
                return Err(AppError::Validation(format!(
                    "unknown component type '{}'",
                    node.kind
                )));
            }
            session.insert_node(parent.as_ref(), index, node)?;
        }
        EditOp::Remove { path } => {
            session.remove_node(&path)?;
        }
        EditOp::Move {
            from,
            to_parent,
            index,
        } => {
            session.move_node(&from, to_parent.as_ref(), index)?;
        }
        EditOp::UpdateProps { path, props } => {
            session.update_props(&path, Props::from(props))?;
        }
    }
    Ok(())
}

/// Applies `ops` in order to the stored layout and saves the result. The first failing
/// op rejects the whole batch and nothing is written.
pub async fn apply_edits(
    store: &dyn PageStore,
    cache: &RenderCache,
    id: Uuid,
    user_id: Uuid,
    ops: Vec<EditOp>,
) -> Result<Page, AppError> {
    let page = Page::from(load_owned(store, id, user_id).await?);
    let mut session = EditorSession::open(page.layout.as_ref(), &BuiltinCatalog);
    for op in ops {
        apply_op(&mut session, op)?;
    }
    if !session.is_dirty() {
        return Ok(page);
    }
    save_layout(store, cache, id, user_id, session.to_document().into_value()).await
}
