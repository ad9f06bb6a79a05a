//! Content resolution
//!
//! Maps an opaque identifier to a storage key by searching the content
//! trees. Because the content model evolved (flat lists → day-nested
//! lists → module-level documents) old and new shapes coexist, so the
//! resolver tries an ordered list of lookup strategies rather than
//! assuming a single shape. Adding a fifth shape later is one new entry
//! in the table.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};

use super::db::CatalogQuery;
use super::types::{ContentNode, ContentType, Week};

/// A resolved identifier: where the bytes live plus display metadata
#[derive(Debug, Clone)]
pub struct ResolvedContent {
    pub storage_key: String,
    pub title: Option<String>,
    pub content_type: Option<ContentType>,
}

/// The parts of a course or shared-content tree the lookup strategies
/// operate on. Both tree kinds flatten to this view, so one strategy
/// table serves both.
#[derive(Clone, Copy)]
pub struct TreeView<'t> {
    pub weeks: &'t [Week],
    /// Course-level documents outside the week hierarchy
    pub extra_documents: &'t [ContentNode],
}

type LookupFn = for<'t> fn(TreeView<'t>, Uuid) -> Option<&'t ContentNode>;

/// Lookup strategies in priority order; first hit wins
const LOOKUP_STRATEGIES: &[(&str, LookupFn)] = &[
    ("other-documents", find_in_extra_documents),
    ("legacy-week-contents", find_in_week_contents),
    ("day-contents", find_in_day_contents),
    ("week-documents", find_in_week_documents),
];

fn find_in_extra_documents<'t>(tree: TreeView<'t>, id: Uuid) -> Option<&'t ContentNode> {
    tree.extra_documents.iter().find(|node| node.id == id)
}

fn find_in_week_contents<'t>(tree: TreeView<'t>, id: Uuid) -> Option<&'t ContentNode> {
    tree.weeks
        .iter()
        .flat_map(|week| &week.contents)
        .find(|node| node.id == id)
}

fn find_in_day_contents<'t>(tree: TreeView<'t>, id: Uuid) -> Option<&'t ContentNode> {
    tree.weeks
        .iter()
        .flat_map(|week| &week.days)
        .flat_map(|day| &day.contents)
        .find(|node| node.id == id)
}

fn find_in_week_documents<'t>(tree: TreeView<'t>, id: Uuid) -> Option<&'t ContentNode> {
    tree.weeks
        .iter()
        .flat_map(|week| &week.documents)
        .find(|node| node.id == id)
}

/// Search one tree, returning the matching node and the name of the
/// strategy that found it
pub fn search_tree<'t>(tree: TreeView<'t>, id: Uuid) -> Option<(&'static str, &'t ContentNode)> {
    LOOKUP_STRATEGIES
        .iter()
        .find_map(|&(name, lookup)| lookup(tree, id).map(|node| (name, node)))
}

/// Resolves opaque identifiers to storage keys
#[derive(Clone)]
pub struct ContentLocator {
    catalog: Arc<dyn CatalogQuery>,
}

impl ContentLocator {
    pub fn new(catalog: Arc<dyn CatalogQuery>) -> Self {
        Self { catalog }
    }

    /// Resolve an identifier to a storage key.
    ///
    /// Identifiers that are not node ids are treated literally as
    /// storage keys: directly-addressed assets such as generated
    /// thumbnails have no catalog entry. Node ids are searched across
    /// all course trees first, then (only on a complete miss) across
    /// the shared-content trees.
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedContent> {
        let Ok(id) = Uuid::parse_str(identifier) else {
            return Ok(ResolvedContent {
                storage_key: identifier.to_string(),
                title: None,
                content_type: None,
            });
        };

        for course in self.catalog.courses().await? {
            let view = TreeView {
                weeks: &course.weeks,
                extra_documents: &course.other_documents,
            };
            if let Some((strategy, node)) = search_tree(view, id) {
                tracing::debug!(
                    content_id = %id,
                    course_id = %course.id,
                    strategy = strategy,
                    "Resolved content in course tree"
                );
                return resolved(node);
            }
        }

        for shared in self.catalog.shared_contents().await? {
            let view = TreeView {
                weeks: &shared.weeks,
                extra_documents: &shared.other_documents,
            };
            if let Some((strategy, node)) = search_tree(view, id) {
                tracing::debug!(
                    content_id = %id,
                    shared_content_id = %shared.id,
                    strategy = strategy,
                    "Resolved content in shared-content tree"
                );
                return resolved(node);
            }
        }

        Err(AppError::NotFound(format!(
            "No content found for identifier {}",
            identifier
        )))
    }
}

fn resolved(node: &ContentNode) -> Result<ResolvedContent> {
    let storage_key = node.storage_key.clone().ok_or_else(|| {
        AppError::NotFound(format!("Content {} has no stored asset", node.id))
    })?;

    Ok(ResolvedContent {
        storage_key,
        title: Some(node.title.clone()),
        content_type: Some(node.content_type),
    })
}
