//! Hierarchy resolver: computes the closure of pages to export for one space.
//!
//! - [`PageSelection::WholeSpace`] exports exactly what the space listing returns.
//! - [`PageSelection::Named`] resolves each title and expands its descendants
//!   depth-first, pre-order, with an explicit worklist.
//!
//! Descendant expansion keeps a visited set per named root and a depth bound,
//! so malformed ancestry from the service (a page listed as its own
//! descendant) cannot loop forever. Duplicates across different named roots
//! are kept.

use std::collections::HashSet;

use tracing::{info, instrument, warn};

use crate::gateway::{ContentGateway, Page};

/// Default bound on descendant depth below a named page.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Which pages of a space to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page in the space.
    WholeSpace,
    /// The named pages and all of their descendants, in the given order.
    Named(Vec<String>),
}

impl PageSelection {
    /// An empty title list selects the whole space.
    #[must_use]
    pub fn from_titles(titles: Vec<String>) -> Self {
        if titles.is_empty() {
            Self::WholeSpace
        } else {
            Self::Named(titles)
        }
    }
}

/// One configured export target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceTarget {
    /// Space key as used by the service.
    pub space_key: String,
    /// Pages to export from it.
    pub selection: PageSelection,
}

impl SpaceTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(space_key: impl Into<String>, selection: PageSelection) -> Self {
        Self {
            space_key: space_key.into(),
            selection,
        }
    }
}

/// The resolved set of pages for one target, in discovery order.
#[derive(Debug, Default)]
pub struct Closure {
    /// Pages to export.
    pub pages: Vec<Page>,
    /// Named titles that could not be resolved.
    pub missing: Vec<String>,
    /// Subtrees skipped because of a repeated page or the depth bound.
    pub pruned: usize,
    /// Listing calls that ended early with an error.
    pub interrupted_listings: usize,
}

/// Computes page closures through a [`ContentGateway`].
pub struct HierarchyResolver<'a, G: ContentGateway + ?Sized> {
    gateway: &'a G,
    max_depth: usize,
}

impl<'a, G: ContentGateway + ?Sized> HierarchyResolver<'a, G> {
    /// Creates a resolver with [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the descendant depth bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolves the closure for `target`.
    #[instrument(skip(self, target), fields(space = %target.space_key))]
    pub async fn resolve(&self, target: &SpaceTarget) -> Closure {
        match &target.selection {
            PageSelection::WholeSpace => self.whole_space(&target.space_key).await,
            PageSelection::Named(titles) => self.named_pages(&target.space_key, titles).await,
        }
    }

    async fn whole_space(&self, space_key: &str) -> Closure {
        let listing = self.gateway.list_pages_in_space(space_key).await;
        let mut closure = Closure::default();
        if let Some(error) = &listing.interruption {
            warn!(space = space_key, error = %error, "space listing incomplete; exporting pages fetched so far");
            closure.interrupted_listings += 1;
        }
        closure.pages = listing.into_items();
        info!(space = space_key, pages = closure.pages.len(), "found pages in space");
        closure
    }

    async fn named_pages(&self, space_key: &str, titles: &[String]) -> Closure {
        let mut closure = Closure::default();
        info!(space = space_key, named = titles.len(), "exporting named pages including child pages");

        for title in titles {
            let found = match self.gateway.find_page_by_title(space_key, title).await {
                Ok(found) => found,
                Err(error) => {
                    warn!(space = space_key, title = %title, error = %error, "page lookup failed");
                    None
                }
            };

            let Some(root) = found else {
                warn!(space = space_key, title = %title, "page not found in space; skipping");
                closure.missing.push(title.clone());
                continue;
            };

            let before = closure.pages.len();
            self.expand_descendants(root, &mut closure).await;
            let descendants = closure.pages.len() - before - 1;
            if descendants > 0 {
                info!(title = %title, descendants, "found child pages");
            }
        }
        closure
    }

    /// Appends `root` and its descendants to `closure` in pre-order.
    async fn expand_descendants(&self, root: Page, closure: &mut Closure) {
        let mut visited = HashSet::from([root.id.clone()]);
        let mut stack = vec![(root, 0_usize)];

        while let Some((page, depth)) = stack.pop() {
            let page_id = page.id.clone();
            closure.pages.push(page);

            if depth >= self.max_depth {
                warn!(page_id = %page_id, depth, "depth bound reached; children not expanded");
                closure.pruned += 1;
                continue;
            }

            let listing = self.gateway.list_child_pages(&page_id).await;
            if listing.interruption.is_some() {
                closure.interrupted_listings += 1;
            }

            let mut children = Vec::new();
            for child in listing.into_items() {
                if visited.insert(child.id.clone()) {
                    children.push((child, depth + 1));
                } else {
                    warn!(parent = %page_id, page_id = %child.id, "page repeats within its own subtree; skipping");
                    closure.pruned += 1;
                }
            }
            stack.extend(children.into_iter().rev());
        }
    }
}
