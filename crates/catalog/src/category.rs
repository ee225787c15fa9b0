use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity};

/// Deepest level a category may sit at (roots are level 0).
pub const MAX_CATEGORY_LEVEL: u8 = 10;
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
    parent: Option<CategoryId>,
    level: u8,
    active: bool,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The category forest.
///
/// Owns every category so it can enforce the tree invariants: names are unique,
/// parents exist, `level == parent.level + 1` (0 for roots), and no cycles.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: BTreeMap<CategoryId, Category>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.nodes.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let name = name.trim();
        self.nodes.values().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn children(&self, id: CategoryId) -> impl Iterator<Item = &Category> {
        self.nodes.values().filter(move |c| c.parent == Some(id))
    }

    pub fn insert(
        &mut self,
        id: CategoryId,
        name: &str,
        description: Option<&str>,
        parent: Option<CategoryId>,
    ) -> DomainResult<&Category> {
        if self.nodes.contains_key(&id) {
            return Err(DomainError::conflict(format!("category {id} already exists")));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        if name.chars().count() > MAX_CATEGORY_NAME_LEN {
            return Err(DomainError::validation(format!(
                "category name cannot exceed {MAX_CATEGORY_NAME_LEN} characters"
            )));
        }
        if self.find_by_name(name).is_some() {
            return Err(DomainError::conflict(format!("category name {name:?} is taken")));
        }
        let level = self.level_under(parent)?;

        let category = Category {
            id,
            name: name.to_string(),
            description: description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            parent,
            level,
            active: true,
        };
        Ok(self.nodes.entry(id).or_insert(category))
    }

    pub fn set_active(&mut self, id: CategoryId, active: bool) -> DomainResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("category {id}")))?;
        node.active = active;
        Ok(())
    }

    /// Move `id` (and its subtree) under `new_parent`, re-leveling every descendant.
    pub fn reparent(&mut self, id: CategoryId, new_parent: Option<CategoryId>) -> DomainResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(DomainError::not_found(format!("category {id}")));
        }
        if let Some(p) = new_parent {
            if p == id || self.ancestors(p).any(|a| a.id == id) {
                return Err(DomainError::invariant(format!(
                    "moving {id} under {p} would create a cycle"
                )));
            }
        }
        let level = self.level_under(new_parent)?;
        let depth = self.subtree_depth(id);
        if u16::from(level) + u16::from(depth) > u16::from(MAX_CATEGORY_LEVEL) {
            return Err(DomainError::invariant(format!(
                "subtree would exceed max level {MAX_CATEGORY_LEVEL}"
            )));
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = new_parent;
        }
        self.relevel(id, level);
        Ok(())
    }

    /// Walks from the parent of `id` up to the root.
    pub fn ancestors(&self, id: CategoryId) -> impl Iterator<Item = &Category> {
        let mut next = self.nodes.get(&id).and_then(|c| c.parent);
        std::iter::from_fn(move || {
            let node = self.nodes.get(&next?)?;
            next = node.parent;
            Some(node)
        })
    }

    /// "Fashion > Men > Shirts".
    pub fn full_path(&self, id: CategoryId) -> Option<String> {
        let node = self.nodes.get(&id)?;
        let mut names: Vec<&str> = self.ancestors(id).map(|c| c.name.as_str()).collect();
        names.reverse();
        names.push(node.name.as_str());
        Some(names.join(" > "))
    }

    fn level_under(&self, parent: Option<CategoryId>) -> DomainResult<u8> {
        match parent {
            None => Ok(0),
            Some(p) => {
                let parent = self
                    .nodes
                    .get(&p)
                    .ok_or_else(|| DomainError::not_found(format!("parent category {p}")))?;
                if parent.level >= MAX_CATEGORY_LEVEL {
                    return Err(DomainError::invariant(format!(
                        "categories cannot nest deeper than level {MAX_CATEGORY_LEVEL}"
                    )));
                }
                Ok(parent.level + 1)
            }
        }
    }

    fn subtree_depth(&self, id: CategoryId) -> u8 {
        self.children(id)
            .map(|c| 1 + self.subtree_depth(c.id))
            .max()
            .unwrap_or(0)
    }

    fn relevel(&mut self, id: CategoryId, level: u8) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.level = level;
        }
        let children: Vec<CategoryId> = self.children(id).map(|c| c.id).collect();
        for child in children {
            self.relevel(child, level + 1);
        }
    }
}
