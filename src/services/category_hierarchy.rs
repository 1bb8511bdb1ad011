// src/services/category_hierarchy.rs

use std::{collections::HashSet, sync::Arc};

use uuid::Uuid;

use crate::{
    common::error::{AppError, DependentKind, EntityKind, HierarchyViolation},
    db::CatalogStore,
    models::catalog::Category,
};

/// Profundidade máxima da árvore (raiz = 1).
pub const MAX_DEPTH: u32 = 3;

/// Limite de saltos ao subir pelos pais; passou disso, é ciclo.
const MAX_HOPS: u32 = 10;

#[derive(Clone)]
pub struct CategoryHierarchy {
    store: Arc<dyn CatalogStore>,
}

impl CategoryHierarchy {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Profundidade (1 = raiz) subindo pelos pais. Um pai inexistente encerra
    /// a subida como se fosse raiz.
    pub async fn compute_depth(&self, category_id: Uuid) -> Result<u32, AppError> {
        let (depth, _) = self.ancestry(category_id).await?;
        Ok(depth)
    }

    /// Valida `candidate_parent_id` como pai de `child_id` (ou de uma
    /// categoria nova, quando `None`) e devolve o pai.
    pub async fn validate_parent_assignment(
        &self,
        candidate_parent_id: Uuid,
        child_id: Option<Uuid>,
    ) -> Result<Category, AppError> {
        // 1. O pai precisa existir
        let parent = self
            .store
            .find_category(candidate_parent_id)
            .await?
            .ok_or(AppError::not_found(EntityKind::Category, candidate_parent_id))?;

        // 2. Não pode ser pai de si mesma
        if child_id == Some(candidate_parent_id) {
            return Err(AppError::InvalidHierarchy(HierarchyViolation::SelfParent));
        }

        // 3. Nem ficar abaixo de um descendente próprio
        let (parent_depth, ancestors) = self.ancestry(candidate_parent_id).await?;
        if let Some(child_id) = child_id {
            if ancestors.contains(&child_id) {
                return Err(AppError::InvalidHierarchy(HierarchyViolation::Cycle));
            }
        }

        // 4. A subárvore movida inteira precisa caber no limite
        let moved_height = match child_id {
            Some(child_id) => self.subtree_height(child_id).await?,
            None => 1,
        };
        if parent_depth + moved_height > MAX_DEPTH {
            return Err(AppError::InvalidHierarchy(HierarchyViolation::TooDeep {
                max_depth: MAX_DEPTH,
            }));
        }

        Ok(parent)
    }

    /// Só apaga categoria sem produtos e sem filhas.
    pub async fn ensure_deletable(&self, category_id: Uuid) -> Result<(), AppError> {
        let products = self.store.count_products_in_category(category_id).await?;
        if products > 0 {
            return Err(AppError::HasDependents {
                entity: EntityKind::Category,
                id: category_id,
                kind: DependentKind::Products,
                count: products,
            });
        }

        let children = self.store.list_child_category_ids(category_id).await?.len() as i64;
        if children > 0 {
            return Err(AppError::HasDependents {
                entity: EntityKind::Category,
                id: category_id,
                kind: DependentKind::ChildCategories,
                count: children,
            });
        }

        Ok(())
    }

    /// Sobe da categoria até a raiz. Devolve a profundidade e os ids
    /// visitados (incluindo a própria categoria).
    async fn ancestry(&self, category_id: Uuid) -> Result<(u32, HashSet<Uuid>), AppError> {
        let mut visited = HashSet::new();
        let mut current = Some(category_id);
        let mut depth = 0;

        while let Some(id) = current {
            let Some(category) = self.store.find_category(id).await? else {
                break;
            };
            if !visited.insert(id) || depth >= MAX_HOPS {
                return Err(AppError::InvalidHierarchy(HierarchyViolation::Cycle));
            }
            depth += 1;
            current = category.parent_id;
        }

        Ok((depth, visited))
    }

    /// Níveis da subárvore, contando a própria categoria (folha = 1).
    async fn subtree_height(&self, category_id: Uuid) -> Result<u32, AppError> {
        let mut level = vec![category_id];
        let mut seen: HashSet<Uuid> = HashSet::from([category_id]);
        let mut height = 0;

        while !level.is_empty() {
            height += 1;
            if height > MAX_HOPS {
                return Err(AppError::InvalidHierarchy(HierarchyViolation::Cycle));
            }

            let mut next = Vec::new();
            for id in level {
                for child in self.store.list_child_category_ids(id).await? {
                    if seen.insert(child) {
                        next.push(child);
                    }
                }
            }
            level = next;
        }

        Ok(height)
    }
}
