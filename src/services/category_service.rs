//! Service categories: the cached tree and the default seed set.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::infra::repositories::NewCategory;
use crate::infra::{Cache, UnitOfWork};
use domain::{build_category_tree, CategoryNode};

/// One entry of the default category set
struct SeedCategory {
    name: &'static str,
    slug: &'static str,
    icon: &'static str,
    description: &'static str,
    children: &'static [(&'static str, &'static str, &'static str)],
}

/// Default categories for the Mexican market. Children are `(name, slug, description)`.
const DEFAULT_CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Plomería",
        slug: "plomeria",
        icon: "wrench",
        description: "Instalación, reparación y mantenimiento de sistemas de agua, drenaje y gas",
        children: &[
            (
                "Instalación",
                "plomeria-instalacion",
                "Tuberías, llaves, regaderas y calentadores",
            ),
            (
                "Reparación",
                "plomeria-reparacion",
                "Fugas, tuberías rotas y problemas de presión",
            ),
            (
                "Desazolve",
                "plomeria-desazolve",
                "Destapado de cañerías y drenajes",
            ),
            (
                "Calentadores",
                "plomeria-calentadores",
                "Calentadores de agua de gas y eléctricos",
            ),
        ],
    },
    SeedCategory {
        name: "Electricidad",
        slug: "electricidad",
        icon: "zap",
        description: "Instalaciones eléctricas residenciales y comerciales",
        children: &[
            (
                "Instalación Eléctrica",
                "electricidad-instalacion",
                "Cableado, tableros y contactos",
            ),
            (
                "Reparación",
                "electricidad-reparacion",
                "Cortocircuitos, contactos y apagadores",
            ),
            (
                "Iluminación",
                "electricidad-iluminacion",
                "Lámparas y sistemas de iluminación LED",
            ),
            (
                "Emergencias",
                "electricidad-emergencias",
                "Apagones y fallas críticas",
            ),
        ],
    },
    SeedCategory {
        name: "Carpintería",
        slug: "carpinteria",
        icon: "hammer",
        description: "Trabajos en madera, muebles, puertas y reparaciones",
        children: &[
            (
                "Muebles a Medida",
                "carpinteria-muebles",
                "Closets, cocinas y libreros",
            ),
            (
                "Puertas y Ventanas",
                "carpinteria-puertas-ventanas",
                "Instalación y reparación de marcos",
            ),
            (
                "Pisos de Madera",
                "carpinteria-pisos",
                "Instalación y pulido de pisos",
            ),
        ],
    },
    SeedCategory {
        name: "Limpieza",
        slug: "limpieza",
        icon: "sparkles",
        description: "Limpieza residencial, comercial y especializada",
        children: &[
            (
                "Limpieza Residencial",
                "limpieza-residencial",
                "Casas, departamentos y condominios",
            ),
            (
                "Limpieza Profunda",
                "limpieza-profunda",
                "Desinfección y sanitización",
            ),
            (
                "Limpieza Post-Obra",
                "limpieza-post-obra",
                "Después de remodelaciones",
            ),
        ],
    },
    SeedCategory {
        name: "Pintura",
        slug: "pintura",
        icon: "paintbrush",
        description: "Pintura interior y exterior y acabados decorativos",
        children: &[
            (
                "Pintura Interior",
                "pintura-interior",
                "Paredes, techos y texturizados",
            ),
            ("Pintura Exterior", "pintura-exterior", "Fachadas y bardas"),
            (
                "Impermeabilización",
                "pintura-impermeabilizacion",
                "Techos y azoteas",
            ),
        ],
    },
    SeedCategory {
        name: "Jardinería",
        slug: "jardineria",
        icon: "leaf",
        description: "Diseño, mantenimiento y poda de jardines",
        children: &[
            (
                "Mantenimiento de Jardines",
                "jardineria-mantenimiento",
                "Corte de pasto y limpieza",
            ),
            (
                "Poda de Árboles",
                "jardineria-poda",
                "Poda y derribo de árboles",
            ),
        ],
    },
];

#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Every category as roots with their children
    async fn tree(&self) -> AppResult<Vec<CategoryNode>>;

    /// Insert the default categories that are missing. Returns how many were created.
    async fn seed_defaults(&self) -> AppResult<usize>;
}

pub struct CategoryCatalog<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Option<Arc<Cache>>,
}

impl<U: UnitOfWork> CategoryCatalog<U> {
    /// `cache` is optional; without it every call reads the database.
    pub fn new(uow: Arc<U>, cache: Option<Arc<Cache>>) -> Self {
        Self { uow, cache }
    }

    async fn cached_tree(&self) -> Option<Vec<CategoryNode>> {
        let cache = self.cache.as_ref()?;
        match cache.get_category_tree().await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(error = %e, "Category cache read failed");
                None
            }
        }
    }

    async fn ensure(&self, category: NewCategory) -> AppResult<(uuid::Uuid, bool)> {
        let categories = self.uow.categories();
        if let Some(existing) = categories.find_by_slug(&category.slug).await? {
            return Ok((existing.id, false));
        }
        let created = categories.create(category).await?;
        Ok((created.id, true))
    }
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryCatalog<U> {
    async fn tree(&self) -> AppResult<Vec<CategoryNode>> {
        if let Some(tree) = self.cached_tree().await {
            return Ok(tree);
        }

        let tree = build_category_tree(self.uow.categories().list().await?);
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_category_tree(&tree).await {
                tracing::warn!(error = %e, "Category cache write failed");
            }
        }
        Ok(tree)
    }

    async fn seed_defaults(&self) -> AppResult<usize> {
        let mut created = 0;
        for root in DEFAULT_CATEGORIES {
            let (root_id, inserted) = self
                .ensure(NewCategory {
                    name: root.name.to_string(),
                    slug: root.slug.to_string(),
                    description: Some(root.description.to_string()),
                    icon: Some(root.icon.to_string()),
                    parent_id: None,
                })
                .await?;
            created += usize::from(inserted);

            for (name, slug, description) in root.children {
                let (_, inserted) = self
                    .ensure(NewCategory {
                        name: name.to_string(),
                        slug: slug.to_string(),
                        description: Some(description.to_string()),
                        icon: None,
                        parent_id: Some(root_id),
                    })
                    .await?;
                created += usize::from(inserted);
            }
        }

        if created > 0 {
            if let Some(cache) = &self.cache {
                cache.invalidate_category_tree().await?;
            }
        }
        tracing::info!(created, "Default categories seeded");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_slugs_are_unique() {
        let mut slugs = HashSet::new();
        for root in DEFAULT_CATEGORIES {
            assert!(slugs.insert(root.slug), "duplicate slug {}", root.slug);
            for (_, slug, _) in root.children {
                assert!(slugs.insert(*slug), "duplicate slug {}", slug);
            }
        }
    }
}
