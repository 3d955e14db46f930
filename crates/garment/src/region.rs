//! Garment regions and primitive classification.
//!
//! A primitive belongs to every region with a matcher that is a substring of
//! its lowercased name. Region order in the catalog is the priority order;
//! a primitive claimed by several regions is recorded in all of them and
//! reported as ambiguous so content authors can rename it.

use std::collections::HashMap;

use drape_config::RegionConfig;
use tracing::warn;

use crate::scene_graph::PrimitiveId;
use crate::types::RegionId;

/// Ordered set of garment regions
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<RegionConfig>,
}

impl RegionCatalog {
    /// Build a catalog; matchers are lowercased for case-insensitive matching
    pub fn new(regions: &[RegionConfig]) -> Self {
        let regions = regions
            .iter()
            .map(|r| RegionConfig {
                matchers: r.matchers.iter().map(|m| m.to_lowercase()).collect(),
                ..r.clone()
            })
            .collect();
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionConfig> {
        self.regions.iter()
    }

    /// Region ids in priority order
    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.iter().map(|r| RegionId::new(r.id.clone()))
    }

    pub fn get(&self, id: &RegionId) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.id == id.as_str())
    }

    pub fn contains(&self, id: &RegionId) -> bool {
        self.get(id).is_some()
    }

    /// Every region whose matchers hit `name`, in priority order
    pub fn classify(&self, name: &str) -> Vec<RegionId> {
        let lowered = name.to_lowercase();
        self.regions
            .iter()
            .filter(|r| r.matchers.iter().any(|m| lowered.contains(m.as_str())))
            .map(|r| RegionId::new(r.id.clone()))
            .collect()
    }

    /// Classify a whole model
    pub fn build_index<'a>(
        &self,
        primitives: impl IntoIterator<Item = (PrimitiveId, &'a str)>,
    ) -> RegionIndex {
        let mut index = RegionIndex::default();
        for (primitive, name) in primitives {
            let regions = self.classify(name);
            if regions.len() > 1 {
                warn!(
                    "Primitive '{}' matches {} regions ({}); recording it in all of them",
                    name,
                    regions.len(),
                    regions
                        .iter()
                        .map(RegionId::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                index.ambiguous.push(primitive);
            }
            if regions.is_empty() {
                index.unclassified.push(primitive);
            }
            for region in &regions {
                index
                    .by_region
                    .entry(region.clone())
                    .or_default()
                    .push(primitive);
            }
            index.by_primitive.insert(primitive, regions);
        }
        index
    }
}

/// Result of classifying a model's primitives
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    by_region: HashMap<RegionId, Vec<PrimitiveId>>,
    by_primitive: HashMap<PrimitiveId, Vec<RegionId>>,
    ambiguous: Vec<PrimitiveId>,
    unclassified: Vec<PrimitiveId>,
}

impl RegionIndex {
    /// Primitives owned by a region, in traversal order
    pub fn primitives(&self, region: &RegionId) -> &[PrimitiveId] {
        self.by_region.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The primitive decals of a region are projected onto
    pub fn first_primitive(&self, region: &RegionId) -> Option<PrimitiveId> {
        self.primitives(region).first().copied()
    }

    /// Regions claiming a primitive, in priority order
    pub fn regions_for(&self, primitive: PrimitiveId) -> &[RegionId] {
        self.by_primitive
            .get(&primitive)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Primitives claimed by more than one region
    pub fn ambiguous(&self) -> &[PrimitiveId] {
        &self.ambiguous
    }

    /// Primitives no region claimed
    pub fn unclassified(&self) -> &[PrimitiveId] {
        &self.unclassified
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty()
    }
}
