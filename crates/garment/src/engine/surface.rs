//! Region colors and fabric textures.

use std::sync::Arc;

use drape_config::FabricConfig;
use tracing::{debug, info};

use super::DecalEngine;
use crate::error::EngineError;
use crate::fabric::{render_pattern, sampler_for};
use crate::scene_graph::{PrimitiveId, TextureData};
use crate::types::{RegionId, Rgb};

impl DecalEngine {
    /// Recolor a region and every primitive it owns
    pub fn set_region_color(&mut self, region: &RegionId, hex: &str) -> Result<(), EngineError> {
        let color = Rgb::from_hex(hex)?;
        self.region_state_mut(region)?.color = color;
        self.apply_region_color(region);
        self.dirty = true;
        debug!("Region {} color set to {}", region, color.to_hex());
        Ok(())
    }

    /// Recolor the active region (the UI color picker)
    pub fn set_active_region_color(&mut self, hex: &str) -> Result<(), EngineError> {
        let region = self.active_region.clone().ok_or(EngineError::NoActiveRegion)?;
        self.set_region_color(&region, hex)
    }

    /// Switch fabric.
    ///
    /// The fabric texture is applied to every primitive not owned by a
    /// region that carries decals.
    pub fn set_fabric(&mut self, fabric_id: &str) -> Result<(), EngineError> {
        if self.config.fabric(fabric_id).is_none() {
            return Err(EngineError::UnknownFabric(fabric_id.to_string()));
        }
        self.fabric_id = fabric_id.to_string();
        let regions: Vec<RegionId> = self.catalog.ids().collect();
        self.apply_fabric(&regions);
        self.dirty = true;
        info!("Fabric set to {}", fabric_id);
        Ok(())
    }

    /// The active fabric, if any is configured
    pub fn active_fabric(&self) -> Option<&FabricConfig> {
        self.config.fabric(&self.fabric_id)
    }

    pub(crate) fn apply_region_color(&mut self, region: &RegionId) {
        let Some(color) = self.region_color(region) else {
            return;
        };
        let targets: Vec<PrimitiveId> = self.index.primitives(region).to_vec();
        for id in targets {
            self.scene.update_material(id, |material| material.color = color);
        }
    }

    /// Apply the active fabric to the decal-free primitives of `regions`
    pub(crate) fn apply_fabric(&mut self, regions: &[RegionId]) {
        if self.index.is_empty() {
            return;
        }
        let Some(fabric) = self.active_fabric().cloned() else {
            debug!("No fabric to apply");
            return;
        };

        let targets: Vec<PrimitiveId> = regions
            .iter()
            .filter(|region| !self.region_has_decals(region))
            .flat_map(|region| self.index.primitives(region).iter().copied())
            .filter(|id| {
                self.index
                    .regions_for(*id)
                    .iter()
                    .all(|owner| !self.region_has_decals(owner))
            })
            .collect();
        if targets.is_empty() {
            return;
        }

        let size = self.config.assets.fabric_texture_size;
        let scene = &mut self.scene;
        let texture = self.fabric_textures.get_or_create(&fabric.id, || {
            debug!("Rendering {} fabric texture ({}x{})", fabric.id, size, size);
            scene.create_texture(TextureData {
                label: format!("fabric:{}", fabric.id),
                image: Arc::new(render_pattern(fabric.pattern, size)),
                sampler: sampler_for(fabric.pattern),
            })
        });

        for id in targets {
            self.scene.update_material(id, |material| {
                material.texture = Some(texture);
                material.roughness = fabric.roughness;
                material.metalness = fabric.metalness;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn material_texture(engine: &DecalEngine, region: &str) -> Option<crate::scene_graph::TextureId> {
        let id = engine
            .region_index()
            .first_primitive(&RegionId::from(region))
            .unwrap();
        engine.scene().material(id).unwrap().texture
    }

    #[test]
    fn test_region_color_applies_to_primitives() {
        let mut engine = loaded_engine();
        let region = RegionId::from("gala");
        engine.set_region_color(&region, "#D4A5A5").unwrap();
        let id = engine.region_index().first_primitive(&region).unwrap();
        assert_eq!(engine.scene().material(id).unwrap().color.to_hex(), "#D4A5A5");
        assert!(matches!(
            engine.set_region_color(&region, "pink"),
            Err(EngineError::InvalidColor(_))
        ));
    }

    /// Material of every primitive the region owns
    fn region_materials(engine: &DecalEngine, region: &str) -> Vec<crate::scene_graph::MaterialState> {
        engine
            .region_index()
            .primitives(&RegionId::from(region))
            .iter()
            .map(|id| engine.scene().material(*id).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_region_color_reaches_every_owned_primitive() {
        let mut engine = engine_with(split_front_garment());
        let back_before = region_materials(&engine, "back");
        engine.set_region_color(&RegionId::from("front"), "#B8956A").unwrap();

        let front = region_materials(&engine, "front");
        assert_eq!(front.len(), 2);
        assert!(front.iter().all(|m| m.color.to_hex() == "#B8956A"));
        assert_eq!(region_materials(&engine, "back"), back_before);
    }

    #[test]
    fn test_fabric_skips_every_primitive_of_decal_region() {
        let mut engine = engine_with(split_front_garment());
        let original: Vec<_> = region_materials(&engine, "front")
            .iter()
            .map(|m| m.texture)
            .collect();
        add_ready_decal(&mut engine, "front");

        engine.set_fabric("lawn").unwrap();
        let front: Vec<_> = region_materials(&engine, "front")
            .iter()
            .map(|m| m.texture)
            .collect();
        assert_eq!(front, original);

        let back = region_materials(&engine, "back");
        assert_eq!(back.len(), 2);
        assert!(back.iter().all(|m| m.texture.is_some() && !original.contains(&m.texture)));
    }

    #[test]
    fn test_active_region_color() {
        let mut engine = loaded_engine();
        engine.set_active_region_color("#000").unwrap();
        assert_eq!(
            engine.region_color(&RegionId::from("front")),
            Some(Rgb { r: 0, g: 0, b: 0 })
        );
    }

    #[test]
    fn test_fabric_skips_decal_regions() {
        let mut engine = loaded_engine();
        let original = material_texture(&engine, "front");
        add_ready_decal(&mut engine, "front");

        engine.set_fabric("velvet").unwrap();
        let velvet = material_texture(&engine, "back");
        assert_ne!(velvet, original);
        assert_eq!(material_texture(&engine, "front"), original);

        let velvet_material = engine
            .scene()
            .material(engine.region_index().first_primitive(&RegionId::from("back")).unwrap())
            .unwrap();
        assert!((velvet_material.roughness - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_fabric_texture_cached() {
        let mut engine = loaded_engine();
        let first = material_texture(&engine, "back");
        engine.set_fabric("lawn").unwrap();
        engine.set_fabric("cotton-silk").unwrap();
        assert_eq!(material_texture(&engine, "back"), first);
        // cotton-silk and lawn
        assert_eq!(engine.scene().texture_count(), 2);
    }

    #[test]
    fn test_unknown_fabric_rejected() {
        let mut engine = loaded_engine();
        assert!(matches!(
            engine.set_fabric("denim"),
            Err(EngineError::UnknownFabric(_))
        ));
        assert_eq!(engine.active_fabric_id(), "cotton-silk");
    }

    #[test]
    fn test_fabric_restored_after_last_decal_removed() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        engine.set_fabric("chiffon").unwrap();
        let chiffon = material_texture(&engine, "back");
        assert_ne!(material_texture(&engine, "front"), chiffon);

        engine.remove_decal(&key.region, &key.decal).unwrap();
        assert_eq!(material_texture(&engine, "front"), chiffon);
    }
}
