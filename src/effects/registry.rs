use rand::Rng;

use crate::effects::{
    ColorShiftEffect, Effect, EffectKind, EffectParams, PanEffect, PuzzleRevealEffect,
    RippleEffect, RotateEffect, ShakeZoomEffect, SplitSlideEffect, ZoomEffect,
};
use crate::error::{EffectError, Result};

/// Builds an effect from its parameter bag
pub type EffectFactory = fn(&EffectParams) -> Result<Box<dyn Effect>>;

/// Registry of the effects available for selection
///
/// Effects are kept in a fixed order so listing and seeded random choice are
/// stable from run to run.
pub struct EffectRegistry {
    effects: Vec<(EffectKind, EffectFactory)>,
}

fn factory(kind: EffectKind) -> EffectFactory {
    match kind {
        EffectKind::Zoom => |p| Ok(Box::new(ZoomEffect::from_params(p)?)),
        EffectKind::Pan => |p| Ok(Box::new(PanEffect::from_params(p)?)),
        EffectKind::Rotate => |p| Ok(Box::new(RotateEffect::from_params(p)?)),
        EffectKind::ShakeZoom => |p| Ok(Box::new(ShakeZoomEffect::from_params(p)?)),
        EffectKind::ColorShift => |p| Ok(Box::new(ColorShiftEffect::from_params(p)?)),
        EffectKind::Ripple => |p| Ok(Box::new(RippleEffect::from_params(p)?)),
        EffectKind::SplitSlide => |p| Ok(Box::new(SplitSlideEffect::from_params(p)?)),
        EffectKind::PuzzleReveal => |p| Ok(Box::new(PuzzleRevealEffect::from_params(p)?)),
    }
}

impl EffectRegistry {
    /// Create a registry with every built-in effect
    pub fn new() -> Self {
        Self::with_enabled(&EffectKind::ALL)
    }

    /// Create a registry holding only `enabled`, in built-in order.
    ///
    /// An empty list enables every effect.
    pub fn with_enabled(enabled: &[EffectKind]) -> Self {
        let effects = EffectKind::ALL
            .iter()
            .copied()
            .filter(|kind| enabled.is_empty() || enabled.contains(kind))
            .map(|kind| (kind, factory(kind)))
            .collect();
        Self { effects }
    }

    /// Replace the factory used for `kind`, adding the effect if missing
    pub fn register(&mut self, kind: EffectKind, factory: EffectFactory) {
        match self.effects.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = factory,
            None => self.effects.push((kind, factory)),
        }
    }

    /// Registered effects in selection order
    pub fn list_effects(&self) -> Vec<EffectKind> {
        self.effects.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|(kind, _)| kind.name()).collect()
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|(k, _)| *k == kind)
    }

    /// Instantiate `kind` with `params`, validating them
    pub fn build(&self, kind: EffectKind, params: &EffectParams) -> Result<Box<dyn Effect>> {
        let (_, factory) = self
            .effects
            .iter()
            .find(|(k, _)| *k == kind)
            .ok_or_else(|| EffectError::Unknown {
                name: kind.name().to_string(),
            })?;
        factory(params)
    }

    /// Pick one registered effect uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EffectKind> {
        if self.effects.is_empty() {
            return None;
        }
        Some(self.effects[rng.gen_range(0..self.effects.len())].0)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_effects_available() {
        let registry = EffectRegistry::new();

        assert_eq!(registry.len(), 8);
        assert_eq!(registry.list_effects(), EffectKind::ALL.to_vec());
        assert_eq!(registry.names()[0], "zoom");
        assert_eq!(registry.names()[7], "puzzle_reveal");
    }

    #[test]
    fn test_build_effect() {
        let registry = EffectRegistry::new();
        let params = EffectParams::new();

        for kind in EffectKind::ALL {
            let effect = registry.build(kind, &params).unwrap();
            assert_eq!(effect.kind(), kind);
            assert_eq!(effect.metadata().randomized, kind.is_randomized());
        }
    }

    #[test]
    fn test_build_disabled_effect_is_unknown() {
        let registry = EffectRegistry::with_enabled(&[EffectKind::Zoom, EffectKind::Ripple]);

        assert_eq!(registry.list_effects(), vec![EffectKind::Zoom, EffectKind::Ripple]);
        assert!(!registry.has_effect(EffectKind::Pan));
        assert!(matches!(
            registry.build(EffectKind::Pan, &EffectParams::new()),
            Err(ReelError::Effect(EffectError::Unknown { .. }))
        ));
    }

    #[test]
    fn test_build_rejects_bad_parameters() {
        let registry = EffectRegistry::new();
        let params = EffectParams::new().set("num_splits", 0u32);
        assert!(matches!(
            registry.build(EffectKind::SplitSlide, &params),
            Err(ReelError::Effect(EffectError::InvalidParameters { .. }))
        ));
    }

    #[test]
    fn test_choose_is_seeded_and_covers_registry() {
        let registry = EffectRegistry::new();

        let picks = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            (0..200).map(|_| registry.choose(&mut rng).unwrap()).collect::<Vec<_>>()
        };

        let first = picks(3);
        assert_eq!(first, picks(3));
        for kind in EffectKind::ALL {
            assert!(first.contains(&kind), "{} never chosen", kind);
        }

        assert!(EffectRegistry::with_enabled(&[]).choose(&mut SmallRng::seed_from_u64(0)).is_some());
    }

    #[test]
    fn test_custom_factory_registration() {
        let mut registry = EffectRegistry::with_enabled(&[EffectKind::Zoom]);
        registry.register(EffectKind::Pan, |p| Ok(Box::new(PanEffect::from_params(p)?)));

        assert!(registry.has_effect(EffectKind::Pan));
        assert_eq!(registry.len(), 2);
    }
}
