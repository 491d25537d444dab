//! Per-render shared state

use crate::animation::AnimationKind;
use std::collections::BTreeSet;

/// State shared by every compile call of one page render.
///
/// Create one per request or render pass and thread it through all compile
/// calls for that render. Never share one across concurrent renders.
#[derive(Debug, Default)]
pub struct RenderContext {
    library_emitted: bool,
    emitted: BTreeSet<AnimationKind>,
    compiled_instances: usize,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything emitted so far, as if a new render had started.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check-and-set for the full keyframe library. Returns the families not
    /// yet emitted in this render and marks every family as emitted.
    pub fn claim_library(&mut self) -> Vec<AnimationKind> {
        if self.library_emitted {
            return Vec::new();
        }
        self.library_emitted = true;
        AnimationKind::ALL
            .into_iter()
            .filter(|kind| self.emitted.insert(*kind))
            .collect()
    }

    /// Check-and-set for one keyframe family. False if the family, or the
    /// whole library, was already emitted in this render.
    pub fn claim_keyframes(&mut self, kind: AnimationKind) -> bool {
        if self.library_emitted {
            return false;
        }
        self.emitted.insert(kind)
    }

    pub fn keyframes_emitted(&self, kind: AnimationKind) -> bool {
        self.library_emitted || self.emitted.contains(&kind)
    }

    pub fn library_emitted(&self) -> bool {
        self.library_emitted
    }

    pub(crate) fn record_compile(&mut self) {
        self.compiled_instances += 1;
    }

    pub fn compiled_instances(&self) -> usize {
        self.compiled_instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_claimed_once() {
        let mut ctx = RenderContext::new();
        assert!(ctx.claim_keyframes(AnimationKind::Fade));
        assert!(!ctx.claim_keyframes(AnimationKind::Fade));
        assert!(ctx.claim_keyframes(AnimationKind::Bounce));
        assert!(ctx.keyframes_emitted(AnimationKind::Fade));
        assert!(!ctx.keyframes_emitted(AnimationKind::Pulse));
    }

    #[test]
    fn test_library_covers_all_families() {
        let mut ctx = RenderContext::new();
        assert_eq!(ctx.claim_library().len(), AnimationKind::ALL.len());
        assert!(ctx.claim_library().is_empty());
        assert!(!ctx.claim_keyframes(AnimationKind::Flip));

        ctx.reset();
        assert!(!ctx.library_emitted());
        assert!(ctx.claim_keyframes(AnimationKind::Flip));
    }

    #[test]
    fn test_library_skips_claimed_families() {
        let mut ctx = RenderContext::new();
        assert!(ctx.claim_keyframes(AnimationKind::Fade));

        let remaining = ctx.claim_library();
        assert_eq!(remaining.len(), AnimationKind::ALL.len() - 1);
        assert!(!remaining.contains(&AnimationKind::Fade));
        assert!(ctx.keyframes_emitted(AnimationKind::Pulse));
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut first = RenderContext::new();
        let mut second = RenderContext::new();
        assert!(first.claim_keyframes(AnimationKind::ZoomIn));
        assert!(second.claim_keyframes(AnimationKind::ZoomIn));
    }
}
