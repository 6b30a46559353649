//! Gaze state tracking for a single target object

use crate::foundation::collections::NodeId;
use super::Scene;

/// Transition reported by [`LookStateDetector::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookEvent {
    /// The gaze entered the target this frame
    Start,
    /// The gaze stayed on the target
    Looking,
    /// The gaze left the target, or the target was hidden or destroyed
    End,
}

/// Per-target look state machine, updated once per frame
#[derive(Debug, Clone)]
pub struct LookStateDetector {
    target: NodeId,
    looking: bool,
}

impl LookStateDetector {
    /// Track gaze on `target`
    pub fn new(target: NodeId) -> Self {
        Self { target, looking: false }
    }

    /// Tracked object
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Whether the last update saw the gaze on the target
    pub fn is_looking(&self) -> bool {
        self.looking
    }

    /// Advance one frame
    ///
    /// A stale target counts as not looked at, so it ends an active look
    /// exactly once and then stays idle.
    pub fn update(&mut self, scene: &Scene) -> Option<LookEvent> {
        let now = scene.is_looking_at(self.target).unwrap_or(false);
        let event = match (self.looking, now) {
            (false, true) => Some(LookEvent::Start),
            (true, true) => Some(LookEvent::Looking),
            (true, false) => Some(LookEvent::End),
            (false, false) => None,
        };
        self.looking = now;
        if let Some(event) = event {
            if event != LookEvent::Looking {
                log::debug!("Look {:?} on {:?}", event, self.target);
            }
        }
        event
    }
}
