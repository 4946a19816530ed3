//! Minimal scene-graph subtree for actor rigs and animation playback.

use crate::constants::ATTACK_CLIP_SECONDS;

pub const CLIP_IDLE: &str = "Models/archerIdle.ani";
pub const CLIP_RUN: &str = "Models/archerRun1.ani";
pub const CLIP_ATTACK: &str = "Models/archerAttack.ani";

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationRequest {
    pub clip: String,
    pub layer: u8,
    pub looped: bool,
    pub fade_time: f32,
    pub exclusive: bool,
    pub speed: f32,
}

impl AnimationRequest {
    pub fn looped(clip: &str) -> Self {
        Self {
            clip: clip.to_string(),
            layer: 0,
            looped: true,
            fade_time: 0.0,
            exclusive: true,
            speed: 1.0,
        }
    }

    pub fn once(clip: &str, speed: f32) -> Self {
        Self {
            clip: clip.to_string(),
            layer: 0,
            looped: false,
            fade_time: 0.0,
            exclusive: true,
            speed,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct PlayingClip {
    clip: String,
    looped: bool,
    speed: f32,
    remaining: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationController {
    playing: Vec<PlayingClip>,
}

impl AnimationController {
    pub fn play(&mut self, request: &AnimationRequest) {
        if request.exclusive {
            self.playing.clear();
        } else {
            self.playing.retain(|clip| clip.clip != request.clip);
        }
        let speed = if request.speed > 0.0 { request.speed } else { 1.0 };
        self.playing.push(PlayingClip {
            clip: request.clip.clone(),
            looped: request.looped,
            speed,
            remaining: ATTACK_CLIP_SECONDS / speed,
        });
    }

    pub fn is_playing(&self, clip: &str) -> bool {
        self.playing.iter().any(|playing| playing.clip == clip)
    }

    pub fn current(&self) -> Option<&str> {
        self.playing.last().map(|playing| playing.clip.as_str())
    }

    pub fn stop_all(&mut self) {
        self.playing.clear();
    }

    /// One-shot clips fade out once their length has played.
    pub fn advance(&mut self, dt: f32) {
        for playing in &mut self.playing {
            if !playing.looped {
                playing.remaining -= dt;
            }
        }
        self.playing.retain(|playing| playing.looped || playing.remaining > 0.0);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub enabled: bool,
    pub animation: Option<AnimationController>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            animation: None,
            children: Vec::new(),
        }
    }

    pub fn animated(name: &str) -> Self {
        Self {
            animation: Some(AnimationController::default()),
            ..Self::new(name)
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Finds a descendant by slash separated path, e.g. `"archer/bow"`.
    pub fn find(&self, path: &str) -> Option<&SceneNode> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |node, part| node.child(part))
    }

    /// Applies the request to every animated node in the subtree.
    pub fn animate_subtree(&mut self, request: &AnimationRequest) {
        let mut stack: Vec<&mut SceneNode> = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(controller) = node.animation.as_mut() {
                controller.play(request);
            }
            stack.extend(node.children.iter_mut());
        }
    }

    pub fn advance_subtree(&mut self, dt: f32) {
        let mut stack: Vec<&mut SceneNode> = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(controller) = node.animation.as_mut() {
                controller.advance(dt);
            }
            stack.extend(node.children.iter_mut());
        }
    }

    pub fn set_enabled_recursive(&mut self, enabled: bool) {
        let mut stack: Vec<&mut SceneNode> = vec![self];
        while let Some(node) = stack.pop() {
            node.enabled = enabled;
            stack.extend(node.children.iter_mut());
        }
    }

    /// Whether the root's own controller is playing the clip.
    pub fn is_playing(&self, clip: &str) -> bool {
        self.animation
            .as_ref()
            .map(|controller| controller.is_playing(clip))
            .unwrap_or(false)
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.animation.as_ref().and_then(AnimationController::current)
    }
}

/// The archer rig: an animated body with an animated bow and a sparkle
/// effect node toggled by invincibility.
pub fn archer_rig() -> SceneNode {
    SceneNode::animated("archer")
        .with_child(SceneNode::animated("bow"))
        .with_child(SceneNode::animated("quiver").with_child(SceneNode::new("strap")))
        .with_child(SceneNode::new("invincibilitysparkle"))
}
