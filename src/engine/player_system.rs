use super::*;

use crate::constants::{ARROW_FLIGHT_DISTANCE, ARROW_HEIGHT};
use crate::scene::{AnimationRequest, CLIP_ATTACK, CLIP_IDLE, CLIP_RUN};
use crate::types::SoundCue;

const ATTACK_PLAYBACK_SPEED: f32 = 3.0;

impl GameState {
    /// Vertical keys set the direction first, horizontal keys override the
    /// facing when both are held.
    pub(super) fn move_player(&mut self) {
        let intent = self.player.intent;
        let mut direction = Vec3::ZERO;
        if intent.up {
            direction += Direction::Top.unit();
            self.player.facing = Direction::Top;
        } else if intent.down {
            direction += Direction::Bottom.unit();
            self.player.facing = Direction::Bottom;
        }
        if intent.left {
            direction += Direction::Left.unit();
            self.player.facing = Direction::Left;
        } else if intent.right {
            direction += Direction::Right.unit();
            self.player.facing = Direction::Right;
        }

        let attacking = self.player.rig.is_playing(CLIP_ATTACK);
        if direction.length_squared() <= 0.0 {
            if !attacking && !self.player.rig.is_playing(CLIP_IDLE) {
                self.player.rig.animate_subtree(&AnimationRequest::looped(CLIP_IDLE));
            }
            self.player.body.velocity = Vec3::ZERO;
            return;
        }

        if !attacking && !self.player.rig.is_playing(CLIP_RUN) {
            self.player.rig.animate_subtree(&AnimationRequest::looped(CLIP_RUN));
        }
        self.player.body.velocity = direction.normalized() * self.config.player_speed;
    }

    /// Fires the oldest quivered arrow along the player's facing.
    pub(super) fn shoot_arrow(&mut self) {
        let Some(id) = self.quiver.pop_front() else {
            return;
        };
        let origin = self.player.body.position + Vec3::new(0.0, ARROW_HEIGHT, 0.0);
        let facing = self.player.facing;
        let speed = self.config.arrow_speed;
        let Some(arrow) = self.arrows.iter_mut().find(|arrow| arrow.id == id) else {
            log::debug!("quivered arrow {} no longer exists", id.0);
            return;
        };
        arrow.fired = true;
        arrow.active = true;
        arrow.body = Kinematics::at(origin);
        let destination = origin + facing.unit() * ARROW_FLIGHT_DISTANCE;
        arrow.mover.move_to(&mut arrow.body, destination, speed, true);

        self.player
            .rig
            .animate_subtree(&AnimationRequest::once(CLIP_ATTACK, ATTACK_PLAYBACK_SPEED));
        self.events.push(RuntimeEvent::ArrowFired { id, facing });
        self.events.push(RuntimeEvent::Sound {
            cue: SoundCue::ShootArrow,
        });
    }
}
