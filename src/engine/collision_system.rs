use super::*;

use crate::config::PersistPolicy;
use crate::constants::{
    ARROW_POINTS, CHEST_POINTS, ELF_POINTS, MONSTER_HIT_PENALTY, MONSTER_KILL_POINTS,
    POTION_POINTS,
};
use crate::types::{SoundCue, WallState};

impl GameState {
    /// Collision-start callback. Pair order does not matter.
    pub fn on_collision(&mut self, a: Body, b: Body) {
        match (a, b) {
            (Body::Player, other) | (other, Body::Player) => self.player_hit(other),
            (Body::Arrow { id }, other) | (other, Body::Arrow { id }) => self.arrow_hit(id, other),
            _ => {}
        }
    }

    fn player_hit(&mut self, other: Body) {
        match other {
            Body::Pickup { kind } => self.collect_pickup(kind),
            Body::Arrow { id } => self.retrieve_arrow(id),
            Body::Monster { .. } => self.monster_hit_player(),
            Body::Player | Body::Wall { .. } => {}
        }
    }

    fn arrow_hit(&mut self, id: ArrowId, other: Body) {
        let Some(fired) = self.arrows.iter().find(|arrow| arrow.id == id).map(|arrow| arrow.fired) else {
            return;
        };
        if !fired {
            return;
        }
        match other {
            Body::Wall { cell, side } => {
                if self.grid.wall(cell, side) == Some(WallState::Closed) {
                    self.stop_arrow(id);
                }
            }
            Body::Monster { id: monster_id } => self.kill_monster(monster_id),
            _ => {}
        }
    }

    fn collect_pickup(&mut self, kind: PickupKind) {
        match kind {
            PickupKind::Elf => {
                self.add_score(ELF_POINTS);
                self.relocate_pickup(kind);
                self.play(SoundCue::PlayerHitElf);
                self.raise_top_score_on_gain();
            }
            PickupKind::Chest => {
                self.add_score(CHEST_POINTS);
                self.relocate_pickup(kind);
                self.raise_top_score();
                self.persist_top_score();
                self.play(SoundCue::PlayerHitChest);
            }
            PickupKind::Potion => {
                self.add_score(POTION_POINTS);
                self.relocate_pickup(kind);
                self.set_invincible(true);
                self.play(SoundCue::PlayerHitPotion);
                self.raise_top_score_on_gain();
            }
        }
    }

    /// Picks up an arrow lying on the floor. Arrows in flight are ignored.
    fn retrieve_arrow(&mut self, id: ArrowId) {
        let Some(arrow) = self.arrows.iter_mut().find(|arrow| arrow.id == id) else {
            return;
        };
        if arrow.fired || !arrow.active {
            return;
        }
        arrow.active = false;
        arrow.mover.halt();
        arrow.body.velocity = Vec3::ZERO;
        self.quiver.push_back(id);
        self.events.push(RuntimeEvent::ArrowPooled { id });
        self.add_score(ARROW_POINTS);
        self.play(SoundCue::PlayerHitArrow);
        self.raise_top_score_on_gain();
    }

    fn monster_hit_player(&mut self) {
        if self.player.invincible {
            return;
        }
        let next = (self.score - MONSTER_HIT_PENALTY).max(0);
        if next != self.score {
            self.score = next;
            self.events.push(RuntimeEvent::ScoreChanged { score: next });
        }
        self.play(SoundCue::MonsterHitPlayer);
    }

    fn stop_arrow(&mut self, id: ArrowId) {
        let Some(arrow) = self.arrows.iter_mut().find(|arrow| arrow.id == id) else {
            return;
        };
        arrow.fired = false;
        arrow.mover.halt();
        arrow.body.velocity = Vec3::ZERO;
        self.events.push(RuntimeEvent::ArrowStopped { id });
        self.play(SoundCue::ArrowHitWall);
    }

    /// The grid boundary is solid for arrows even where the edge cells' own
    /// walls are open. Escaped arrows are pulled back onto the edge and stopped.
    pub(super) fn contain_arrows(&mut self) {
        let escaped: Vec<ArrowId> = self
            .arrows
            .iter()
            .filter(|arrow| arrow.fired && self.grid.cell_at(arrow.body.position).is_none())
            .map(|arrow| arrow.id)
            .collect();
        if escaped.is_empty() {
            return;
        }
        let floor = self.grid.floor_bounds();
        let inset = self.config.wall_thickness * 0.5;
        for id in escaped {
            if let Some(arrow) = self.arrows.iter_mut().find(|arrow| arrow.id == id) {
                let position = arrow.body.position;
                arrow.body.position = Vec3::new(
                    position.x.min(floor.max.x - inset).max(floor.min.x + inset),
                    position.y,
                    position.z.min(floor.max.z - inset).max(floor.min.z + inset),
                );
            }
            self.stop_arrow(id);
        }
    }

    fn kill_monster(&mut self, id: MonsterId) {
        let Some(index) = self.monsters.iter().position(|monster| monster.id == id) else {
            return;
        };
        self.monsters.remove(index);
        if index < self.scheduler.monster_turn {
            self.scheduler.monster_turn -= 1;
        }
        if self.scheduler.monster_turn >= self.monsters.len() {
            self.scheduler.monster_turn = 0;
        }
        self.events.push(RuntimeEvent::MonsterRemoved { id });
        self.add_score(MONSTER_KILL_POINTS);
        if self.raise_top_score() {
            self.persist_top_score();
        }
        self.play(SoundCue::ArrowHitMonster);
    }

    fn add_score(&mut self, points: i32) {
        self.score += points;
        self.events.push(RuntimeEvent::ScoreChanged { score: self.score });
    }

    /// `top = max(top, score)`. Returns true when the top score changed.
    fn raise_top_score(&mut self) -> bool {
        if !self.store.offer(self.score) {
            return false;
        }
        self.events.push(RuntimeEvent::TopScoreChanged {
            top_score: self.store.value(),
        });
        true
    }

    /// Raise path for pickups that do not force a save of their own.
    fn raise_top_score_on_gain(&mut self) {
        if self.raise_top_score() && self.config.persist_policy == PersistPolicy::OnTopScoreChange {
            self.persist_top_score();
        }
    }

    fn persist_top_score(&mut self) {
        if self.store.file_path().is_none() {
            return;
        }
        match self.store.save() {
            Ok(()) => self.events.push(RuntimeEvent::TopScoreSaved {
                top_score: self.store.value(),
            }),
            Err(error) => log::warn!("[top-score] save failed: {error}"),
        }
    }

    fn play(&mut self, cue: SoundCue) {
        self.events.push(RuntimeEvent::Sound { cue });
    }
}
