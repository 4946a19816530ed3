//! Open-loop straight-line motion toward a target point.
//!
//! The interpolator never moves anything itself. It sets a velocity on the
//! body, lets the physics step integrate it, and on each fixed tick checks
//! whether the expected travel time has passed. If the body drifted more than
//! the arrival threshold away from the destination it re-aims.

use crate::constants::ARRIVAL_THRESHOLD;
use crate::types::Vec3;

/// Position and linear velocity of a rigid body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Kinematics {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
        }
    }

    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    Moving,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Idle,
    Moving,
    Reissued,
    Arrived,
}

#[derive(Clone, Debug)]
pub struct MoveInterpolator {
    state: MoveState,
    destination: Vec3,
    speed: f32,
    stop_on_arrival: bool,
    travel_time: f32,
    elapsed: f32,
}

impl Default for MoveInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveInterpolator {
    pub fn new() -> Self {
        Self {
            state: MoveState::Idle,
            destination: Vec3::ZERO,
            speed: 0.0,
            stop_on_arrival: true,
            travel_time: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == MoveState::Moving
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn move_to(&mut self, body: &mut Kinematics, destination: Vec3, speed: f32, stop_on_arrival: bool) {
        if !speed.is_finite() || speed <= 0.0 {
            log::debug!("move_to ignored: invalid speed {speed}");
            return;
        }
        let delta = destination - body.position;
        self.destination = destination;
        self.speed = speed;
        self.stop_on_arrival = stop_on_arrival;
        self.travel_time = delta.length() / speed;
        self.elapsed = 0.0;
        self.state = MoveState::Moving;
        body.velocity = delta.normalized() * speed;
    }

    /// Drops any motion in progress without touching the velocity.
    pub fn halt(&mut self) {
        self.state = MoveState::Idle;
        self.elapsed = 0.0;
    }

    pub fn fixed_update(&mut self, body: &mut Kinematics, dt: f32) -> MoveOutcome {
        if self.state != MoveState::Moving {
            return MoveOutcome::Idle;
        }
        self.elapsed += dt;
        if self.elapsed < self.travel_time {
            return MoveOutcome::Moving;
        }

        if body.position.distance(self.destination) > ARRIVAL_THRESHOLD {
            let (destination, speed, stop) = (self.destination, self.speed, self.stop_on_arrival);
            self.move_to(body, destination, speed, stop);
            return MoveOutcome::Reissued;
        }

        self.state = MoveState::Idle;
        if self.stop_on_arrival {
            body.velocity = Vec3::ZERO;
        }
        MoveOutcome::Arrived
    }
}
