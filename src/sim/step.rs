/// The step function: advances the world by one tick.
///
/// Processing order (only while Playing):
///   1. Jump request
///   2. Player gravity
///   3. Spawn check
///   4. Obstacle pass: move, score if off-screen, collision test
///   5. Difficulty ramp (speed pushed to all live obstacles)
///
/// GameOver freezes the world: `step` returns immediately.
/// The Playing gate is evaluated once at the top, so the tick that ends
/// the run still finishes its obstacle pass and ramp.

use rand::Rng;

use crate::domain::entity::{FrameInput, Obstacle};
use crate::domain::physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng>(world: &mut WorldState, input: FrameInput, rng: &mut R) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_jump(world, input, &mut events);
    world.player.update();
    resolve_spawn(world, rng, &mut events);
    resolve_obstacles(world, &mut events);
    resolve_ramp(world);

    events
}

// ══════════════════════════════════════════════════════════════
// Stages
// ══════════════════════════════════════════════════════════════

fn resolve_jump(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    if input.jump && world.player.jump() {
        events.push(GameEvent::Jumped);
    }
}

fn resolve_spawn<R: Rng>(world: &mut WorldState, rng: &mut R, events: &mut Vec<GameEvent>) {
    if world.spawner.tick(rng) {
        world.obstacles.push(Obstacle::at_right_edge(world.speed));
        events.push(GameEvent::ObstacleSpawned { speed: world.speed });
    }
}

/// Single partitioning pass over the live set.
///
/// Every obstacle is moved, then checked for passage AND collision; an
/// obstacle that is both off-screen and overlapping is scored and ends
/// the run in the same tick. Survivors are collected into a new Vec.
pub(crate) fn resolve_obstacles(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let live = std::mem::take(&mut world.obstacles);
    let mut kept = Vec::with_capacity(live.len());

    for mut obstacle in live {
        obstacle.update();

        let passed = obstacle.is_off_screen();
        if passed {
            world.score += 1;
            events.push(GameEvent::ObstaclePassed { score: world.score });
        }

        if physics::hits(&world.player, &obstacle) {
            world.phase = Phase::GameOver;
            events.push(GameEvent::Collision { x: obstacle.x });
        }

        if !passed {
            kept.push(obstacle);
        }
    }

    world.obstacles = kept;
}

fn resolve_ramp(world: &mut WorldState) {
    world.ramp_ticks += 1;
    world.speed = rules::ramped_speed(world.profile, world.ramp_ticks, world.tick_rate);
    for obstacle in &mut world.obstacles {
        obstacle.speed = world.speed;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
