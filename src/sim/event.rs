/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    ObstacleSpawned { speed: f32 },
    ObstaclePassed { score: u32 },
    Collision { x: f32 },
}
