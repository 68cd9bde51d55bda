/// Entities: Player (the jumping rectangle) and Obstacle (a cactus).
/// All coordinates are logical playfield units, origin top-left, y grows down.

/// Logical playfield size.
pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 300.0;

/// Ground line: nothing rests below this y.
pub const GROUND_Y: f32 = 250.0;

pub const PLAYER_X: f32 = 50.0;
pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 40.0;

pub const OBSTACLE_WIDTH: f32 = 20.0;
pub const OBSTACLE_HEIGHT: f32 = 30.0;

pub const DEFAULT_GRAVITY: f32 = 1.0;
pub const DEFAULT_JUMP_IMPULSE: f32 = 15.0;

/// Frame input for one simulation tick.
/// Jump is edge-triggered: one fresh press = one request.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub jump: bool,
}

/// Axis-aligned box, used for overlap tests and drawing.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_y: f32,
    pub is_jumping: bool,
    gravity: f32,
    jump_impulse: f32,
}

impl Player {
    pub fn new() -> Self {
        Self::with_physics(DEFAULT_GRAVITY, DEFAULT_JUMP_IMPULSE)
    }

    /// Player standing on the ground with custom gravity and jump impulse.
    pub fn with_physics(gravity: f32, jump_impulse: f32) -> Self {
        Player {
            x: PLAYER_X,
            y: GROUND_Y - PLAYER_HEIGHT,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            vel_y: 0.0,
            is_jumping: false,
            gravity,
            jump_impulse,
        }
    }

    /// Resting y: the player's top edge when standing on the ground.
    pub fn ground_line(&self) -> f32 {
        GROUND_Y - self.height
    }

    /// Start a jump. Returns false (and changes nothing) while airborne.
    pub fn jump(&mut self) -> bool {
        if self.is_jumping {
            return false;
        }
        self.vel_y = -self.jump_impulse;
        self.is_jumping = true;
        true
    }

    /// One tick of gravity, then clamp to the ground.
    pub fn update(&mut self) {
        self.vel_y += self.gravity;
        self.y += self.vel_y;
        if self.y >= self.ground_line() {
            self.y = self.ground_line();
            self.vel_y = 0.0;
            self.is_jumping = false;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.width, h: self.height }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// A cactus. Its speed is owned by the session and pushed in every tick.
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Obstacle {
    pub fn new(x: f32, speed: f32) -> Self {
        Obstacle {
            x,
            y: GROUND_Y - OBSTACLE_HEIGHT,
            width: OBSTACLE_WIDTH,
            height: OBSTACLE_HEIGHT,
            speed,
        }
    }

    /// Obstacle entering at the right edge of the playfield.
    pub fn at_right_edge(speed: f32) -> Self {
        Self::new(SCREEN_WIDTH, speed)
    }

    pub fn update(&mut self) {
        self.x -= self.speed;
    }

    /// Fully past the left edge.
    pub fn is_off_screen(&self) -> bool {
        self.x < -self.width
    }

    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.width, h: self.height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_starts_on_ground() {
        let p = Player::new();
        assert_eq!(p.y, 210.0);
        assert!(!p.is_jumping);
        assert_eq!(p.vel_y, 0.0);
    }

    #[test]
    fn jump_sets_impulse_and_airborne() {
        let mut p = Player::new();
        assert!(p.jump());
        assert_eq!(p.vel_y, -15.0);
        assert!(p.is_jumping);
    }

    #[test]
    fn mid_air_jump_is_noop() {
        let mut p = Player::new();
        p.jump();
        p.update();
        p.update();
        let vel = p.vel_y;
        assert!(!p.jump());
        assert_eq!(p.vel_y, vel);
    }

    #[test]
    fn parabolic_trajectory_until_landing() {
        let mut p = Player::new();
        let start_y = p.y;
        p.jump();

        // vel after k ticks = -15 + k; y = start + sum of those velocities
        let mut expected_y = start_y;
        for k in 1..=28 {
            p.update();
            let vel = -15.0 + k as f32;
            expected_y += vel;
            assert_eq!(p.vel_y, vel, "velocity at tick {k}");
            assert_eq!(p.y, expected_y, "height at tick {k}");
            assert!(p.is_jumping);
        }

        // tick 29: sum(-14..=14) = 0, back on the ground line
        p.update();
        assert_eq!(p.y, start_y);
        assert_eq!(p.vel_y, 0.0);
        assert!(!p.is_jumping);
    }

    #[test]
    fn can_jump_again_after_landing() {
        let mut p = Player::new();
        p.jump();
        for _ in 0..40 { p.update(); }
        assert!(!p.is_jumping);
        assert!(p.jump());
    }

    #[test]
    fn resting_player_stays_on_ground() {
        let mut p = Player::new();
        for _ in 0..100 {
            p.update();
            assert_eq!(p.y, p.ground_line());
        }
    }

    #[test]
    fn custom_physics() {
        let mut p = Player::with_physics(2.0, 10.0);
        p.jump();
        p.update();
        assert_eq!(p.vel_y, -8.0);
        assert_eq!(p.y, 202.0);
    }

    #[test]
    fn obstacle_sits_on_ground() {
        let o = Obstacle::at_right_edge(25.0);
        assert_eq!(o.x, 800.0);
        assert_eq!(o.y, 220.0);
        assert_eq!(o.rect().bottom(), GROUND_Y);
    }

    #[test]
    fn obstacle_moves_left_by_speed() {
        let mut o = Obstacle::new(100.0, 7.5);
        o.update();
        assert_eq!(o.x, 92.5);
    }

    #[test]
    fn off_screen_boundary() {
        assert!(!Obstacle::new(-20.0, 0.0).is_off_screen());
        assert!(Obstacle::new(-20.5, 0.0).is_off_screen());
    }

    #[test]
    fn off_screen_is_monotonic() {
        let mut o = Obstacle::new(0.0, 3.0);
        let mut seen = false;
        for _ in 0..50 {
            o.update();
            if seen {
                assert!(o.is_off_screen());
            }
            seen |= o.is_off_screen();
        }
        assert!(seen);
    }
}
