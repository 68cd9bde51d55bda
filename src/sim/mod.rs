pub mod event;
pub mod session;
pub mod spawner;
pub mod step;
pub mod world;
