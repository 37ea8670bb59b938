//! Live data engine for the ship tracker dashboard: a route animator that moves a simulated
//! ship back and forth along its waypoints, and a sampling feed that keeps a bounded window of
//! recent readings. Both run as cancellable timer tasks and publish over `watch` channels.

pub mod config;
pub mod error;
pub mod feed;
pub mod model;
pub mod route;
pub mod server;
pub mod task;
pub mod window;

pub use config::{AnimatorConfig, AppConfig, FeedConfig};
pub use error::{ConfigError, SampleError};
pub use feed::{FeedSnapshot, RandomSource, SampleFeed, SampleSource};
pub use model::{Coordinate, Direction, Sample};
pub use route::{AnimationState, Route, RouteAnimator};
pub use task::{
    spawn_animator, spawn_feed, AnimatorHandle, FeedCommand, FeedControl, FeedHandle,
    COMMAND_QUEUE_CAPACITY,
};
pub use window::SampleWindow;
