use std::path::PathBuf;

/// Rejected configuration. Nothing is constructed when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("route needs at least 2 waypoints, got {count}")]
    TooFewWaypoints { count: usize },

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("total duration {total_ms}ms is shorter than one tick of {tick_ms}ms")]
    DurationShorterThanTick { total_ms: u64, tick_ms: u64 },

    #[error("waypoint {index} is not a finite coordinate")]
    NonFiniteWaypoint { index: usize },

    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A sample source could not produce a value for this tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("sample unavailable: {0}")]
    Unavailable(String),
}
