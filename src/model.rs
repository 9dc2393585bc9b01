mod config;
mod coords;
mod ids;
mod pipeline;
mod stage;

pub use self::config::{EditorConfig, EditorState, RememberedRepo};
pub use self::coords::{DEFAULT_BRANCH, DEFAULT_PATH, RepoCoordinates, is_valid_identifier};
pub use self::ids::RevisionToken;
pub use self::pipeline::PipelineConfig;
pub use self::stage::{
    DEFAULT_BACKGROUND, DEFAULT_BADGE_CLASS, PALETTE, Stage, StageField, StageRow, StageRows,
    collect,
};
