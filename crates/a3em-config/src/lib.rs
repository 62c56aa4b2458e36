pub mod codec;
pub mod errors;
pub mod model;
pub mod storage;
pub mod time;
pub mod tokens;
pub mod validate;

pub use codec::{decode, encode};
pub use errors::{ConfigError, ParseError, Result, StorageError, TimeError, ValidationError};
pub use model::{
    AudioMode, AudioModeKind, AudioPolicy, DeploymentWindow, DeviceSettings, ImuMode,
    ImuModeKind, ImuPolicy, Phase, Schedule, TimeOfDayWindow, TimeScale, VhfModeKind, VhfPolicy,
    CONFIG_FILE_NAME, DEFAULT_PHASE_NAME,
};
pub use storage::{config_path, read_config, write_config};
pub use time::{LocalDateTime, TimeInstant};
pub use tokens::WireEnum;
pub use validate::validate;
