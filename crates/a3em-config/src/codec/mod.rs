mod decode;
mod encode;
mod keys;

pub use decode::decode;
pub use encode::encode;
pub use keys::Key;

/// Line that opens a new phase block.
pub const PHASE_MARKER: &str = "[PHASE]";
