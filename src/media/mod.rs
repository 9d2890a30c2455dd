pub mod attention;
pub mod player;
pub mod random_volume;
pub mod store;

pub use attention::AttentionGate;
pub use random_volume::{RandomVolume, RandomVolumeOptions};
pub use store::{LocalMediaStore, MediaIntent, MediaState, MediaStore};
