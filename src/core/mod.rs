pub mod error;
pub mod network;
pub mod persist;
pub mod profile;
pub mod store;

pub use error::{SocialError, Result};
pub use network::SocialNetwork;
pub use persist::DataFiles;
pub use profile::{Post, Profile, ProfileView};
pub use store::Store;
