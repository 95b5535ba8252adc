mod assets;
mod status;

pub use assets::*;
pub use status::*;

/// Response header naming the server that answered an asset lookup
pub const ASSET_SERVER_HEADER: &str = "x-asset-server";

/// Response header carrying the subject's display name (art and label only)
pub const ASSET_NAME_HEADER: &str = "x-asset-name";
