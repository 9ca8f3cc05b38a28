pub mod link;
pub mod status;
pub mod sync;
pub mod unlink;

pub use link::*;
pub use status::*;
pub use sync::*;
pub use unlink::*;
