mod conversation;
mod session;

pub use conversation::*;
pub use session::*;
