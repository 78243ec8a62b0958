pub mod classify;
pub mod path;
pub mod replicate;

pub use classify::*;
pub use path::*;
pub use replicate::*;
