pub mod health;
pub mod research;
pub mod verify;

pub use health::*;
pub use research::*;
pub use verify::*;
