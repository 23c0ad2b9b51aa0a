pub mod models;
pub mod enums;
pub mod normalize;

pub use models::*;
pub use enums::*;
pub use normalize::*;
