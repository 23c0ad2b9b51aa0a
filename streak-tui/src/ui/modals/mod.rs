// Modal rendering modules
mod utils;
mod components;
mod composer;
mod forms;
mod help;
mod social;
mod toasts;

pub use components::*;
pub use composer::*;
pub use forms::*;
pub use social::*;
pub use toasts::*;
