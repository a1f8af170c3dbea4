pub mod components;
pub mod renderer;
pub mod traits;

pub use components::*;
pub use renderer::*;
pub use traits::*;
