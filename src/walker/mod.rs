pub mod policy;
pub mod walker;

pub use policy::*;
pub use walker::*;
