pub mod bar;
pub mod evidence;
pub mod indicator;
pub mod market;
pub mod opportunity;
pub mod signal;

pub use bar::*;
pub use evidence::*;
pub use indicator::*;
pub use market::*;
pub use opportunity::*;
pub use signal::*;
