pub mod batch;
pub mod firmware;
pub mod image;
pub mod locate;
pub mod rules;
pub mod scan;

pub use batch::*;
pub use firmware::*;
pub use image::*;
pub use locate::*;
pub use rules::*;
pub use scan::*;
