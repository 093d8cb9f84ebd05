mod json;
pub use json::*;
mod temperature;
pub use temperature::*;
