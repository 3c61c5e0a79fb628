pub mod stock;
pub mod sentiment;
pub mod response;

pub use stock::*;
pub use sentiment::*;
pub use response::*;
