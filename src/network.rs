pub mod link_cost;
pub mod topology;

pub use link_cost::*;
pub use topology::*;
