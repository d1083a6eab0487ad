pub mod node;
pub mod routing_table;
pub mod scheduler;

pub use node::*;
pub use routing_table::*;
pub use scheduler::*;
