pub mod features;
pub mod recommendation;
pub mod ticker;
