pub mod domain;
pub mod judge;
pub mod pipeline;
pub mod traits;
