pub mod execute;
pub mod kind;
pub mod launch;
pub mod pipeline;
