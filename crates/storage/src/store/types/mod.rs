#![forbid(unsafe_code)]

mod cascade;
mod events;
mod milestones;
mod nodes;
mod test_plans;

pub use cascade::*;
pub use events::*;
pub use milestones::*;
pub use nodes::*;
pub use test_plans::*;
