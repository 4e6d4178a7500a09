//! Small helpers shared by the commands.

pub mod names;
pub mod plural;

pub use names::UniqueNames;
pub use plural::plural_count;
