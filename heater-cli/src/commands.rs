mod count;
mod map;

pub use self::{count::count, map::map};
