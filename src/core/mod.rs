/// Batch item seams implemented by the writers of this crate.
pub mod item;
