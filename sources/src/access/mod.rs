pub use tracker::*;

mod tracker;
