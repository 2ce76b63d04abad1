mod memo_cell;

pub use memo_cell::*;
