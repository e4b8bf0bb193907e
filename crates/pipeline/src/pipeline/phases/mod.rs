// Pipeline phases for raking one draw
//
// Numbered in execution order. Load pulls the three inputs, align and split
// reshape them, factor/apply do the arithmetic, merge and save produce the
// output file.

#[path = "01_load.rs"]
pub mod load;

#[path = "02_align.rs"]
pub mod align;

#[path = "03_split.rs"]
pub mod split;

#[path = "04_factor.rs"]
pub mod factor;

#[path = "05_apply.rs"]
pub mod apply;

#[path = "06_merge.rs"]
pub mod merge;

#[path = "07_save.rs"]
pub mod save;
