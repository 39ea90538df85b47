//! White balancing and collagen quantification for batches of stained histology slides.
//!
//! Each image is white balanced against the mean of its brightest pixels, then
//! thresholded in HSV into collagen and whitespace masks. The collagen share is
//! reported over the non-whitespace (tissue) area.

pub mod classify;
pub mod conditional_paralell;
pub mod config;
pub mod cst;
pub mod error;
pub mod loader;
pub mod mask;
pub mod overlay;
pub mod pipeline;
pub mod pixels;
pub mod prompt;
pub mod report;
pub mod white_balance;
