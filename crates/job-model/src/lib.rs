//! Fastmark Job Model
//!
//! Defines the transient request types for one watermarking job:
//! - **Anchor:** the five named overlay positions and their placement expressions
//! - **SizeLevel:** the five overlay shrink factors
//! - **TimeWindow:** optional start/duration during which the overlay is shown
//! - **WatermarkRequest:** the full request plus output-path derivation
//!
//! Nothing here touches the filesystem or the media engine.

pub mod anchor;
pub mod request;

pub use anchor::*;
pub use request::*;
