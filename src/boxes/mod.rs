//! Spatiotemporal bounding boxes (C3).

pub mod stbox;

pub use stbox::STBox;
