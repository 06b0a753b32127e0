//! Core engine for GraalVM flame graphs: canonical call-tree model, tool
//! parsers, color assignment, geometric layout, panel composition, and the
//! view-time zoom/search algorithms.
//!
//! The pipeline is a single synchronous transformation:
//!
//! ```text
//! tool JSON ─▶ parsers ─▶ CallTree ─▶ panels (layout + color) ─▶ compose
//!                                                                   │
//!                                     interact (zoom/search) ◀── Canvas ─▶ svg
//! ```

pub mod collapse;
pub mod color;
pub mod compose;
pub mod interact;
pub mod layout;
pub mod model;
pub mod parsers;
pub mod svg;
