//! Patch edges and the boundary structure used for flux correction
//!
//! Every undirected edge of the patch references one or two faces; edges
//! with a single face form the patch contour, whose lengths and outward
//! in-plane normals are exported.

mod edges;

pub use edges::*;
