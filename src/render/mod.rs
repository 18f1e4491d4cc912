/// Still-frame composition on the CPU raster backend.
pub mod compose;
