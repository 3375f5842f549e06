pub mod batch;
pub mod designs;
pub mod estimate;
pub mod inflation;
pub mod laws;
pub mod sample;
pub mod util;
