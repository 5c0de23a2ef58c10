pub mod sample;
pub mod station;

pub use sample::GridSample;
pub use station::StationRecord;
