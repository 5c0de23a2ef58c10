pub mod reading_reader;
pub mod sample_reader;
pub mod station_reader;
pub mod table_reader;

pub use reading_reader::ReadingReader;
pub use sample_reader::SampleReader;
pub use station_reader::StationReader;
pub use table_reader::TableReader;
