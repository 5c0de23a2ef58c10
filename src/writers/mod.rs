pub mod atomic;
pub mod csv_writer;

pub use atomic::write_atomic;
pub use csv_writer::DatasetWriter;
