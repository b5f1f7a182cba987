//! Source implementations

mod csv_file;
mod http;
mod object;

pub use csv_file::CsvFileSource;
pub use http::HttpSource;
pub use object::ObjectStoreSource;
