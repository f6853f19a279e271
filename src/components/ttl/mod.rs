pub mod ttl_7476;

pub use ttl_7476::Ttl7476;
