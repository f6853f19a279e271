pub mod ttl_package;
