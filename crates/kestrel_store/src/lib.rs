pub mod builder;
pub mod checksum;
pub mod codec;
pub mod kvs;
pub mod layout;
pub mod snapshot;
pub mod tagged;
pub mod vfs;
