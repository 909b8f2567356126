pub mod transport;
pub mod uaa;
