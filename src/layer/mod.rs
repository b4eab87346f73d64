pub mod data_link;
pub mod network;
pub mod transport;
