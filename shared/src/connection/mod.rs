mod replica_connection;

pub use replica_connection::Connection;
