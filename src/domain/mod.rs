//! Domain model: users, balances, gateway orders, and the ports the
//! application layer depends on.

pub mod order;
pub mod ports;
pub mod user;
