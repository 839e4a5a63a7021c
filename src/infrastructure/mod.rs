//! Adapters implementing the domain ports: in-memory stores for tests, the
//! JSON-file store backing production, and the Razorpay gateway client.

pub mod in_memory;
pub mod json_file;
pub mod razorpay;
