//! Application layer containing the business logic orchestration.
//!
//! `AccountService` covers registration, login, password changes and
//! balance-funded purchases; `PaymentService` owns the gateway order flow and
//! signature verification. Both depend only on the ports in
//! `crate::domain::ports`.

pub mod accounts;
pub mod export;
pub mod payments;
