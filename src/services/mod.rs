//! Resource Services Module
//!
//! Each service owns one piece of wallet state plus its error slot, fetches
//! through its own single-flight dispatchers, and is unaware of the others.
//! A failed refresh keeps the previous value and records the error; it never
//! returns the error to the caller.

mod address;
mod balance;
mod chain;
mod transactions;

pub use address::{AddressService, AddressState};
pub use balance::{BalanceService, BalanceState};
pub use chain::ChainService;
pub use transactions::{TransactionService, TransactionState};
