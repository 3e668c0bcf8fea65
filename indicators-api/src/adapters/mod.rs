//! Inbound and outbound adapters around the domain.

pub mod inbound;
pub mod outbound;
