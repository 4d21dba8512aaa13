// Threat intelligence — provider adapters and verdict aggregation.

pub mod aggregate;
pub mod safe_browsing;
pub mod traits;
pub mod virustotal;
