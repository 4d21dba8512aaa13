// QRuSafe: URL safety checks for scanned QR codes
//
// This is the library root. Each module corresponds to a major subsystem
// of the URL checking service.

pub mod config;
pub mod intel;
pub mod web;
