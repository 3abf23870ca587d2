// Domain-specific error types
pub mod errors;

// Sweep dimensions and combinations
pub mod parameters;

// Backtest job requests
pub mod job;

// Response classification
pub mod outcome;

// Top-N ranking
pub mod ranking;

// Durable result rows
pub mod record;

// Port interfaces
pub mod ports;
