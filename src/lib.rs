//! Premia - Payment Orchestration Backend
//!
//! This crate implements the payment backend for the Premia premium
//! subscription app: payment-intent creation against the card-processing
//! provider and webhook-driven entitlement updates.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
