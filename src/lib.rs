//! Garment Assist: keyword support desk for the M.S. Garments storefront.

pub mod channels;
pub mod config;
pub mod conversation;
pub mod desk;
pub mod error;
pub mod responder;
