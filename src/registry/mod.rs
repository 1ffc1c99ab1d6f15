pub mod client;
pub mod orgnr;

pub use client::*;
pub use orgnr::validate_organization_number;
