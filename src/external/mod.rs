pub mod geocoding;
pub mod google_oauth;
pub mod paystack;

pub use geocoding::*;
pub use google_oauth::*;
pub use paystack::*;
