pub mod code_generator;
pub mod dates;
pub mod geo;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod points;
pub mod pricing;
pub mod qr;
pub mod validators;

pub use code_generator::*;
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use validators::*;
