pub mod address;
pub mod admin;
pub mod loyalty;
pub mod menu;
pub mod order;
pub mod pagination;
pub mod payment;
pub mod promotion;
pub mod settings;
pub mod user;

pub use address::*;
pub use admin::*;
pub use loyalty::*;
pub use menu::*;
pub use order::*;
pub use pagination::*;
pub use payment::*;
pub use promotion::*;
pub use settings::*;
pub use user::*;
