mod budget;
mod category;
mod money;
mod transaction;
mod user;
mod window;

pub use budget::*;
pub use category::*;
pub use money::*;
pub use transaction::*;
pub use user::*;
pub use window::*;
