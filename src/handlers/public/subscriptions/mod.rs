pub mod subscribe;
pub mod unsubscribe;

pub use subscribe::subscribe;
pub use unsubscribe::unsubscribe;
