#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod equipment;
mod error;
mod exercise;
mod message;
mod muscle;
mod name;
mod page;
mod service;
mod store;
mod token;
mod validator;

pub use equipment::*;
pub use error::*;
pub use exercise::*;
pub use message::*;
pub use muscle::*;
pub use name::*;
pub use page::*;
pub use service::*;
pub use store::*;
pub use token::*;
pub use validator::*;
