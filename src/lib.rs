mod controller;
mod error;
mod gateway;
mod logger;
mod protocol;
mod session;
mod timer;
mod types;

pub use controller::{AcController, AcControllerBuilder};
pub use error::{Error, Result};
pub use gateway::{DeviceGateway, HttpGateway, HttpGatewayBuilder};
pub use logger::MessageLogMode;
pub use types::*;
