mod alpaca_request;

pub use alpaca_request::*;
