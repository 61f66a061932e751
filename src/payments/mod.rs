pub mod gateway;
pub mod intent_builder;
pub mod stripe_gateway;

pub use gateway::{CreateIntentParams, CreatedIntent, PaymentGateway, Reader};
pub use stripe_gateway::StripeGateway;
