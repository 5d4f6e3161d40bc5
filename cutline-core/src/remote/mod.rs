//! Remote nutrition lookup: two independent providers plus a barcode
//! path, behind a debounced gateway.

mod gateway;
mod provider;

pub use gateway::{GatewayConfig, ProviderState, RemoteFoodGateway, SearchSnapshot};
pub use provider::{
    BarcodeOutcome, HttpProvider, NutritionProvider, ProviderConfig, ProviderError,
};
