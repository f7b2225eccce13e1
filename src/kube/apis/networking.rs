pub mod gateway;
pub mod istio;
