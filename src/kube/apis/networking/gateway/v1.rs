mod http_backend_ref;
mod http_route;
mod http_route_filter;
mod http_route_match;
mod parent_reference;

pub use self::http_backend_ref::*;
pub use self::http_route::*;
pub use self::http_route_filter::*;
pub use self::http_route_match::*;
pub use self::parent_reference::*;

pub const GROUP: &str = "gateway.networking.k8s.io";
