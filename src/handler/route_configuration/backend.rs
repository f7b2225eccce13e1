use log::warn;

use crate::{
    endpoint::Endpoint,
    kube::apis::{networking::gateway::v1::HTTPBackendRef, IntOrTemplate},
    legacy::Destination,
};

use super::not_blank;

/// route の destination から backendRef を作る
///
/// host を取り出せない場合は backendRef を出力しない。
pub(super) fn backend_ref(destination: Option<&Destination>, location: &str) -> Option<HTTPBackendRef> {
    let Some(raw) = not_blank(destination.and_then(|d| d.endpoint.as_deref())) else {
        warn!(
            "    {}.destination.endpoint is empty, backendRefs omitted",
            location
        );
        return None;
    };

    let Some(endpoint) = Endpoint::parse(raw) else {
        warn!(
            "    Failed to parse endpoint {:?} at {}.destination.endpoint, backendRefs omitted",
            raw, location
        );
        return None;
    };

    let port = endpoint.port.as_deref().and_then(|port| {
        let parsed = IntOrTemplate::parse(port);

        if parsed.is_none() {
            warn!(
                "    Invalid port {:?} at {}.destination.endpoint, port omitted",
                port, location
            );
        }

        parsed
    });

    Some(HTTPBackendRef::service(endpoint.host, port))
}
