use log::warn;

use crate::{
    kube::apis::networking::gateway::v1::{
        HTTPHeader, HTTPHeaderFilter, HTTPPathModifier, HTTPRouteFilter, HTTPURLRewriteFilter,
    },
    legacy::{HeaderDefinition, Rule, VirtualService},
};

use super::{non_empty, not_blank};

/// URLRewrite → RequestHeaderModifier の順に並べる
pub(super) fn route_filters(
    virtual_service: &VirtualService,
    rule: &Rule,
    location: &str,
) -> Option<Vec<HTTPRouteFilter>> {
    let filters: Vec<HTTPRouteFilter> = [
        url_rewrite(rule),
        header_modifier(virtual_service, rule, location),
    ]
    .into_iter()
    .flatten()
    .collect();

    non_empty(filters)
}

fn url_rewrite(rule: &Rule) -> Option<HTTPRouteFilter> {
    let prefix = not_blank(rule.prefix_rewrite.as_deref());
    let hostname = not_blank(rule.host_rewrite.as_deref()).map(ToString::to_string);

    if prefix.is_none() && hostname.is_none() {
        return None;
    }

    Some(HTTPRouteFilter::url_rewrite(HTTPURLRewriteFilter {
        hostname,
        path: prefix.map(HTTPPathModifier::replace_prefix_match),
    }))
}

/// VirtualService のヘッダー設定の後ろに rule のものを追加する
///
/// 重複は除去しない。
fn header_modifier(
    virtual_service: &VirtualService,
    rule: &Rule,
    location: &str,
) -> Option<HTTPRouteFilter> {
    let add: Vec<HTTPHeader> = virtual_service
        .add_headers
        .iter()
        .chain(rule.add_headers.iter())
        .filter_map(|header| http_header(header, location))
        .collect();

    let remove: Vec<String> = virtual_service
        .remove_headers
        .iter()
        .chain(rule.remove_headers.iter())
        .filter(|name| !name.trim().is_empty())
        .cloned()
        .collect();

    if add.is_empty() && remove.is_empty() {
        return None;
    }

    Some(HTTPRouteFilter::request_header_modifier(HTTPHeaderFilter {
        add: non_empty(add),
        remove: non_empty(remove),
    }))
}

fn http_header(header: &HeaderDefinition, location: &str) -> Option<HTTPHeader> {
    let Some(name) = not_blank(header.name.as_deref()) else {
        warn!("    {} has a header without name, skipping", location);
        return None;
    };

    Some(HTTPHeader {
        name: name.to_string(),
        value: header.value.to_string(),
    })
}
