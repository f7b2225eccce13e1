use log::warn;

use crate::{
    kube::apis::networking::gateway::v1::{
        HTTPHeaderMatch, HTTPPathMatch, HTTPRouteMatch, HeaderMatchType, PathMatchType,
    },
    legacy::{HeaderMatcher, RouteMatch, Scalar},
};

use super::{non_empty, not_blank};

/// パス条件とヘッダー条件をまとめて1つの match にする
pub(super) fn route_matches(route_match: Option<&RouteMatch>, location: &str) -> Option<Vec<HTTPRouteMatch>> {
    let route_match = route_match?;

    let path = path_match(route_match);

    let headers: Vec<HTTPHeaderMatch> = route_match
        .header_matchers
        .iter()
        .enumerate()
        .filter_map(|(i, matcher)| {
            header_match(
                matcher,
                &format!("{}.match.headerMatchers[{}]", location, i),
            )
        })
        .collect();

    if path.is_none() && headers.is_empty() {
        return None;
    }

    Some(vec![HTTPRouteMatch {
        path,
        headers: non_empty(headers),
    }])
}

/// prefix > path > regExp の優先順
fn path_match(route_match: &RouteMatch) -> Option<HTTPPathMatch> {
    let candidates = [
        (route_match.prefix.as_deref(), PathMatchType::PathPrefix),
        (route_match.path.as_deref(), PathMatchType::Exact),
        (route_match.reg_exp.as_deref(), PathMatchType::RegularExpression),
    ];

    candidates.into_iter().find_map(|(value, type_)| {
        not_blank(value).map(|value| HTTPPathMatch {
            type_,
            value: value.to_string(),
        })
    })
}

fn header_match(matcher: &HeaderMatcher, location: &str) -> Option<HTTPHeaderMatch> {
    let Some(name) = not_blank(matcher.name.as_deref()) else {
        warn!("    {} has no header name, skipping", location);
        return None;
    };

    let (type_, value) = if let Some(exact) = filled(&matcher.exact_match) {
        (HeaderMatchType::Exact, exact.to_string())
    } else if let Some(pattern) = filled(&matcher.safe_regex_match) {
        (HeaderMatchType::RegularExpression, pattern.to_string())
    } else if let Some(prefix) = filled(&matcher.prefix_match) {
        (
            HeaderMatchType::RegularExpression,
            format!("^{}.*$", regex::escape(prefix)),
        )
    } else if let Some(suffix) = filled(&matcher.suffix_match) {
        (
            HeaderMatchType::RegularExpression,
            format!(".*{}$", regex::escape(suffix)),
        )
    } else if matcher.present_match == Some(true) {
        (HeaderMatchType::RegularExpression, ".*".to_string())
    } else {
        warn!(
            "    {} ({}) has no supported match condition, skipping",
            location, name
        );
        return None;
    };

    Some(HTTPHeaderMatch {
        name: name.to_string(),
        type_,
        value,
    })
}

fn filled(value: &Option<Scalar>) -> Option<&str> {
    value.as_ref().filter(|v| !v.is_empty()).map(Scalar::as_str)
}
