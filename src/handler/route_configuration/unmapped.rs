use log::warn;

use crate::{
    handler::Profile,
    legacy::{Destination, Rule, VirtualService},
};

use super::{istio::Consumed, not_blank};

/// 変換先に対応するフィールドがなく、出力から落ちる項目を警告する
///
/// `consumed` は Istio プロファイルで route ごとに取り込まれた項目。
pub(super) fn report(
    vs_index: usize,
    virtual_service: &VirtualService,
    profile: Profile,
    consumed: &[Consumed],
) {
    for path in unmapped_fields(vs_index, virtual_service, consumed) {
        warn!(
            "    {} is not supported by the {} profile and was dropped",
            path, profile
        );
    }
}

pub(super) fn unmapped_fields(
    vs_index: usize,
    virtual_service: &VirtualService,
    consumed: &[Consumed],
) -> Vec<String> {
    let vs_location = format!("virtualServices[{}]", vs_index);

    let mut fields = Vec::new();

    if virtual_service.rate_limit.is_some() {
        fields.push(format!("{}.rateLimit", vs_location));
    }

    let Some(route_config) = &virtual_service.route_configuration else {
        return fields;
    };

    for (route_index, route) in route_config.routes.iter().enumerate() {
        let route_location = format!(
            "{}.routeConfiguration.routes[{}]",
            vs_location, route_index
        );

        let consumed = consumed.get(route_index).copied().unwrap_or_default();

        if let Some(destination) = &route.destination {
            fields.extend(
                destination_fields(destination, &consumed)
                    .into_iter()
                    .map(|field| format!("{}.destination.{}", route_location, field)),
            );
        }

        for (rule_index, rule) in route.rules.iter().enumerate() {
            if rule.is_excluded() {
                continue;
            }

            fields.extend(
                rule_fields(
                    rule,
                    consumed.idle_timeout_rule == Some(rule_index),
                    consumed.session_rule == Some(rule_index),
                )
                .into_iter()
                .map(|field| format!("{}.rules[{}].{}", route_location, rule_index, field)),
            );
        }
    }

    fields
}

fn destination_fields(destination: &Destination, consumed: &Consumed) -> Vec<&'static str> {
    let mut fields = Vec::new();

    if destination.http_version.is_some() {
        fields.push("httpVersion");
    }
    if destination.tls_supported == Some(true) && !consumed.tls_supported {
        fields.push("tlsSupported");
    }
    if not_blank(destination.tls_config_name.as_deref()).is_some() && !consumed.tls_config_name {
        fields.push("tlsConfigName");
    }
    if not_blank(destination.tls_endpoint.as_deref()).is_some() && !consumed.tls_endpoint {
        fields.push("tlsEndpoint");
    }
    if destination.circuit_breaker.is_some() && !consumed.circuit_breaker {
        fields.push("circuitBreaker");
    }
    if destination.tcp_keepalive.is_some() && !consumed.tcp_keepalive {
        fields.push("tcpKeepalive");
    }

    fields
}

fn rule_fields(rule: &Rule, idle_timeout_consumed: bool, session_consumed: bool) -> Vec<&'static str> {
    let mut fields = Vec::new();

    if rule.rate_limit.is_some() {
        fields.push("rateLimit");
    }
    if rule.timeout.is_some() {
        fields.push("timeout");
    }
    if rule.idle_timeout.is_some() && !idle_timeout_consumed {
        fields.push("idleTimeout");
    }
    if rule
        .stateful_session
        .as_ref()
        .is_some_and(|session| session.is_enabled())
        && !session_consumed
    {
        fields.push("statefulSession");
    }
    if not_blank(rule.lua_filter.as_deref()).is_some() {
        fields.push("luaFilter");
    }
    if rule.deny == Some(true) {
        fields.push("deny");
    }

    fields
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::{super::{istio, MetaTemplate}, *};

    fn virtual_service() -> VirtualService {
        serde_yaml::from_str(indoc! {r#"
            name: demo
            rateLimit: 100
            routeConfiguration:
              routes:
                - destination:
                    endpoint: http://demo:8080
                    tlsSupported: true
                    httpVersion: 2
                  rules:
                    - match: { prefix: /skipped }
                      allowed: false
                      timeout: 10
                    - match: { prefix: / }
                      timeout: 5000
                      idleTimeout: 1000
                      statefulSession:
                        cookie: { name: sticky }
                    - match: { prefix: /lua }
                      luaFilter: "function envoy_on_request() end"
                      idleTimeout: 10
                      deny: true
        "#})
        .unwrap()
    }

    fn istio_fields(vs_index: usize, virtual_service: &VirtualService) -> Vec<String> {
        let (_, consumed) = istio::companions("demo", virtual_service, &MetaTemplate::default());

        unmapped_fields(vs_index, virtual_service, &consumed)
    }

    #[test]
    fn gateway_api_profile_reports_every_extra_field() {
        let fields = unmapped_fields(0, &virtual_service(), &[]);

        assert_eq!(
            fields,
            vec![
                "virtualServices[0].rateLimit",
                "virtualServices[0].routeConfiguration.routes[0].destination.httpVersion",
                "virtualServices[0].routeConfiguration.routes[0].destination.tlsSupported",
                "virtualServices[0].routeConfiguration.routes[0].rules[1].timeout",
                "virtualServices[0].routeConfiguration.routes[0].rules[1].idleTimeout",
                "virtualServices[0].routeConfiguration.routes[0].rules[1].statefulSession",
                "virtualServices[0].routeConfiguration.routes[0].rules[2].idleTimeout",
                "virtualServices[0].routeConfiguration.routes[0].rules[2].luaFilter",
                "virtualServices[0].routeConfiguration.routes[0].rules[2].deny",
            ]
        );
    }

    #[test]
    fn istio_profile_skips_consumed_fields() {
        let fields = istio_fields(2, &virtual_service());

        assert_eq!(
            fields,
            vec![
                "virtualServices[2].rateLimit",
                "virtualServices[2].routeConfiguration.routes[0].destination.httpVersion",
                "virtualServices[2].routeConfiguration.routes[0].rules[1].timeout",
                "virtualServices[2].routeConfiguration.routes[0].rules[2].idleTimeout",
                "virtualServices[2].routeConfiguration.routes[0].rules[2].luaFilter",
                "virtualServices[2].routeConfiguration.routes[0].rules[2].deny",
            ]
        );
    }

    #[test]
    fn destination_ruleを作れなかった項目は報告する() {
        let virtual_service: VirtualService = serde_yaml::from_str(indoc! {r#"
            name: hostless
            routeConfiguration:
              routes:
                - destination:
                    tlsSupported: true
                    circuitBreaker:
                      threshold:
                        maxConnections: 10
                    tcpKeepalive:
                      time: 30
                  rules:
                    - match: { prefix: / }
                      idleTimeout: 100
                - destination:
                    endpoint: http://demo:8080
                    tlsSupported: true
                    circuitBreaker:
                      threshold:
                        maxConnections: unlimited
                  rules:
                    - match: { prefix: /v2 }
        "#})
        .unwrap();

        assert_eq!(
            istio_fields(0, &virtual_service),
            vec![
                "virtualServices[0].routeConfiguration.routes[0].destination.tlsSupported",
                "virtualServices[0].routeConfiguration.routes[0].destination.circuitBreaker",
                "virtualServices[0].routeConfiguration.routes[0].destination.tcpKeepalive",
                "virtualServices[0].routeConfiguration.routes[0].rules[0].idleTimeout",
                "virtualServices[0].routeConfiguration.routes[1].destination.circuitBreaker",
            ]
        );
    }
}
