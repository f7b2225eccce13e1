//! Istio プロファイルで追加出力する DestinationRule / ServiceEntry

use log::warn;

use crate::{
    endpoint::Endpoint,
    kube::apis::{
        networking::istio::v1::{
            ClientTLSSettings, ConnectionPoolSettings, ConsistentHashLB, DestinationRule,
            DestinationRuleSpec, HTTPCookie, HTTPSettings, LoadBalancerSettings, Location,
            PortSelector, PortTrafficPolicy, Resolution, ServiceEntry, ServiceEntrySpec,
            ServicePort, TCPSettings, TLSMode, TcpKeepalive, TrafficPolicy,
        },
        IntOrTemplate,
    },
    legacy::{self, Destination, Route, Scalar, StatefulSession, VirtualService},
    resource::TargetResource,
    template::is_template,
};

use super::{not_blank, MetaTemplate};

const DEFAULT_TLS_PORT: i64 = 443;

/// route の項目のうち DestinationRule / ServiceEntry に取り込まれたもの
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct Consumed {
    pub tls_supported: bool,
    pub tls_config_name: bool,
    pub tls_endpoint: bool,
    pub circuit_breaker: bool,
    pub tcp_keepalive: bool,
    pub idle_timeout_rule: Option<usize>,
    pub session_rule: Option<usize>,
}

impl Consumed {
    fn new(route: &Route, rule: Option<&DestinationRuleSpec>, has_service_entry: bool) -> Self {
        let mut consumed = Self {
            tls_endpoint: has_service_entry,
            ..Default::default()
        };

        let Some(policy) = rule.and_then(|rule| rule.traffic_policy.as_ref()) else {
            return consumed;
        };

        if let Some(tls) = &policy.tls {
            consumed.tls_supported = true;
            consumed.tls_config_name = tls.credential_name.is_some();
        }

        let pool = policy.connection_pool.as_ref();
        let tcp = pool.and_then(|pool| pool.tcp.as_ref());

        consumed.circuit_breaker = tcp.is_some_and(|tcp| tcp.max_connections.is_some());
        consumed.tcp_keepalive = tcp.is_some_and(|tcp| tcp.tcp_keepalive.is_some());

        if pool.is_some_and(|pool| pool.http.is_some()) {
            consumed.idle_timeout_rule = idle_timeout_rule(route);
        }

        if policy.load_balancer.is_some() || policy.port_level_settings.is_some() {
            consumed.session_rule = session_rule(route);
        }

        consumed
    }
}

/// route ごとに DestinationRule と ServiceEntry を作る
///
/// 名前の連番は route の位置 (1始まり)。取り込んだ項目は route の順に返す。
pub(super) fn companions(
    base_name: &str,
    virtual_service: &VirtualService,
    meta: &MetaTemplate,
) -> (Vec<TargetResource>, Vec<Consumed>) {
    let Some(route_config) = &virtual_service.route_configuration else {
        return (Vec::new(), Vec::new());
    };

    let mut resources: Vec<TargetResource> = Vec::new();
    let mut consumed = Vec::with_capacity(route_config.routes.len());

    for (index, route) in route_config.routes.iter().enumerate() {
        let n = index + 1;

        let rule = destination_rule(route);
        let entry = service_entry(route);

        consumed.push(Consumed::new(route, rule.as_ref(), entry.is_some()));

        if let Some(rule) = rule {
            resources.push(
                DestinationRule {
                    metadata: meta.object_meta(format!("{}-dr-{}", base_name, n)),
                    spec: rule,
                }
                .into(),
            );
        }

        if let Some(entry) = entry {
            resources.push(
                ServiceEntry {
                    metadata: meta.object_meta(format!("{}-se-{}", base_name, n)),
                    spec: entry,
                }
                .into(),
            );
        }
    }

    (resources, consumed)
}

/// idleTimeout を取り込む rule の位置
///
/// 最初の許可された rule に idleTimeout がある場合のみ。
fn idle_timeout_rule(route: &Route) -> Option<usize> {
    let (index, rule) = route
        .rules
        .iter()
        .enumerate()
        .find(|(_, rule)| !rule.is_excluded())?;

    rule.idle_timeout
        .as_ref()
        .filter(|timeout| !timeout.is_empty())
        .map(|_| index)
}

/// statefulSession を取り込む rule の位置
fn session_rule(route: &Route) -> Option<usize> {
    route.rules.iter().position(|rule| {
        !rule.is_excluded()
            && rule
                .stateful_session
                .as_ref()
                .is_some_and(StatefulSession::is_enabled)
    })
}

fn destination_rule(route: &Route) -> Option<DestinationRuleSpec> {
    let destination = route.destination.as_ref()?;

    let policy = traffic_policy(route, destination);

    if policy.is_empty() {
        return None;
    }

    let Some(host) = destination_host(destination) else {
        warn!("    Destination has no host, DestinationRule omitted");
        return None;
    };

    Some(DestinationRuleSpec {
        host,
        traffic_policy: Some(policy),
    })
}

fn destination_host(destination: &Destination) -> Option<String> {
    not_blank(destination.endpoint.as_deref())
        .and_then(Endpoint::parse)
        .map(|endpoint| endpoint.host)
        .or_else(|| not_blank(destination.cluster.as_deref()).map(ToString::to_string))
}

fn traffic_policy(route: &Route, destination: &Destination) -> TrafficPolicy {
    let tls = (destination.tls_supported == Some(true)).then(|| ClientTLSSettings {
        mode: TLSMode::Simple,
        credential_name: not_blank(destination.tls_config_name.as_deref()).map(ToString::to_string),
    });

    let tcp = TCPSettings {
        max_connections: max_connections(destination),
        tcp_keepalive: destination.tcp_keepalive.as_ref().and_then(tcp_keepalive),
    };

    let http = idle_timeout_rule(route)
        .and_then(|index| route.rules[index].idle_timeout.as_ref())
        .and_then(|timeout| duration(timeout, "ms"))
        .map(|idle_timeout| HTTPSettings {
            idle_timeout: Some(idle_timeout),
        });

    let connection_pool = ConnectionPoolSettings {
        tcp: (tcp != TCPSettings::default()).then_some(tcp),
        http,
    };

    let mut policy = TrafficPolicy {
        tls,
        connection_pool: (connection_pool != ConnectionPoolSettings::default())
            .then_some(connection_pool),
        ..Default::default()
    };

    let session = session_rule(route).and_then(|index| route.rules[index].stateful_session.as_ref());

    if let Some((session, hash)) =
        session.and_then(|session| consistent_hash(session).map(|hash| (session, hash)))
    {
        let load_balancer = LoadBalancerSettings {
            consistent_hash: Some(hash),
        };

        // port 指定がある場合はそのポートにだけ適用する
        match session
            .port
            .as_ref()
            .and_then(|port| IntOrTemplate::parse(port.as_str()))
        {
            Some(number) => {
                policy.port_level_settings = Some(vec![PortTrafficPolicy {
                    port: Some(PortSelector { number }),
                    load_balancer: Some(load_balancer),
                }]);
            }
            None => policy.load_balancer = Some(load_balancer),
        }
    }

    policy
}

fn max_connections(destination: &Destination) -> Option<IntOrTemplate> {
    let value = destination
        .circuit_breaker
        .as_ref()?
        .threshold
        .as_ref()?
        .max_connections
        .as_ref()?;

    match IntOrTemplate::parse(value.as_str())? {
        IntOrTemplate::Int(n) if n <= 0 => None,
        parsed => Some(parsed),
    }
}

fn tcp_keepalive(keepalive: &legacy::TcpKeepalive) -> Option<TcpKeepalive> {
    let converted = TcpKeepalive {
        probes: keepalive
            .probes
            .as_ref()
            .and_then(|probes| IntOrTemplate::parse(probes.as_str())),
        time: keepalive.time.as_ref().and_then(|time| duration(time, "s")),
        interval: keepalive
            .interval
            .as_ref()
            .and_then(|interval| duration(interval, "s")),
    };

    (converted != TcpKeepalive::default()).then_some(converted)
}

/// cookie に名前がなければ sticky session は設定しない
fn consistent_hash(session: &StatefulSession) -> Option<ConsistentHashLB> {
    let Some(cookie) = &session.cookie else {
        return Some(ConsistentHashLB {
            http_cookie: None,
            use_source_ip: Some(true),
        });
    };

    let Some(name) = not_blank(cookie.name.as_deref()) else {
        warn!("    statefulSession cookie has no name, sticky session omitted");
        return None;
    };

    Some(ConsistentHashLB {
        http_cookie: Some(HTTPCookie {
            name: name.to_string(),
            path: not_blank(cookie.path.as_deref()).map(ToString::to_string),
            ttl: cookie
                .ttl
                .as_ref()
                .filter(|ttl| !ttl.is_empty())
                .map(ToString::to_string),
        }),
        use_source_ip: None,
    })
}

/// 単位のない数値 (またはテンプレート式) に単位を付ける
fn duration(value: &Scalar, unit: &str) -> Option<String> {
    let text = value.as_str().trim();

    if text.is_empty() {
        return None;
    }

    if text.parse::<u64>().is_ok() || is_template(text) {
        Some(format!("{}{}", text, unit))
    } else {
        Some(text.to_string())
    }
}

fn service_entry(route: &Route) -> Option<ServiceEntrySpec> {
    let tls_endpoint = not_blank(route.destination.as_ref()?.tls_endpoint.as_deref())?;

    let Some(endpoint) = Endpoint::parse(tls_endpoint) else {
        warn!(
            "    Failed to parse tlsEndpoint {:?}, ServiceEntry omitted",
            tls_endpoint
        );
        return None;
    };

    let number = endpoint
        .port
        .as_deref()
        .and_then(IntOrTemplate::parse)
        .unwrap_or(IntOrTemplate::Int(DEFAULT_TLS_PORT));

    Some(ServiceEntrySpec {
        hosts: vec![endpoint.host],
        ports: Some(vec![ServicePort {
            number,
            protocol: Some("TLS".to_string()),
            name: "https".to_string(),
        }]),
        location: Some(Location::MeshExternal),
        resolution: Some(Resolution::Dns),
    })
}
