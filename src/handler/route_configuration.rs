//! `RouteConfiguration` を Gateway API の HTTPRoute に変換する
//!
//! VirtualService 1つにつき HTTPRoute を1つ生成する。
//! route × rule を順番に平坦化し、`allowed: false` の rule は出力しない。
//! Istio プロファイルでは route ごとに DestinationRule / ServiceEntry も生成する。

mod backend;
mod filters;
mod istio;
mod matches;
mod unmapped;

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use log::{debug, warn};
use serde_yaml::Value;

use crate::{
    error::{Error, Result},
    kube::apis::networking::gateway::v1::{HTTPRoute, HTTPRouteRule, HTTPRouteSpec, ParentReference},
    legacy::{RoutingResource, VirtualService},
    resource::TargetResource,
};

use super::{Handler, Profile};

pub const SUB_KIND: &str = "RouteConfiguration";

const FALLBACK_NAME: &str = "generated";

#[derive(Debug, Default, Clone, Copy)]
pub struct RouteConfigurationHandler {
    profile: Profile,
}

impl RouteConfigurationHandler {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn convert(&self, resource: &RoutingResource) -> Vec<TargetResource> {
        let Some(spec) = &resource.spec else {
            warn!("    {} has no spec, nothing to convert", SUB_KIND);
            return Vec::new();
        };

        let base_name = resource
            .metadata
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_NAME);

        let meta = MetaTemplate {
            namespace: resource
                .metadata
                .namespace
                .clone()
                .or_else(|| spec.namespace.clone()),
            labels: (!resource.metadata.labels.is_empty()).then(|| resource.metadata.labels.clone()),
        };

        let parent_refs = non_empty(
            spec.gateways
                .iter()
                .filter(|gateway| !gateway.trim().is_empty())
                .map(ParentReference::gateway)
                .collect(),
        );

        let mut resources = Vec::new();

        for (index, virtual_service) in spec.virtual_services.iter().enumerate() {
            let name = if index == 0 {
                format!("{}-http-route", base_name)
            } else {
                format!("{}-http-route-{}", base_name, index)
            };

            let http_route = HTTPRoute {
                metadata: meta.object_meta(name),
                spec: HTTPRouteSpec {
                    parent_refs: parent_refs.clone(),
                    hostnames: hostnames(&virtual_service.hosts),
                    rules: non_empty(build_rules(index, virtual_service)),
                },
            };

            resources.push(TargetResource::from(http_route));

            let consumed = if self.profile == Profile::Istio {
                let companion_base = virtual_service
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(base_name);

                let (companions, consumed) =
                    istio::companions(companion_base, virtual_service, &meta);

                resources.extend(companions);

                consumed
            } else {
                Vec::new()
            };

            unmapped::report(index, virtual_service, self.profile, &consumed);
        }

        resources
    }
}

impl Handler for RouteConfigurationHandler {
    fn sub_kind(&self) -> &str {
        SUB_KIND
    }

    fn handle(&self, document: &Value) -> Result<Vec<TargetResource>> {
        let resource: RoutingResource =
            serde_yaml::from_value(document.clone()).map_err(|source| Error::Binding {
                sub_kind: SUB_KIND,
                source,
            })?;

        Ok(self.convert(&resource))
    }
}

/// 生成するリソースに共通の metadata
#[derive(Debug, Default, Clone)]
struct MetaTemplate {
    namespace: Option<String>,
    labels: Option<BTreeMap<String, String>>,
}

impl MetaTemplate {
    fn object_meta(&self, name: String) -> ObjectMeta {
        ObjectMeta {
            name: Some(name),
            namespace: self.namespace.clone(),
            labels: self.labels.clone(),
            ..Default::default()
        }
    }
}

/// `["*"]` は全ホストを意味するので出力しない
fn hostnames(hosts: &[String]) -> Option<Vec<String>> {
    match hosts {
        [] => None,
        [host] if host.trim() == "*" => None,
        _ => Some(hosts.to_vec()),
    }
}

fn build_rules(vs_index: usize, virtual_service: &VirtualService) -> Vec<HTTPRouteRule> {
    let Some(route_config) = &virtual_service.route_configuration else {
        return Vec::new();
    };

    let mut rules = Vec::new();

    for (route_index, route) in route_config.routes.iter().enumerate() {
        let route_location = format!(
            "virtualServices[{}].routeConfiguration.routes[{}]",
            vs_index, route_index
        );

        let backend = backend::backend_ref(route.destination.as_ref(), &route_location);

        for (rule_index, rule) in route.rules.iter().enumerate() {
            let rule_location = format!("{}.rules[{}]", route_location, rule_index);

            if rule.is_excluded() {
                debug!("    Skipping {}: not allowed", rule_location);
                continue;
            }

            rules.push(HTTPRouteRule {
                matches: matches::route_matches(rule.match_.as_ref(), &rule_location),
                filters: filters::route_filters(virtual_service, rule, &rule_location),
                backend_refs: backend.clone().map(|backend| vec![backend]),
            });
        }
    }

    rules
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// 空文字は未指定として扱う
fn not_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use indoc::{formatdoc, indoc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use crate::{
        document::parse_document,
        kube::apis::networking::gateway::v1::{
            HTTPHeaderMatch, HTTPPathMatch, HeaderMatchType, PathMatchType,
        },
        template::TemplatePreprocessor,
    };

    use super::*;

    fn convert(yaml: &str) -> Vec<TargetResource> {
        convert_with(Profile::GatewayApi, yaml)
    }

    fn convert_with(profile: Profile, yaml: &str) -> Vec<TargetResource> {
        let document = parse_document(&TemplatePreprocessor, yaml).unwrap();

        RouteConfigurationHandler::new(profile)
            .handle(&document)
            .unwrap()
    }

    fn http_route(resource: &TargetResource) -> &HTTPRoute {
        match resource {
            TargetResource::HTTPRoute(route) => route,
            other => panic!("expected HTTPRoute, got {}", other.display_name()),
        }
    }

    fn rules(resource: &TargetResource) -> Vec<HTTPRouteRule> {
        http_route(resource).spec.rules.clone().unwrap_or_default()
    }

    #[test]
    fn converts_templated_route_configuration() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              name: {{ .Values.SERVICE_NAME }}-mesh-routes
              namespace: "{{ .Values.NAMESPACE }}"
              labels:
                {{ include "labels.common" . | nindent 4 | trim }}
                deployer.cleanup/allow: "true"
                app.kubernetes.io/processed-by-operator: core-operator
            spec:
              virtualServices:
                - name: "{{ .Values.SERVICE_NAME }}"
                  hosts: ["{{ .Values.SERVICE_NAME }}"]
                  routeConfiguration:
                    version: "{{ .Values.DEPLOYMENT_VERSION }}"
                    routes:
                      - destination:
                          cluster: "{{ .Values.SERVICE_NAME }}"
                          endpoint: http://{{ .Values.DEPLOYMENT_RESOURCE_NAME }}:8080
                        rules:
                          - match:
                              prefix: /actuator
                            allowed: false
                          - match:
                              prefix: /v1/test
                              headerMatchers:
                                - name: "Authorization"
                                  presentMatch: true
                            allowed: true
                            prefixRewrite: /api/v1/test
                            addHeaders:
                              - name: "NewHeader"
                                value: "NewHeaderValue"
                            removeHeaders: ["Cookie", "Set-Cookie"]
        "#});

        assert_eq!(resources.len(), 1);

        let actual = resources[0].to_json().unwrap();

        let expected = json!({
            "apiVersion": "gateway.networking.k8s.io/v1",
            "kind": "HTTPRoute",
            "metadata": {
                "name": "{{ .Values.SERVICE_NAME }}-mesh-routes-http-route",
                "namespace": "{{ .Values.NAMESPACE }}",
                "labels": {
                    "app.kubernetes.io/processed-by-operator": "core-operator",
                    "deployer.cleanup/allow": "true"
                }
            },
            "spec": {
                "hostnames": ["{{ .Values.SERVICE_NAME }}"],
                "rules": [
                    {
                        "matches": [
                            {
                                "path": { "type": "PathPrefix", "value": "/v1/test" },
                                "headers": [
                                    { "name": "Authorization", "type": "RegularExpression", "value": ".*" }
                                ]
                            }
                        ],
                        "filters": [
                            {
                                "type": "URLRewrite",
                                "urlRewrite": {
                                    "path": {
                                        "type": "ReplacePrefixMatch",
                                        "replacePrefixMatch": "/api/v1/test"
                                    }
                                }
                            },
                            {
                                "type": "RequestHeaderModifier",
                                "requestHeaderModifier": {
                                    "add": [ { "name": "NewHeader", "value": "NewHeaderValue" } ],
                                    "remove": ["Cookie", "Set-Cookie"]
                                }
                            }
                        ],
                        "backendRefs": [
                            {
                                "kind": "Service",
                                "name": "{{ .Values.DEPLOYMENT_RESOURCE_NAME }}",
                                "port": 8080
                            }
                        ]
                    }
                ]
            }
        });

        assert_eq!(actual, expected);
    }

    #[test]
    fn allowed_falseのruleは出力されない() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              name: demo
            spec:
              virtualServices:
                - name: demo
                  routeConfiguration:
                    routes:
                      - destination:
                          endpoint: http://demo:8080
                        rules:
                          - match: { prefix: /a }
                            allowed: false
                          - match: { prefix: /b }
                          - match: { prefix: /c }
                            allowed: true
                      - destination:
                          endpoint: http://other:9090
                        rules:
                          - match: { prefix: /d }
                            allowed: false
                          - match: { path: /e }
        "#});

        let paths: Vec<HTTPPathMatch> = rules(&resources[0])
            .into_iter()
            .filter_map(|rule| rule.matches)
            .flat_map(|matches| matches.into_iter().filter_map(|m| m.path))
            .collect();

        assert_eq!(
            paths,
            vec![
                HTTPPathMatch { type_: PathMatchType::PathPrefix, value: "/b".into() },
                HTTPPathMatch { type_: PathMatchType::PathPrefix, value: "/c".into() },
                HTTPPathMatch { type_: PathMatchType::Exact, value: "/e".into() },
            ]
        );
    }

    #[rstest]
    #[case::prefix_wins(r#"{ prefix: /p, path: /x, regExp: "^/r" }"#, PathMatchType::PathPrefix, "/p")]
    #[case::path_over_regex(r#"{ path: /x, regExp: "^/r" }"#, PathMatchType::Exact, "/x")]
    #[case::regex_only(r#"{ regExp: "^/r.*" }"#, PathMatchType::RegularExpression, "^/r.*")]
    #[case::empty_prefix_is_absent(r#"{ prefix: "", path: /x }"#, PathMatchType::Exact, "/x")]
    #[test]
    fn path_match_precedence(
        #[case] route_match: &str,
        #[case] expected_type: PathMatchType,
        #[case] expected_value: &str,
    ) {
        let yaml = formatdoc!(
            r#"
                apiVersion: core.netcracker.com/v1
                kind: Mesh
                subKind: RouteConfiguration
                metadata:
                  name: demo
                spec:
                  virtualServices:
                    - name: demo
                      routeConfiguration:
                        routes:
                          - destination:
                              endpoint: http://demo:8080
                            rules:
                              - match: {}
            "#,
            route_match
        );

        let resources = convert(&yaml);
        let matches = rules(&resources[0])[0].matches.clone().unwrap();

        assert_eq!(
            matches[0].path,
            Some(HTTPPathMatch {
                type_: expected_type,
                value: expected_value.into()
            })
        );
    }

    #[test]
    fn header_matcher_kinds() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              name: demo
            spec:
              virtualServices:
                - name: demo
                  routeConfiguration:
                    routes:
                      - destination:
                          endpoint: http://demo:8080
                        rules:
                          - match:
                              headerMatchers:
                                - name: X-Exact
                                  exactMatch: v1
                                  prefixMatch: ignored
                                - name: X-Regex
                                  safeRegexMatch: "^v[0-9]+$"
                                - name: X-Prefix
                                  prefixMatch: a.b
                                - name: X-Suffix
                                  suffixMatch: "+json"
                                - name: X-Present
                                  presentMatch: true
                                - name: X-Nothing
                                - name: X-Absent
                                  presentMatch: false
        "#});

        let matches = rules(&resources[0])[0].matches.clone().unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, None);
        assert_eq!(
            matches[0].headers,
            Some(vec![
                HTTPHeaderMatch {
                    name: "X-Exact".into(),
                    type_: HeaderMatchType::Exact,
                    value: "v1".into()
                },
                HTTPHeaderMatch {
                    name: "X-Regex".into(),
                    type_: HeaderMatchType::RegularExpression,
                    value: "^v[0-9]+$".into()
                },
                HTTPHeaderMatch {
                    name: "X-Prefix".into(),
                    type_: HeaderMatchType::RegularExpression,
                    value: r"^a\.b.*$".into()
                },
                HTTPHeaderMatch {
                    name: "X-Suffix".into(),
                    type_: HeaderMatchType::RegularExpression,
                    value: r".*\+json$".into()
                },
                HTTPHeaderMatch {
                    name: "X-Present".into(),
                    type_: HeaderMatchType::RegularExpression,
                    value: ".*".into()
                },
            ])
        );
    }

    #[test]
    fn virtual_service_headers_come_first() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              name: demo
            spec:
              virtualServices:
                - name: demo
                  addHeaders:
                    - name: X-Shared
                      value: vs
                  removeHeaders: ["X-Remove-Vs"]
                  routeConfiguration:
                    routes:
                      - destination:
                          endpoint: http://demo:8080
                        rules:
                          - match: { prefix: / }
                            addHeaders:
                              - name: X-Shared
                                value: rule
                              - name: X-Count
                                value: 3
                            removeHeaders: ["X-Remove-Rule"]
        "#});

        let actual = serde_json::to_value(rules(&resources[0])[0].filters.clone()).unwrap();

        assert_eq!(
            actual,
            json!([
                {
                    "type": "RequestHeaderModifier",
                    "requestHeaderModifier": {
                        "add": [
                            { "name": "X-Shared", "value": "vs" },
                            { "name": "X-Shared", "value": "rule" },
                            { "name": "X-Count", "value": "3" }
                        ],
                        "remove": ["X-Remove-Vs", "X-Remove-Rule"]
                    }
                }
            ])
        );
    }

    #[rstest]
    #[case::prefix_and_host(
        "{ prefixRewrite: /new, hostRewrite: backend.internal }",
        json!([{ "type": "URLRewrite", "urlRewrite": {
            "hostname": "backend.internal",
            "path": { "type": "ReplacePrefixMatch", "replacePrefixMatch": "/new" }
        }}])
    )]
    #[case::host_only(
        "{ hostRewrite: backend.internal }",
        json!([{ "type": "URLRewrite", "urlRewrite": { "hostname": "backend.internal" } }])
    )]
    #[case::nothing("{ prefixRewrite: '' }", serde_json::Value::Null)]
    #[test]
    fn url_rewrite(#[case] rule_fields: &str, #[case] expected: serde_json::Value) {
        let yaml = formatdoc!(
            r#"
                apiVersion: core.netcracker.com/v1
                kind: Mesh
                subKind: RouteConfiguration
                metadata:
                  name: demo
                spec:
                  virtualServices:
                    - name: demo
                      routeConfiguration:
                        routes:
                          - destination:
                              endpoint: http://demo:8080
                            rules:
                              - {}
            "#,
            rule_fields
        );

        let resources = convert(&yaml);
        let actual = serde_json::to_value(rules(&resources[0])[0].filters.clone()).unwrap();

        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case::wildcard(r#"["*"]"#, None)]
    #[case::empty("[]", None)]
    #[case::explicit(r#"["a.example.com", "b.example.com"]"#, Some(vec!["a.example.com", "b.example.com"]))]
    #[case::wildcard_among_others(r#"["*", "a.example.com"]"#, Some(vec!["*", "a.example.com"]))]
    #[test]
    fn wildcard_host_is_elided(#[case] hosts: &str, #[case] expected: Option<Vec<&str>>) {
        let yaml = formatdoc!(
            r#"
                apiVersion: core.netcracker.com/v1
                kind: Mesh
                subKind: RouteConfiguration
                metadata:
                  name: demo
                spec:
                  virtualServices:
                    - name: demo
                      hosts: {}
            "#,
            hosts
        );

        let resources = convert(&yaml);

        assert_eq!(
            http_route(&resources[0]).spec.hostnames,
            expected.map(|hosts| hosts.into_iter().map(String::from).collect())
        );
    }

    #[test]
    fn gateways_become_parent_refs() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              name: demo
            spec:
              gateways: ["internal-gateway-service", "public-gateway-service"]
              virtualServices:
                - name: demo
        "#});

        let actual = serde_json::to_value(&http_route(&resources[0]).spec.parent_refs).unwrap();

        assert_eq!(
            actual,
            json!([
                { "group": "gateway.networking.k8s.io", "kind": "Gateway", "name": "internal-gateway-service" },
                { "group": "gateway.networking.k8s.io", "kind": "Gateway", "name": "public-gateway-service" }
            ])
        );
    }

    #[test]
    fn 名前がない場合はgeneratedを使う() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              namespace: demo
            spec:
              virtualServices:
                - name: first
                - name: second
        "#});

        let names: Vec<&str> = resources.iter().filter_map(|r| r.name()).collect();

        assert_eq!(names, vec!["generated-http-route", "generated-http-route-1"]);
    }

    #[rstest]
    #[case::no_endpoint("{}")]
    #[case::blank_endpoint("{ endpoint: '' }")]
    #[case::no_host("{ endpoint: 'http://:8080' }")]
    #[test]
    fn backend_is_omitted_without_host(#[case] destination: &str) {
        let yaml = formatdoc!(
            r#"
                apiVersion: core.netcracker.com/v1
                kind: Mesh
                subKind: RouteConfiguration
                metadata:
                  name: demo
                spec:
                  virtualServices:
                    - name: demo
                      routeConfiguration:
                        routes:
                          - destination: {}
                            rules:
                              - match: {{ prefix: / }}
            "#,
            destination
        );

        let resources = convert(&yaml);

        assert_eq!(rules(&resources[0])[0].backend_refs, None);
    }

    #[test]
    fn template_port_is_kept() {
        let resources = convert(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            metadata:
              name: demo
            spec:
              virtualServices:
                - name: demo
                  routeConfiguration:
                    routes:
                      - destination:
                          endpoint: http://demo:{{ .Values.PORT }}
                        rules:
                          - match: { prefix: / }
        "#});

        let actual = serde_json::to_value(&rules(&resources[0])[0].backend_refs).unwrap();

        assert_eq!(
            actual,
            json!([{ "kind": "Service", "name": "demo", "port": "{{ .Values.PORT }}" }])
        );
    }

    #[test]
    fn binding_error_is_reported() {
        let document: Value = serde_yaml::from_str(indoc! {r#"
            apiVersion: core.netcracker.com/v1
            kind: Mesh
            subKind: RouteConfiguration
            spec:
              virtualServices: "not a list"
        "#})
        .unwrap();

        let result = RouteConfigurationHandler::default().handle(&document);

        assert!(matches!(result, Err(Error::Binding { sub_kind: SUB_KIND, .. })));
    }

    #[test]
    fn istio_profile_adds_companions() {
        let resources = convert_with(
            Profile::Istio,
            indoc! {r#"
                apiVersion: core.netcracker.com/v1
                kind: Mesh
                subKind: RouteConfiguration
                metadata:
                  name: demo-routes
                  namespace: demo
                spec:
                  virtualServices:
                    - name: demo
                      routeConfiguration:
                        routes:
                          - destination:
                              endpoint: http://demo:8080
                              tlsSupported: true
                              tlsConfigName: demo-tls
                              tlsEndpoint: https://api.example.com
                            rules:
                              - match: { prefix: / }
                          - destination:
                              endpoint: http://plain:8080
                            rules:
                              - match: { prefix: /plain }
            "#},
        );

        let names: Vec<String> = resources.iter().map(TargetResource::display_name).collect();

        assert_eq!(
            names,
            vec![
                "HTTPRoute/demo-routes-http-route",
                "DestinationRule/demo-dr-1",
                "ServiceEntry/demo-se-1",
            ]
        );
    }
}
