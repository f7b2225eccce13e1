//! Kubernetes が CRD スキーマに追加している `x-kubernetes-*` キーワード
//!
//! API サーバー側で解釈されるもので、ここでは認識だけして検証は行わない。

use jsonschema::{
    paths::{LazyLocation, Location},
    Keyword, ValidationError, ValidationOptions,
};
use serde_json::{Map, Value};

pub(super) const KUBERNETES_KEYWORDS: [&str; 7] = [
    "x-kubernetes-validations",
    "x-kubernetes-list-type",
    "x-kubernetes-list-map-keys",
    "x-kubernetes-map-type",
    "x-kubernetes-preserve-unknown-fields",
    "x-kubernetes-int-or-string",
    "x-kubernetes-embedded-resource",
];

struct Annotation;

impl Keyword for Annotation {
    fn validate<'i>(
        &self,
        _instance: &'i Value,
        _location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        Ok(())
    }

    fn is_valid(&self, _instance: &Value) -> bool {
        true
    }
}

fn annotation<'a>(
    _parent: &'a Map<String, Value>,
    _value: &'a Value,
    _path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    Ok(Box::new(Annotation))
}

pub(super) fn register(options: ValidationOptions) -> ValidationOptions {
    KUBERNETES_KEYWORDS
        .iter()
        .fold(options, |options, name| options.with_keyword(*name, annotation))
}
