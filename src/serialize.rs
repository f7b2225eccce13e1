use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{error::Result, resource::TargetResource, template::is_template};

/// 整数型のフィールドにテンプレート式が入っている行
static QUOTED_TEMPLATE_INT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^([ \t]*(?:- )*(?:port|number|maxConnections|probes):[ \t]+)'(\{\{[^\n]*\}\})'[ \t]*$",
    )
    .expect("valid regex")
});

/// リソースを `---` 区切りの YAML にする
pub fn to_yaml(resources: &[TargetResource]) -> Result<String> {
    let mut buf = String::new();

    for resource in resources {
        let yaml = serde_yaml::to_string(resource)?;

        buf.push_str("---\n");
        buf.push_str(&unquote_template_ints(&yaml));
    }

    Ok(buf)
}

/// 整数フィールドのテンプレート式を、レンダリング後に整数になるようクォートを外す
///
/// `port: '{{ .Values.PORT }}'` -> `port: {{ .Values.PORT }}`
///
/// `metadata` の中は labels / annotations など文字列しか取らないので対象外。
pub fn unquote_template_ints(yaml: &str) -> String {
    let mut in_metadata = false;

    yaml.split_inclusive('\n')
        .map(|line| {
            if !line.trim().is_empty() && !line.starts_with([' ', '\t', '-']) {
                in_metadata = line.starts_with("metadata:");
            }

            if in_metadata {
                Cow::Borrowed(line)
            } else {
                unquote_line(line)
            }
        })
        .collect()
}

fn unquote_line(line: &str) -> Cow<'_, str> {
    QUOTED_TEMPLATE_INT.replace(line, |caps: &Captures| {
        let value = caps[2].replace("''", "'");

        if is_template(&value) {
            format!("{}{}", &caps[1], value)
        } else {
            caps[0].to_string()
        }
    })
}
