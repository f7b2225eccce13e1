/// `scheme://host[:port][/path]` 形式のエンドポイント
///
/// host と port はテンプレート式 (`{{ ... }}`) を含んでいてもよい。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Option<String>,
    pub host: String,
    pub port: Option<String>,
}

impl Endpoint {
    pub fn parse(endpoint: &str) -> Option<Self> {
        let endpoint = endpoint.trim();

        if endpoint.is_empty() {
            return None;
        }

        let (scheme, rest) = match endpoint.split_once("://") {
            Some((scheme, rest)) if is_scheme(scheme) => (Some(scheme.to_string()), rest),
            _ => (None, endpoint),
        };

        let authority = match find_outside_template(rest, |c| c == '/' || c == '?' || c == '#') {
            Some(index) => &rest[..index],
            None => rest,
        };

        let (host, port) = split_host_port(authority);

        let host = host.trim();
        if host.is_empty() {
            return None;
        }

        Some(Self {
            scheme,
            host: host.to_string(),
            port: port
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToString::to_string),
        })
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();

    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    // [::1]:8080
    if let Some(bracketed) = authority.strip_prefix('[') {
        if let Some((host, rest)) = bracketed.split_once(']') {
            return (host, rest.strip_prefix(':'));
        }
    }

    match rfind_outside_template(authority, ':') {
        Some(index) => (&authority[..index], Some(&authority[index + 1..])),
        None => (authority, None),
    }
}

/// テンプレート式の外側で最初に条件を満たす文字の位置
fn find_outside_template(s: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    template_aware_indices(s)
        .find(|(_, c)| pred(*c))
        .map(|(i, _)| i)
}

/// テンプレート式の外側で最後に `needle` が現れる位置
fn rfind_outside_template(s: &str, needle: char) -> Option<usize> {
    template_aware_indices(s)
        .filter(|(_, c)| *c == needle)
        .map(|(i, _)| i)
        .last()
}

fn template_aware_indices(s: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut depth = 0usize;

    s.char_indices().filter(move |(i, c)| {
        let rest = &s[*i..];

        if rest.starts_with("{{") {
            depth += 1;
        } else if depth > 0 && *c == '}' && s[..*i].ends_with('}') {
            // "}}" の2文字目でテンプレートを抜ける
            depth -= 1;
            return false;
        }

        depth == 0
    })
}
