//! `{variable}` substitution for service-file templates. Missing variables
//! render as the empty string rather than failing — a service definition
//! that doesn't need `{configFile}` shouldn't have to special-case it.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            rest = &rest[open + 1..];
            match rest.find('}') {
                Some(close) => {
                    let key = &rest[..close];
                    out.push_str(self.values.get(key).map(String::as_str).unwrap_or(""));
                    rest = &rest[close + 1..];
                },
                None => {
                    // unterminated `{` — emit it literally and stop scanning.
                    out.push('{');
                    out.push_str(rest);
                    rest = "";
                },
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_variables() {
        let ctx = TemplateContext::new().set("dataDir", "/var/lib/redis").set("port", "6379");
        assert_eq!(
            ctx.render("redis-server --dir {dataDir} --port {port}"),
            "redis-server --dir /var/lib/redis --port 6379"
        );
    }

    #[test]
    fn missing_variable_renders_empty() {
        let ctx = TemplateContext::new();
        assert_eq!(ctx.render("--config {configFile}"), "--config ");
    }

    #[test]
    fn unterminated_brace_is_kept_literal() {
        let ctx = TemplateContext::new();
        assert_eq!(ctx.render("trailing {"), "trailing {");
    }
}
