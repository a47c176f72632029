//! launchd property list rendering (spec §4.11), darwin's counterpart to
//! [`crate::systemd`].

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error while formatting plist: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, Default)]
pub struct LaunchdPlist {
    pub label: String,
    pub program_arguments: Vec<String>,
    pub run_at_load: bool,
    pub keep_alive: bool,
    pub environment_variables: BTreeMap<String, String>,
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render a launchd job description as plist XML.
pub fn render(plist: &LaunchdPlist) -> Result<String, Error> {
    let mut out = String::new();

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#
    )?;
    writeln!(out, r#"<plist version="1.0">"#)?;
    writeln!(out, "<dict>")?;

    writeln!(out, "\t<key>Label</key>")?;
    writeln!(out, "\t<string>{}</string>", xml_escape(&plist.label))?;

    writeln!(out, "\t<key>ProgramArguments</key>")?;
    writeln!(out, "\t<array>")?;
    for arg in &plist.program_arguments {
        writeln!(out, "\t\t<string>{}</string>", xml_escape(arg))?;
    }
    writeln!(out, "\t</array>")?;

    writeln!(out, "\t<key>RunAtLoad</key>")?;
    writeln!(out, "\t<{}/>", if plist.run_at_load { "true" } else { "false" })?;

    writeln!(out, "\t<key>KeepAlive</key>")?;
    writeln!(out, "\t<{}/>", if plist.keep_alive { "true" } else { "false" })?;

    if !plist.environment_variables.is_empty() {
        writeln!(out, "\t<key>EnvironmentVariables</key>")?;
        writeln!(out, "\t<dict>")?;
        for (key, value) in &plist.environment_variables {
            writeln!(out, "\t\t<key>{}</key>", xml_escape(key))?;
            writeln!(out, "\t\t<string>{}</string>", xml_escape(value))?;
        }
        writeln!(out, "\t</dict>")?;
    }

    writeln!(out, "</dict>")?;
    writeln!(out, "</plist>")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_label_and_program_arguments() {
        let plist = LaunchdPlist {
            label: "dev.launchpad.redis".to_string(),
            program_arguments: vec!["/usr/local/bin/redis-server".to_string(), "--port".to_string(), "6379".to_string()],
            run_at_load: true,
            keep_alive: true,
            environment_variables: BTreeMap::from([("PORT".to_string(), "6379".to_string())]),
        };

        let rendered = render(&plist).unwrap();
        assert!(rendered.contains("<key>Label</key>"));
        assert!(rendered.contains("<string>dev.launchpad.redis</string>"));
        assert!(rendered.contains("<string>--port</string>"));
        assert!(rendered.contains("<true/>"));
        assert!(rendered.contains("<key>PORT</key>"));
    }

    #[test]
    fn escapes_xml_special_characters() {
        let plist = LaunchdPlist {
            label: "a & b".to_string(),
            ..Default::default()
        };
        assert!(render(&plist).unwrap().contains("a &amp; b"));
    }
}
