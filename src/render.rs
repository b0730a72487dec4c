//! JSON dump of a run — structured output for external renderers.

use crate::pipeline::Report;
use crate::settings::Settings;
use serde::Serialize;

/// File written into the output directory.
pub const OUTPUT_FILE: &str = "docs.json";

#[derive(Serialize)]
struct Project<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_link: Option<&'a str>,
}

#[derive(Serialize)]
struct Output<'a> {
    project: Project<'a>,
    #[serde(flatten)]
    report: &'a Report,
}

/// Serialize the report, headed by the project metadata from `settings`.
pub fn to_json(report: &Report, settings: &Settings) -> serde_json::Result<String> {
    let output = Output {
        project: Project {
            name: &settings.project_name,
            description: &settings.project_description,
            image_link: Some(settings.image_link.as_str()).filter(|link| !link.is_empty()),
        },
        report,
    };
    let mut json = serde_json::to_string_pretty(&output)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run;

    #[test]
    fn json_contains_model_and_warnings() {
        let text = "package db\n/***\n-- FUNC\n@func NewConnection\n@return (error) failure\n*/\n/***\n-- FUNC\n*/\n";
        let report = run(vec![("db.go".to_string(), Ok(text.to_string()))], false);
        let json = to_json(&report, &Settings::default()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["model"]["packages"][0]["name"], "db");
        let func = &value["model"]["packages"][0]["functions"][0];
        assert_eq!(func["name"], "NewConnection");
        assert_eq!(func["returns"][0]["type"], "error");
        assert_eq!(func["returns"][0]["is_error"], true);
        assert_eq!(value["warnings"][0]["block"], 1);
        assert_eq!(value["project"]["name"], "Include project name here...");
        assert!(value["project"].get("image_link").is_none());
    }
}
