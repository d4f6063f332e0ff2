//! Human-readable replies for operation results.

use serde_json::Value;

fn text<'a>(v: &'a Value, key: &str, default: &'a str) -> &'a str {
    v.get(key).and_then(|x| x.as_str()).unwrap_or(default)
}

/// `id` fields may come back as strings or numbers.
fn id_text(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

/// "found 1 project: Alpha" / "found 5 projects, including: A, B, C..."
fn summarize_list(result: &Value, key: &str, singular: &str, plural: &str, none: &str) -> String {
    let items = result
        .get(key)
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    let unnamed = format!("unnamed {}", singular);
    match items.len() {
        0 => none.to_string(),
        1 => format!("found 1 {}: {}", singular, text(&items[0], "name", &unnamed)),
        n => {
            let names: Vec<&str> = items
                .iter()
                .take(3)
                .map(|item| text(item, "name", &unnamed))
                .collect();
            format!(
                "found {} {}, including: {}{}",
                n,
                plural,
                names.join(", "),
                if n > 3 { "..." } else { "" }
            )
        }
    }
}

/// Sentence describing a successful `action` with its API `result`.
pub fn render_message(action: &str, result: &Value) -> String {
    match action {
        "login" => "logged in successfully, welcome back.".to_string(),
        "logout" => "you have been logged out.".to_string(),
        "get_user" => format!(
            "user: {} ({})",
            text(result, "username", "unknown"),
            text(result, "email", "unknown")
        ),
        "create_user" => format!("user created, id: {}", id_text(result, "id")),
        "update_user" => "user updated.".to_string(),
        "delete_user" => "user deleted.".to_string(),

        "list_projects" => summarize_list(result, "projects", "project", "projects", "no projects found."),
        "get_project" => format!(
            "project: {} - {}",
            text(result, "name", "unnamed project"),
            text(result, "description", "no description")
        ),
        "create_project" => format!("project created, id: {}", id_text(result, "id")),
        "update_project" => "project updated.".to_string(),
        "delete_project" => "project deleted.".to_string(),

        "list_files" => summarize_list(result, "files", "file", "files", "no files found in this project."),
        "upload_file" => format!("file uploaded, id: {}", id_text(result, "id")),
        "download_file" => "file is ready for download.".to_string(),
        "delete_file" => "file deleted.".to_string(),

        "run_analysis" => format!("analysis started, id: {}", id_text(result, "analysis_id")),
        "get_analysis_result" => {
            let status = text(result, "status", "unknown");
            match status.to_lowercase().as_str() {
                "completed" => "analysis completed, results are available.".to_string(),
                "running" => "analysis is still running, check back later.".to_string(),
                "failed" => format!("analysis failed: {}", text(result, "error", "unknown error")),
                _ => format!("analysis status: {}", status),
            }
        }
        "export_report" => "report exported and ready for download.".to_string(),

        "get_system_status" => format!("system status: {}", text(result, "status", "unknown")),
        "get_usage_statistics" => "usage statistics retrieved.".to_string(),

        other => format!("operation '{}' completed successfully.", other),
    }
}

/// Reply asking the user for the missing information.
pub fn render_clarification(questions: &[String]) -> String {
    let mut msg = String::from("I need more information to help you:");
    for (i, q) in questions.iter().enumerate() {
        msg.push_str(&format!("\n{}. {}", i + 1, q));
    }
    msg
}
