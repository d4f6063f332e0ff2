use super::operation::{HttpMethod, Operation};
use super::validators::{
    validate_analysis_params, validate_project_params, validate_statistics_params,
    validate_user_params,
};
use HttpMethod::{Delete, Get, Post, Put};

pub(super) fn standard_operations() -> Vec<Operation> {
    vec![
        // Users
        Operation::with_method("login", Post, "/auth/login")
            .describe("log in")
            .required(&["username", "password"]),
        Operation::with_method("logout", Post, "/auth/logout").describe("log out"),
        Operation::with_method("get_user", Get, "/users/{user_id}")
            .describe("get user details")
            .required(&["user_id"]),
        Operation::with_method("create_user", Post, "/users")
            .describe("create a user")
            .required(&["username", "email"])
            .optional(&["first_name", "last_name", "role"])
            .validated_by(validate_user_params),
        Operation::with_method("update_user", Put, "/users/{user_id}")
            .describe("update a user")
            .required(&["user_id"])
            .optional(&["email", "first_name", "last_name", "role"])
            .validated_by(validate_user_params),
        Operation::with_method("delete_user", Delete, "/users/{user_id}")
            .describe("delete a user")
            .required(&["user_id"]),
        // Projects
        Operation::with_method("list_projects", Get, "/projects")
            .describe("list projects")
            .optional(&["page", "limit", "sort_by"]),
        Operation::with_method("get_project", Get, "/projects/{project_id}")
            .describe("get project details")
            .required(&["project_id"]),
        Operation::with_method("create_project", Post, "/projects")
            .describe("create a project")
            .required(&["name"])
            .optional(&["description", "owner_id", "type", "tags"])
            .validated_by(validate_project_params),
        Operation::with_method("update_project", Put, "/projects/{project_id}")
            .describe("update a project")
            .required(&["project_id"])
            .optional(&["name", "description", "owner_id", "type", "tags", "status"])
            .validated_by(validate_project_params),
        Operation::with_method("delete_project", Delete, "/projects/{project_id}")
            .describe("delete a project")
            .required(&["project_id"]),
        // Files
        Operation::with_method("list_files", Get, "/projects/{project_id}/files")
            .describe("list project files")
            .required(&["project_id"])
            .optional(&["page", "limit", "type", "sort_by"]),
        Operation::with_method("upload_file", Post, "/projects/{project_id}/files")
            .describe("upload a file to a project")
            .required(&["project_id", "file_data"])
            .optional(&["file_name", "file_type", "description"]),
        Operation::with_method("download_file", Get, "/projects/{project_id}/files/{file_id}")
            .describe("download a project file")
            .required(&["project_id", "file_id"]),
        Operation::with_method("delete_file", Delete, "/projects/{project_id}/files/{file_id}")
            .describe("delete a project file")
            .required(&["project_id", "file_id"]),
        // Analysis
        Operation::with_method("run_analysis", Post, "/analysis")
            .describe("run a data analysis")
            .required(&["project_id", "analysis_type"])
            .optional(&["parameters", "input_file_ids", "options"])
            .validated_by(validate_analysis_params),
        Operation::with_method("get_analysis_result", Get, "/analysis/{analysis_id}")
            .describe("get an analysis result")
            .required(&["analysis_id"]),
        Operation::with_method("export_report", Get, "/reports/{report_id}/export")
            .describe("export an analysis report")
            .required(&["report_id"])
            .optional(&["format", "include_charts"]),
        // System
        Operation::with_method("get_system_status", Get, "/system/status")
            .describe("get system status"),
        Operation::with_method("get_usage_statistics", Get, "/system/statistics")
            .describe("get usage statistics")
            .optional(&["start_date", "end_date", "user_id", "project_id"])
            .validated_by(validate_statistics_params),
    ]
}
