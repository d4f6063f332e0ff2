//! Mapping from free-text action names to canonical operation ids.

use std::collections::HashSet;
use tracing::debug;

/// Natural-language phrasings the model tends to return, in match order.
pub const STANDARD_PHRASES: &[(&str, &str)] = &[
    // Users
    ("登录", "login"),
    ("退出", "logout"),
    ("获取用户信息", "get_user"),
    ("创建用户", "create_user"),
    ("更新用户", "update_user"),
    ("删除用户", "delete_user"),
    // Projects
    ("查看所有项目", "list_projects"),
    ("获取项目信息", "get_project"),
    ("创建项目", "create_project"),
    ("更新项目", "update_project"),
    ("删除项目", "delete_project"),
    // Files
    ("查看文件列表", "list_files"),
    ("上传文件", "upload_file"),
    ("下载文件", "download_file"),
    ("删除文件", "delete_file"),
    // Analysis
    ("运行分析", "run_analysis"),
    ("获取分析结果", "get_analysis_result"),
    ("导出报告", "export_report"),
    // System
    ("查看系统状态", "get_system_status"),
    ("获取使用统计", "get_usage_statistics"),
    // Short aliases, after the full phrases. The generic "获取项目" comes
    // last so "获取项目列表" still reaches list_projects.
    ("项目列表", "list_projects"),
    ("文件列表", "list_files"),
    ("分析结果", "get_analysis_result"),
    ("系统状态", "get_system_status"),
    ("使用统计", "get_usage_statistics"),
    ("获取项目", "get_project"),
];

/// Ordered phrase table plus the set of canonical ids accepted verbatim.
#[derive(Debug, Clone)]
pub struct ActionTable {
    phrases: Vec<(String, String)>,
    canonical: HashSet<String>,
}

impl ActionTable {
    pub fn new<I, K, V>(phrases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let phrases: Vec<(String, String)> = phrases
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let canonical = phrases.iter().map(|(_, id)| id.clone()).collect();
        Self { phrases, canonical }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_PHRASES.iter().copied())
    }

    /// Also accept these ids verbatim (e.g. every registry key).
    pub fn with_canonical_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.canonical.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Exact phrase, then exact canonical id, then the first phrase (in
    /// table order) that contains `action` or is contained in it.
    pub fn resolve(&self, action: &str) -> Option<&str> {
        if action.trim().is_empty() {
            return None;
        }
        if let Some((_, id)) = self.phrases.iter().find(|(phrase, _)| phrase == action) {
            return Some(id);
        }
        if let Some(id) = self.canonical.get(action) {
            return Some(id);
        }
        self.phrases
            .iter()
            .find(|(phrase, _)| action.contains(phrase.as_str()) || phrase.contains(action))
            .map(|(phrase, id)| {
                debug!(action, phrase = phrase.as_str(), "fuzzy-matched action");
                id.as_str()
            })
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}
