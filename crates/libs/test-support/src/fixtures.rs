const ALL_SECTIONS: &[&str] = &[
    "Compatibility Summary",
    "Mount Operations",
    "Feature Compatibility",
    "Performance Metrics",
    "Test Environment Details",
    "Test Cases Executed",
];

/// Builds a client report that passes validation with no advisories unless
/// told otherwise.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    title: String,
    metadata: Option<String>,
    rating: Option<String>,
    banner: Option<String>,
    mount_rows: Vec<(String, String)>,
    feature_rows: Vec<(String, String)>,
    omitted: Vec<String>,
}

impl ReportBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            metadata: Some("layout: client\ntester: qa".into()),
            rating: None,
            banner: None,
            mount_rows: ["Default (no options)", "-o ro", "-o rw"]
                .iter()
                .map(|option| (option.to_string(), "✅".to_string()))
                .collect(),
            feature_rows: [
                "Basic Read",
                "Basic Write",
                "File Creation",
                "File Deletion",
                "Directory Creation",
                "Directory Listing",
                "Large Files (>2GB)",
                "Unicode Filenames",
            ]
            .iter()
            .map(|feature| (feature.to_string(), "✅".to_string()))
            .collect(),
            omitted: Vec::new(),
        }
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    /// Raw metadata block contents, written between the `---` fences.
    pub fn metadata(mut self, yaml: &str) -> Self {
        self.metadata = Some(yaml.to_string());
        self
    }

    /// Text after `**Overall Rating:**` in the summary section.
    pub fn rating(mut self, rating: &str) -> Self {
        self.rating = Some(rating.to_string());
        self
    }

    /// A free-standing line under the title, e.g. `🔄 In Progress`.
    pub fn banner(mut self, line: &str) -> Self {
        self.banner = Some(line.to_string());
        self
    }

    pub fn mount_status(mut self, option: &str, status: &str) -> Self {
        set_row(&mut self.mount_rows, option, status);
        self
    }

    pub fn feature_status(mut self, feature: &str, status: &str) -> Self {
        set_row(&mut self.feature_rows, feature, status);
        self
    }

    pub fn without_feature(mut self, feature: &str) -> Self {
        self.feature_rows.retain(|(name, _)| name != feature);
        self
    }

    /// Clears every feature row so only the header remains.
    pub fn untested(mut self) -> Self {
        self.mount_rows.clear();
        self.feature_rows.clear();
        self
    }

    pub fn without_section(mut self, section: &str) -> Self {
        self.omitted.push(section.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        if let Some(metadata) = &self.metadata {
            out.push_str(&format!("---\n{metadata}\n---\n"));
        }
        out.push_str(&format!("# {}\n\n", self.title));
        if let Some(banner) = &self.banner {
            out.push_str(&format!("{banner}\n\n"));
        }
        let included = ALL_SECTIONS
            .iter()
            .filter(|s| !self.omitted.iter().any(|o| o.as_str() == **s));
        for section in included {
            out.push_str(&format!("## {section}\n\n"));
            out.push_str(&self.section_body(section));
            out.push('\n');
        }
        out
    }

    fn section_body(&self, section: &str) -> String {
        match section {
            "Compatibility Summary" => match &self.rating {
                Some(rating) => format!("**Overall Rating:** {rating}\n"),
                None => "Summary pending.\n".to_string(),
            },
            "Mount Operations" => table("Mount Option", &self.mount_rows),
            "Feature Compatibility" => table("Feature", &self.feature_rows),
            "Performance Metrics" => {
                "| Operation | Throughput |\n|-----------|------------|\n\
                 | Sequential Read | 110 MB/s |\n"
                    .to_string()
            }
            "Test Environment Details" => {
                "- **Client Hardware:** 8 vCPU, 16 GB RAM\n- **Network:** 1 GbE\n".to_string()
            }
            "Test Cases Executed" => "- [x] Mount and unmount\n- [ ] Stress copy\n".to_string(),
            _ => String::new(),
        }
    }
}

fn set_row(rows: &mut Vec<(String, String)>, key: &str, status: &str) {
    match rows.iter_mut().find(|(name, _)| name == key) {
        Some(row) => row.1 = status.to_string(),
        None => rows.push((key.to_string(), status.to_string())),
    }
}

fn table(first: &str, rows: &[(String, String)]) -> String {
    let mut out = format!("| {first} | Status | Notes |\n|------|--------|-------|\n");
    for (name, status) in rows {
        out.push_str(&format!("| {name} | {status} | |\n"));
    }
    out
}

/// A progress document whose queue lists `(client, status cell)` rows in order.
pub fn progress_document(entries: &[(&str, &str)]) -> String {
    let mut out = String::from(
        "# Testing Progress\n\n## Client Testing Queue\n\n\
         | Priority | Client | Assignee | Status |\n|:--------:|--------|----------|--------|\n",
    );
    for (idx, (client, status)) in entries.iter().enumerate() {
        out.push_str(&format!("| {} | {client} | qa | {status} |\n", idx + 1));
    }
    out.push_str("\n## Completed Milestones\n\nNone yet.\n");
    out
}

/// An index document with a stale matrix between hand-written content.
pub fn index_document() -> String {
    "---\ntitle: Client Compatibility\n---\n# Client Compatibility\n\n\
     Hand-written introduction.\n\n## Compatibility Matrix\n\n\
     | Client | Version | Overall |\n|--------|---------|:-------:|\n\
     | Stale Client | 0.1 | ❌ |\n\n\
     ## Legend\n\n- ✅ Fully Compatible\n- ⏳ Not Yet Tested\n"
        .to_string()
}
