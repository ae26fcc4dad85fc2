use crate::config::SiteConfig;
use crate::utils::error::{Result, ScaffoldError};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub files_copied: usize,
    pub skipped_dirs: Vec<String>,
    pub index_rewritten: bool,
    pub rewritten_paths: usize,
}

/// Copies source trees into the output directory and makes `index.html` open from disk.
pub struct SiteBuilder {
    root: PathBuf,
    output_dir: String,
    source_dirs: Vec<String>,
    index_file: String,
}

impl SiteBuilder {
    pub fn new(root: impl Into<PathBuf>, output_dir: &str, source_dirs: &[String], index_file: &str) -> Self {
        Self {
            root: root.into(),
            output_dir: output_dir.to_string(),
            source_dirs: source_dirs.to_vec(),
            index_file: index_file.to_string(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.project_root(),
            &config.build.output_dir,
            &config.build.source_dirs,
            &config.build.index_file,
        )
    }

    pub fn run(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        let output = self.root.join(&self.output_dir);
        fs::create_dir_all(&output)?;

        // Step 1: 複製 src/includes 到輸出目錄
        for dir in &self.source_dirs {
            let source = self.root.join(dir);
            if !source.is_dir() {
                tracing::warn!("Source directory {} not found, skipping", source.display());
                report.skipped_dirs.push(dir.clone());
                continue;
            }
            report.files_copied += copy_dir(&source, &output)?;
        }
        tracing::info!(
            "Copied {} file(s) to {}",
            report.files_copied,
            output.display()
        );

        // Step 2: 將 index.html 內的根目錄路徑改為相對路徑
        let index_path = output.join(&self.index_file);
        if index_path.is_file() {
            let html = fs::read_to_string(&index_path)?;
            let (rewritten, count) = rewrite_root_relative(&html, &self.source_dirs)?;
            fs::write(&index_path, rewritten)?;
            report.index_rewritten = true;
            report.rewritten_paths = count;
            tracing::info!("{} paths updated to relative ({})", self.index_file, count);
        } else {
            tracing::info!(
                "{} not found in {}, skipping path update",
                self.index_file,
                output.display()
            );
        }

        tracing::info!("Build complete! {} can now be opened directly.", index_path.display());
        Ok(report)
    }
}

fn copy_dir(source: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            // 子目錄遞迴複製
            fs::create_dir_all(&dest_path)?;
            copied += copy_dir(&source_path, &dest_path)?;
        } else {
            fs::copy(&source_path, &dest_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// `src="/src/app.js"` becomes `src="./app.js"`; the same for `href` and every source dir.
pub fn rewrite_root_relative(html: &str, source_dirs: &[String]) -> Result<(String, usize)> {
    if source_dirs.is_empty() {
        return Ok((html.to_string(), 0));
    }

    let alternatives: Vec<String> = source_dirs
        .iter()
        .map(|d| regex::escape(d.trim_matches('/')))
        .collect();
    // 所有來源目錄合併成一個 pattern
    let pattern = format!(r#"(src|href)="/(?:{})/(.*?)""#, alternatives.join("|"));
    let re = Regex::new(&pattern).map_err(|e| ScaffoldError::BuildError {
        message: format!("Invalid rewrite pattern for {:?}: {}", source_dirs, e),
    })?;

    let count = re.find_iter(html).count();
    let rewritten = re.replace_all(html, r#"${1}="./${2}""#).into_owned();
    Ok((rewritten, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs() -> Vec<String> {
        vec!["src".to_string(), "includes".to_string()]
    }

    #[test]
    fn test_rewrite_root_relative() {
        let html = concat!(
            r#"<link href="/src/css/site.css" rel="stylesheet">"#,
            r#"<script src="/src/js/index.js" type="module"></script>"#,
            r#"<a href="/includes/nav.html">nav</a>"#,
            r#"<img src="/assets/logo.png">"#,
        );

        let (rewritten, count) = rewrite_root_relative(html, &dirs()).unwrap();

        assert_eq!(count, 3);
        assert!(rewritten.contains(r#"href="./css/site.css""#));
        assert!(rewritten.contains(r#"src="./js/index.js""#));
        assert!(rewritten.contains(r#"href="./nav.html""#));
        assert!(rewritten.contains(r#"src="/assets/logo.png""#));
    }

    #[test]
    fn test_rewrite_escapes_dir_names() {
        let (rewritten, count) =
            rewrite_root_relative(r#"<script src="/a.b/x.js"></script><script src="/aXb/y.js"></script>"#, &["a.b".to_string()])
                .unwrap();
        assert_eq!(count, 1);
        assert!(rewritten.contains(r#"src="/aXb/y.js""#));
    }
}
