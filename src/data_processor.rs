use crate::excel_parser::load_workbook;
use crate::models::{
    AppConfig, BatchOutcome, FileFailure, FileReport, FileSummary, ProcessResult, ReportRequest,
};
use crate::report::generate_report;
use crate::report_writer::{analysis_workbook, full_workbook};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 扫描目录中的所有 Excel 文件
pub fn scan_excel_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            if ext_str == "xls" || ext_str == "xlsx" || ext_str == "xlsm" {
                // 跳过临时文件
                if !path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .starts_with("~$")
                {
                    files.push(path.to_path_buf());
                }
            }
        }
    }

    Ok(files)
}

/// 解析输入参数：`PATH` 或 `PATH=YYYY-MM-DD`，目录会展开为其中的 Excel 文件
pub fn expand_inputs(inputs: &[String], default_date: NaiveDate) -> Result<Vec<ReportRequest>> {
    let pattern = Regex::new(r"^(?P<path>.+)=(?P<date>\d{4}-\d{2}-\d{2})$")?;
    let mut requests = Vec::new();

    for input in inputs {
        let (path, target_date) = match pattern.captures(input) {
            Some(caps) => {
                let date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d")
                    .with_context(|| format!("Invalid date in '{}'", input))?;
                (PathBuf::from(&caps["path"]), date)
            }
            None => (PathBuf::from(input), default_date),
        };

        if path.is_dir() {
            let files = scan_excel_files(&path)
                .with_context(|| format!("Failed to scan {:?}", path))?;
            log::info!("Found {} workbooks in {:?}", files.len(), path);
            requests.extend(files.into_iter().map(|path| ReportRequest { path, target_date }));
        } else {
            requests.push(ReportRequest { path, target_date });
        }
    }

    Ok(requests)
}

/// 处理单个工作簿：提取报表并生成两个导出文件
pub fn process_file(request: &ReportRequest, config: &AppConfig) -> Result<FileReport> {
    let workbook = load_workbook(&request.path)?;
    let (table, warnings) = generate_report(&workbook, request.target_date)?;

    let analysis = analysis_workbook(&table, config)?;
    let full = full_workbook(&table, &workbook, config)?;

    Ok(FileReport {
        file_name: request.file_name(),
        target_date: request.target_date.format("%Y-%m-%d").to_string(),
        table,
        warnings,
        analysis_workbook: analysis,
        full_workbook: full,
    })
}

/// 逐个处理工作簿，单个文件出错不影响其他文件
pub fn process_batch(requests: &[ReportRequest], config: &AppConfig) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (idx, request) in requests.iter().enumerate() {
        let file_name = request.file_name();
        log::info!(
            "[{}/{}] Processing '{}' for {}",
            idx + 1,
            requests.len(),
            file_name,
            request.target_date
        );

        match process_file(request, config) {
            Ok(report) => {
                for warning in &report.warnings {
                    log::warn!("{}: {}", file_name, warning);
                }
                outcome.reports.push(report);
            }
            Err(e) => {
                log::error!("An error occurred while processing '{}': {:#}", file_name, e);
                outcome.failures.push(FileFailure {
                    file: file_name,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    outcome
}

/// 将所有完整报表打包为 zip
pub fn bundle_reports(reports: &[FileReport], entry_prefix: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (report, entry_name) in reports.iter().zip(unique_output_names(reports, entry_prefix)) {
        zip.start_file(entry_name.as_str(), options)
            .with_context(|| format!("Failed to add '{}' to archive", entry_name))?;
        zip.write_all(&report.full_workbook)?;
    }

    let cursor = zip.finish().context("Failed to finish archive")?;
    Ok(cursor.into_inner())
}

/// 输出文件名：前缀 + 原文件名，扩展名统一为 .xlsx
pub fn output_file_name(prefix: &str, file_name: &str) -> String {
    let path = Path::new(file_name);
    let is_xlsx = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("xlsx"));

    if is_xlsx {
        format!("{}{}", prefix, file_name)
    } else {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_string());
        format!("{}{}.xlsx", prefix, stem)
    }
}

/// 为每个报表生成不重复的输出文件名
///
/// 不同目录下的同名工作簿依次追加 ` (2)`、` (3)`，比较时不区分大小写。
pub fn unique_output_names(reports: &[FileReport], prefix: &str) -> Vec<String> {
    let mut used = HashSet::new();

    reports
        .iter()
        .map(|report| {
            let name = output_file_name(prefix, &report.file_name);
            let mut candidate = name.clone();
            let mut counter = 2;
            while !used.insert(candidate.to_lowercase()) {
                candidate = numbered_file_name(&name, counter);
                counter += 1;
            }
            if candidate != name {
                log::warn!("'{}' already used, writing '{}' instead", name, candidate);
            }
            candidate
        })
        .collect()
}

fn numbered_file_name(name: &str, counter: usize) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({}).{}",
            stem.to_string_lossy(),
            counter,
            ext.to_string_lossy()
        ),
        _ => format!("{} ({})", name, counter),
    }
}

/// 写出全部导出文件
///
/// 每个工作簿写一个分析表文件；只有一个报表时完整导出直接写文件，多个时打包为 zip。
pub fn write_outputs(outcome: &BatchOutcome, config: &AppConfig) -> Result<ProcessResult> {
    let output_path = PathBuf::from(&config.output_path);
    fs::create_dir_all(&output_path)
        .with_context(|| format!("Failed to create output directory {:?}", output_path))?;

    let analysis_names = unique_output_names(&outcome.reports, &config.analysis_file_prefix);
    let mut files = Vec::new();
    for (report, analysis_file) in outcome.reports.iter().zip(analysis_names) {
        fs::write(output_path.join(&analysis_file), &report.analysis_workbook)
            .with_context(|| format!("Failed to write {}", analysis_file))?;
        log::info!("Wrote {}", analysis_file);

        files.push(FileSummary {
            file: report.file_name.clone(),
            target_date: report.target_date.clone(),
            analysis_file,
            warnings: report.warnings.iter().map(|w| w.to_string()).collect(),
        });
    }

    let archive = match outcome.reports.as_slice() {
        [] => None,
        [single] => {
            let full_file = output_file_name(&config.report_entry_prefix, &single.file_name);
            fs::write(output_path.join(&full_file), &single.full_workbook)
                .with_context(|| format!("Failed to write {}", full_file))?;
            log::info!("Wrote {}", full_file);
            None
        }
        reports => {
            let bytes = bundle_reports(reports, &config.report_entry_prefix)?;
            fs::write(output_path.join(&config.archive_name), bytes)
                .with_context(|| format!("Failed to write {}", config.archive_name))?;
            log::info!(
                "Bundled {} reports into {}",
                reports.len(),
                config.archive_name
            );
            Some(config.archive_name.clone())
        }
    };

    let generated_count = outcome.reports.len();
    let failed_count = outcome.failures.len();
    Ok(ProcessResult {
        success: failed_count == 0 && generated_count > 0,
        message: if generated_count == 0 {
            "No reports were generated".to_string()
        } else if failed_count == 0 {
            format!("Generated {} reports", generated_count)
        } else {
            format!(
                "Generated {} reports, {} files failed",
                generated_count, failed_count
            )
        },
        generated_count,
        failed_count,
        output_path: output_path.to_string_lossy().to_string(),
        archive,
        files,
        errors: outcome.failures.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTable;
    use std::io::Read;

    fn report(name: &str, bytes: &[u8]) -> FileReport {
        FileReport {
            file_name: name.to_string(),
            target_date: "2024-05-07".to_string(),
            table: ReportTable { rows: Vec::new() },
            warnings: Vec::new(),
            analysis_workbook: Vec::new(),
            full_workbook: bytes.to_vec(),
        }
    }

    #[test]
    fn scan_skips_lock_files_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.xlsx"), b"").unwrap();
        fs::write(dir.path().join("~$a.xlsx"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("b.XLS"), b"").unwrap();

        let files = scan_excel_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.XLS"]);
    }

    #[test]
    fn inputs_accept_per_file_dates() {
        let default = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let inputs = vec![
            "plant-a.xlsx".to_string(),
            "plant-b.xlsx=2024-04-30".to_string(),
        ];
        let requests = expand_inputs(&inputs, default).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].path, PathBuf::from("plant-a.xlsx"));
        assert_eq!(requests[0].target_date, default);
        assert_eq!(requests[1].path, PathBuf::from("plant-b.xlsx"));
        assert_eq!(
            requests[1].target_date,
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
    }

    #[test]
    fn invalid_per_file_date_is_an_error() {
        let default = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let inputs = vec!["plant.xlsx=2024-13-40".to_string()];
        assert!(expand_inputs(&inputs, default).is_err());
    }

    #[test]
    fn unreadable_files_fail_alone() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.xlsx");
        fs::write(&broken, b"not a workbook").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();

        let requests = vec![
            ReportRequest { path: broken, target_date: date },
            ReportRequest { path: dir.path().join("missing.xlsx"), target_date: date },
        ];
        let outcome = process_batch(&requests, &AppConfig::default());

        assert!(outcome.reports.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].file, "broken.xlsx");
    }

    #[test]
    fn output_names_keep_xlsx_and_rename_others() {
        assert_eq!(output_file_name("Report_", "plant.xlsx"), "Report_plant.xlsx");
        assert_eq!(output_file_name("Report_", "plant.XLSX"), "Report_plant.XLSX");
        assert_eq!(output_file_name("Analysis_Points_", "old.xls"), "Analysis_Points_old.xlsx");
    }

    #[test]
    fn single_report_writes_full_export_directly() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            output_path: dir.path().to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        let outcome = BatchOutcome {
            reports: vec![report("plant.xlsx", b"full")],
            failures: vec![FileFailure {
                file: "bad.xlsx".to_string(),
                error: "boom".to_string(),
            }],
        };

        let result = write_outputs(&outcome, &config).unwrap();
        assert_eq!(result.generated_count, 1);
        assert_eq!(result.failed_count, 1);
        assert!(!result.success);
        assert!(result.archive.is_none());
        assert!(dir.path().join("Analysis_Points_plant.xlsx").exists());
        assert_eq!(fs::read(dir.path().join("Report_plant.xlsx")).unwrap(), b"full");
        assert!(!dir.path().join("All_Analysis_Reports.zip").exists());
    }

    #[test]
    fn several_reports_are_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            output_path: dir.path().to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        let outcome = BatchOutcome {
            reports: vec![report("a.xlsx", b"1"), report("b.xlsx", b"2")],
            failures: Vec::new(),
        };

        let result = write_outputs(&outcome, &config).unwrap();
        assert!(result.success);
        assert_eq!(result.archive.as_deref(), Some("All_Analysis_Reports.zip"));
        assert!(dir.path().join("All_Analysis_Reports.zip").exists());
        assert!(!dir.path().join("Report_a.xlsx").exists());
        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn same_named_workbooks_in_different_folders_are_all_written() {
        let dir = tempfile::tempdir().unwrap();
        for plant in ["plant-a", "plant-b"] {
            fs::create_dir(dir.path().join(plant)).unwrap();
            fs::write(dir.path().join(plant).join("daily.xlsx"), b"").unwrap();
        }
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let requests =
            expand_inputs(&[dir.path().to_string_lossy().to_string()], date).unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.file_name() == "daily.xlsx"));

        let out = dir.path().join("out");
        let config = AppConfig {
            output_path: out.to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        let outcome = BatchOutcome {
            reports: requests
                .iter()
                .zip([b"first".as_slice(), b"second".as_slice()])
                .map(|(request, bytes)| report(&request.file_name(), bytes))
                .collect(),
            failures: Vec::new(),
        };

        let result = write_outputs(&outcome, &config).unwrap();
        assert!(result.success);
        let analysis: Vec<&str> = result.files.iter().map(|f| f.analysis_file.as_str()).collect();
        assert_eq!(
            analysis,
            vec!["Analysis_Points_daily.xlsx", "Analysis_Points_daily (2).xlsx"]
        );
        assert!(out.join("Analysis_Points_daily.xlsx").exists());
        assert!(out.join("Analysis_Points_daily (2).xlsx").exists());

        let archive = fs::File::open(out.join("All_Analysis_Reports.zip")).unwrap();
        let mut archive = zip::ZipArchive::new(archive).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive
            .by_name("Report_daily (2).xlsx")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn numbered_names_skip_taken_ones_case_insensitively() {
        let reports = vec![
            report("Daily.xlsx", b""),
            report("daily (2).xlsx", b""),
            report("daily.xlsx", b""),
            report("daily.xls", b""),
        ];
        assert_eq!(
            unique_output_names(&reports, "Report_"),
            vec![
                "Report_Daily.xlsx",
                "Report_daily (2).xlsx",
                "Report_daily (3).xlsx",
                "Report_daily (4).xlsx",
            ]
        );
    }

    #[test]
    fn archive_entries_are_prefixed() {
        let reports = vec![report("a.xlsx", b"first"), report("b.xlsx", b"second")];
        let bytes = bundle_reports(&reports, "Report_").unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("Report_b.xlsx")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "second");
        assert!(archive.by_name("Report_a.xlsx").is_ok());
    }
}
